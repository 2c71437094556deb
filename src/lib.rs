/// Error types for the monitoring agent
pub mod error;

/// Core data types: snapshots, counters, log records
pub mod events;

/// Configuration management
pub mod config;

/// Classification rules: thresholds and keyword patterns
pub mod rules;

/// Metrics sampling and log window scanning
pub mod collectors;

/// Alert aggregation and notification delivery
pub mod alerts;

/// The fixed-interval monitoring loop
pub mod scheduler;

// Re-export commonly used types
pub use error::{ConfigError, ScanError, TransportError};
