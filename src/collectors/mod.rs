/// Bounded-window scanner for the OS system log
pub mod log_scanner;

/// Resource metrics sampler
pub mod metrics_sampler;

pub use log_scanner::{JournalSource, LogSource, LogStream, LogWindowScanner};
pub use metrics_sampler::{MetricsProvider, MetricsSampler, SystemMetricsProvider};
