//! Core data types for the monitoring agent
//!
//! This module defines the fundamental data structures used throughout the
//! application for representing resource snapshots, network counters, and
//! system log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// Cumulative network interface counters
///
/// Both counters are monotonically non-decreasing for the lifetime of the
/// counter provider; a decrease means the provider restarted and the caller
/// must clamp the derived delta to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkCounters {
    /// Total bytes sent since the provider started
    pub bytes_sent: u64,
    /// Total bytes received since the provider started
    pub bytes_recv: u64,
}

/// Point-in-time measurement of system resource usage
///
/// One snapshot is produced per scheduler tick and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceSnapshot {
    /// When the snapshot was taken
    pub timestamp: Timestamp,
    /// CPU usage as a percentage (0-100)
    pub cpu_percent: f64,
    /// Memory usage as a percentage (0-100)
    pub mem_percent: f64,
    /// Usage of the monitored volume as a percentage (0-100)
    pub disk_percent: f64,
    /// Highest load across all detected GPUs (0-100), zero when none are present
    pub gpu_percent: f64,
    /// Raw network counters at snapshot time
    pub net: NetworkCounters,
    /// Derived upload throughput in KB/s since the previous tick
    pub net_sent_kb_per_sec: f64,
    /// Derived download throughput in KB/s since the previous tick
    pub net_recv_kb_per_sec: f64,
}

/// Severity of a system log record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    /// Error-level record
    Error,
    /// Warning-level record
    Warning,
    /// Any other level; skipped by the log window scanner
    Other,
}

/// A single record read from the OS system log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    /// When the record was written
    pub timestamp: Timestamp,
    /// Component that produced the record
    pub source: String,
    /// Severity of the record
    pub severity: LogSeverity,
    /// Record message text
    pub message: String,
}

impl LogRecord {
    /// Format the record as the display line used for classification and alerting
    pub fn display_line(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            self.source,
            self.message.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resource_snapshot_serialization() {
        let snapshot = ResourceSnapshot {
            timestamp: Utc::now(),
            cpu_percent: 45.5,
            mem_percent: 61.2,
            disk_percent: 72.0,
            gpu_percent: 0.0,
            net: NetworkCounters {
                bytes_sent: 1024,
                bytes_recv: 4096,
            },
            net_sent_kb_per_sec: 0.1,
            net_recv_kb_per_sec: 0.4,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let deserialized: ResourceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, deserialized);
    }

    #[test]
    fn test_log_record_serialization() {
        let record = LogRecord {
            timestamp: Utc::now(),
            source: "systemd".to_string(),
            severity: LogSeverity::Error,
            message: "Failed to start unit".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_log_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&LogSeverity::Error).unwrap(),
            "\"error\""
        );
        assert_eq!(
            serde_json::to_string(&LogSeverity::Warning).unwrap(),
            "\"warning\""
        );
        assert_eq!(
            serde_json::to_string(&LogSeverity::Other).unwrap(),
            "\"other\""
        );
    }

    #[test]
    fn test_display_line_format() {
        let record = LogRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            source: "kernel".to_string(),
            severity: LogSeverity::Warning,
            message: "  I/O error on device sda  ".to_string(),
        };

        assert_eq!(
            record.display_line(),
            "[2025-03-14T09:26:53] kernel: I/O error on device sda"
        );
    }

    #[test]
    fn test_network_counters_default() {
        let counters = NetworkCounters::default();
        assert_eq!(counters.bytes_sent, 0);
        assert_eq!(counters.bytes_recv, 0);
    }
}
