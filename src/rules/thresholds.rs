//! Threshold evaluation for resource snapshots

use crate::config::ThresholdConfig;
use crate::events::ResourceSnapshot;

/// Compare a snapshot against the configured limits
///
/// Returns one human-readable message per metric whose value strictly
/// exceeds its limit, in CPU, memory, disk, GPU order. A value exactly
/// equal to the limit does not trigger. Pure function, no side effects.
pub fn evaluate(snapshot: &ResourceSnapshot, limits: &ThresholdConfig) -> Vec<String> {
    let mut alerts = Vec::new();

    if snapshot.cpu_percent > limits.cpu_limit {
        alerts.push(format!(
            "CPU usage above threshold: {:.1}% (limit {:.1}%)",
            snapshot.cpu_percent, limits.cpu_limit
        ));
    }
    if snapshot.mem_percent > limits.mem_limit {
        alerts.push(format!(
            "Memory usage above threshold: {:.1}% (limit {:.1}%)",
            snapshot.mem_percent, limits.mem_limit
        ));
    }
    if snapshot.disk_percent > limits.disk_limit {
        alerts.push(format!(
            "Disk usage above threshold: {:.1}% (limit {:.1}%)",
            snapshot.disk_percent, limits.disk_limit
        ));
    }
    if snapshot.gpu_percent > limits.gpu_limit {
        alerts.push(format!(
            "GPU usage above threshold: {:.1}% (limit {:.1}%)",
            snapshot.gpu_percent, limits.gpu_limit
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NetworkCounters;
    use chrono::Utc;

    fn snapshot(cpu: f64, mem: f64, disk: f64, gpu: f64) -> ResourceSnapshot {
        ResourceSnapshot {
            timestamp: Utc::now(),
            cpu_percent: cpu,
            mem_percent: mem,
            disk_percent: disk,
            gpu_percent: gpu,
            net: NetworkCounters::default(),
            net_sent_kb_per_sec: 0.0,
            net_recv_kb_per_sec: 0.0,
        }
    }

    #[test]
    fn test_no_alerts_below_limits() {
        let limits = ThresholdConfig::default();
        let alerts = evaluate(&snapshot(10.0, 20.0, 30.0, 0.0), &limits);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_equality_does_not_trigger() {
        let limits = ThresholdConfig::default();
        let alerts = evaluate(&snapshot(80.0, 80.0, 90.0, 80.0), &limits);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_just_above_limit_triggers() {
        let limits = ThresholdConfig::default();
        let alerts = evaluate(&snapshot(80.1, 0.0, 0.0, 0.0), &limits);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("CPU"));
        assert!(alerts[0].contains("80.1%"));
    }

    #[test]
    fn test_alert_ordering_cpu_mem_disk_gpu() {
        let limits = ThresholdConfig::default();
        let alerts = evaluate(&snapshot(95.0, 91.0, 99.0, 85.0), &limits);
        assert_eq!(alerts.len(), 4);
        assert!(alerts[0].contains("CPU"));
        assert!(alerts[1].contains("Memory"));
        assert!(alerts[2].contains("Disk"));
        assert!(alerts[3].contains("GPU"));
    }

    #[test]
    fn test_single_metric_alert() {
        let limits = ThresholdConfig::default();
        let alerts = evaluate(&snapshot(50.0, 85.5, 50.0, 0.0), &limits);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("Memory"));
        assert!(alerts[0].contains("85.5%"));
        assert!(alerts[0].contains("80.0%"));
    }
}
