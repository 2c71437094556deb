//! Resource metrics sampling
//!
//! Wraps the host metrics source behind a trait and derives per-tick
//! network throughput from cumulative interface counters. All reads are
//! non-blocking instantaneous values; an unavailable sub-metric is
//! reported as zero with a diagnostic, never as an error.

use crate::events::{NetworkCounters, ResourceSnapshot};
use chrono::Utc;
use log::debug;
#[cfg(test)]
use mockall::automock;
use nvml_wrapper::Nvml;
use std::path::Path;
use std::time::Duration;
use sysinfo::{Disks, Networks, System};

/// Instantaneous readings from the host metrics source
#[cfg_attr(test, automock)]
pub trait MetricsProvider: Send {
    /// CPU usage as a percentage (0-100)
    fn cpu_percent(&mut self) -> f64;
    /// Memory usage as a percentage (0-100)
    fn mem_percent(&mut self) -> f64;
    /// Usage of the volume mounted at `path` as a percentage (0-100)
    fn disk_percent(&mut self, path: &str) -> f64;
    /// Load of every detected GPU as a percentage (0-100)
    fn gpu_loads(&mut self) -> Vec<f64>;
    /// Cumulative counters summed across all network interfaces
    fn network_counters(&mut self) -> NetworkCounters;
}

/// Metrics provider backed by sysinfo, with GPU load via NVML
///
/// NVML initialization failure is expected on hosts without an NVIDIA
/// driver; GPU load is then reported as an empty list, which the sampler
/// turns into zero.
pub struct SystemMetricsProvider {
    system: System,
    networks: Networks,
    disks: Disks,
    nvml: Option<Nvml>,
}

impl SystemMetricsProvider {
    pub fn new() -> Self {
        let nvml = match Nvml::init() {
            Ok(nvml) => Some(nvml),
            Err(e) => {
                debug!("NVML unavailable, GPU load will read as zero: {}", e);
                None
            }
        };

        Self {
            system: System::new(),
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            nvml,
        }
    }
}

impl Default for SystemMetricsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SystemMetricsProvider {
    fn cpu_percent(&mut self) -> f64 {
        // Usage is computed against the previous refresh, so the first tick
        // reads zero and settles from the second tick on.
        self.system.refresh_cpu();
        self.system.global_cpu_info().cpu_usage() as f64
    }

    fn mem_percent(&mut self) -> f64 {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.system.used_memory() as f64 / total as f64 * 100.0
    }

    fn disk_percent(&mut self, path: &str) -> f64 {
        self.disks.refresh_list();
        for disk in self.disks.list() {
            if disk.mount_point() == Path::new(path) {
                let total = disk.total_space();
                if total == 0 {
                    return 0.0;
                }
                let used = total - disk.available_space();
                return used as f64 / total as f64 * 100.0;
            }
        }
        debug!("no volume mounted at {}, reporting zero disk usage", path);
        0.0
    }

    fn gpu_loads(&mut self) -> Vec<f64> {
        let Some(nvml) = &self.nvml else {
            return Vec::new();
        };
        let count = match nvml.device_count() {
            Ok(count) => count,
            Err(e) => {
                debug!("failed to enumerate GPUs: {}", e);
                return Vec::new();
            }
        };

        let mut loads = Vec::with_capacity(count as usize);
        for index in 0..count {
            if let Ok(device) = nvml.device_by_index(index) {
                if let Ok(utilization) = device.utilization_rates() {
                    loads.push(utilization.gpu as f64);
                }
            }
        }
        loads
    }

    fn network_counters(&mut self) -> NetworkCounters {
        self.networks.refresh_list();
        let mut counters = NetworkCounters::default();
        for (_name, data) in self.networks.list() {
            counters.bytes_sent += data.total_transmitted();
            counters.bytes_recv += data.total_received();
        }
        counters
    }
}

/// Produces one resource snapshot per scheduler tick
pub struct MetricsSampler {
    provider: Box<dyn MetricsProvider>,
    disk_path: String,
    tick_seconds: f64,
}

impl MetricsSampler {
    /// Create a sampler over the given provider
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of instantaneous metric readings
    /// * `disk_path` - Mount point of the monitored volume
    /// * `tick_interval` - Scheduler cadence, used to scale counter deltas
    pub fn new(provider: Box<dyn MetricsProvider>, disk_path: String, tick_interval: Duration) -> Self {
        Self {
            provider,
            disk_path,
            tick_seconds: tick_interval.as_secs_f64(),
        }
    }

    /// Take the initial counter reading before the first tick
    pub fn initial_counters(&mut self) -> NetworkCounters {
        self.provider.network_counters()
    }

    /// Sample all metrics and derive network throughput since `previous`
    ///
    /// GPU usage is the maximum load across all detected GPUs, or zero when
    /// none are present. Counter deltas are clamped to zero when a counter
    /// decreases (the counter provider restarted).
    pub fn sample(&mut self, previous: &NetworkCounters) -> (ResourceSnapshot, NetworkCounters) {
        let cpu_percent = self.provider.cpu_percent();
        let mem_percent = self.provider.mem_percent();
        let disk_percent = self.provider.disk_percent(&self.disk_path);
        let gpu_percent = self
            .provider
            .gpu_loads()
            .into_iter()
            .fold(0.0, f64::max);

        let current = self.provider.network_counters();
        let sent_delta = current.bytes_sent.saturating_sub(previous.bytes_sent);
        let recv_delta = current.bytes_recv.saturating_sub(previous.bytes_recv);

        let snapshot = ResourceSnapshot {
            timestamp: Utc::now(),
            cpu_percent,
            mem_percent,
            disk_percent,
            gpu_percent,
            net: current,
            net_sent_kb_per_sec: sent_delta as f64 / 1024.0 / self.tick_seconds,
            net_recv_kb_per_sec: recv_delta as f64 / 1024.0 / self.tick_seconds,
        };

        (snapshot, current)
    }
}
