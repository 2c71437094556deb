//! Fixed-interval monitoring loop
//!
//! One tick samples resources, evaluates thresholds, scans the log window,
//! pushes every resulting message into the aggregator, and drains a batch
//! for dispatch when the rate limit allows. The inter-tick sleep doubles
//! as the shutdown wait, so an interrupt wakes the loop immediately.
//!
//! The log scan runs as a direct synchronous call inside the tick; the
//! notification dispatch is the only background work and is never awaited.
//! Cadence is fixed with no drift correction.

use crate::alerts::{AlertAggregator, Notifier};
use crate::collectors::{LogWindowScanner, MetricsSampler};
use crate::config::ThresholdConfig;
use crate::events::NetworkCounters;
use crate::rules::thresholds;
use chrono::Utc;
use log::{info, warn};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// The fixed-interval loop driving one monitoring tick after another
pub struct Scheduler {
    sampler: MetricsSampler,
    scanner: LogWindowScanner,
    limits: ThresholdConfig,
    aggregator: Arc<AlertAggregator>,
    notifier: Notifier,
    tick_interval: Duration,
    notify_interval: chrono::Duration,
    previous_net: NetworkCounters,
}

impl Scheduler {
    pub fn new(
        mut sampler: MetricsSampler,
        scanner: LogWindowScanner,
        limits: ThresholdConfig,
        aggregator: Arc<AlertAggregator>,
        notifier: Notifier,
        tick_interval: Duration,
        notify_interval: chrono::Duration,
    ) -> Self {
        let previous_net = sampler.initial_counters();
        Self {
            sampler,
            scanner,
            limits,
            aggregator,
            notifier,
            tick_interval,
            notify_interval,
            previous_net,
        }
    }

    /// Run ticks until a shutdown signal arrives
    pub fn run(&mut self, shutdown: &Receiver<()>) {
        info!(
            "Monitoring loop started (tick interval {:?})",
            self.tick_interval
        );

        loop {
            self.tick();

            match shutdown.recv_timeout(self.tick_interval) {
                Ok(()) => {
                    info!("Shutdown signal received, stopping monitoring loop");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Shutdown channel disconnected, stopping monitoring loop");
                    break;
                }
            }
        }
    }

    /// Execute a single monitoring tick
    pub fn tick(&mut self) {
        let (snapshot, counters) = self.sampler.sample(&self.previous_net);
        self.previous_net = counters;

        info!(
            "CPU: {:.1}% | MEM: {:.1}% | DISK: {:.1}% | GPU: {:.1}% | NET sent: {:.1} KB/s | NET recv: {:.1} KB/s",
            snapshot.cpu_percent,
            snapshot.mem_percent,
            snapshot.disk_percent,
            snapshot.gpu_percent,
            snapshot.net_sent_kb_per_sec,
            snapshot.net_recv_kb_per_sec
        );

        let mut alerts = thresholds::evaluate(&snapshot, &self.limits);
        alerts.extend(self.scanner.scan());

        if !alerts.is_empty() {
            for alert in &alerts {
                warn!("{}", alert);
            }
            self.aggregator.push(alerts);
        }

        if let Some(batch) = self.aggregator.try_drain(Utc::now(), self.notify_interval) {
            self.notifier.dispatch(batch);
        }
    }
}
