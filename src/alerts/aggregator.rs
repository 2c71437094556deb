//! Shared alert buffer with a rate-limit clock
//!
//! The aggregator owns the only shared mutable state in the system: the
//! buffer of pending alert messages and the timestamp of the last drain.
//! Every access goes through a single mutex, so a drain decision and the
//! buffer contents it is based on are always consistent. Drains are
//! all-or-nothing: the batch is taken and the clock stamped in one
//! critical section, so two concurrent drains can never both fire and no
//! push can slip between the decision and the clear.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

#[derive(Debug)]
struct AggregatorState {
    /// Alerts waiting for the next notification batch
    pending: Vec<String>,
    /// When the last batch was drained; None until the first drain
    last_sent: Option<DateTime<Utc>>,
}

/// Mutex-guarded buffer of pending alert messages
///
/// Shared between the tick loop and any other producer via `Arc`. The
/// `last_sent` clock is stamped at drain time, not at delivery time, so a
/// slow or failed send never extends the rate-limit window.
#[derive(Debug)]
pub struct AlertAggregator {
    state: Mutex<AggregatorState>,
}

impl Default for AlertAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertAggregator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AggregatorState {
                pending: Vec::new(),
                last_sent: None,
            }),
        }
    }

    /// Append alert messages to the pending buffer
    pub fn push(&self, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }
        let mut state = self.state.lock().unwrap();
        state.pending.extend(messages);
    }

    /// Atomically drain the buffer when the rate-limit window has elapsed
    ///
    /// Returns the whole batch and stamps `last_sent = now` when the buffer
    /// is non-empty and more than `interval` has passed since the last
    /// drain (a never-sent aggregator drains immediately). Otherwise
    /// returns `None` and leaves all state untouched. The buffer is empty
    /// immediately after a successful drain and no alert is ever returned
    /// twice.
    pub fn try_drain(&self, now: DateTime<Utc>, interval: Duration) -> Option<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        if state.pending.is_empty() {
            return None;
        }
        if let Some(last_sent) = state.last_sent {
            if now - last_sent <= interval {
                return None;
            }
        }
        state.last_sent = Some(now);
        Some(std::mem::take(&mut state.pending))
    }

    /// Number of alerts currently buffered
    pub fn pending_count(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_push_then_drain_returns_all_messages() {
        let aggregator = AlertAggregator::new();
        aggregator.push(vec!["one".to_string(), "two".to_string()]);
        aggregator.push(vec!["three".to_string()]);

        let batch = aggregator
            .try_drain(Utc::now(), Duration::seconds(300))
            .unwrap();
        assert_eq!(batch, vec!["one", "two", "three"]);
        assert_eq!(aggregator.pending_count(), 0);
    }

    #[test]
    fn test_drain_empty_buffer_returns_none() {
        let aggregator = AlertAggregator::new();
        assert!(aggregator
            .try_drain(Utc::now(), Duration::seconds(300))
            .is_none());
    }

    #[test]
    fn test_first_drain_is_not_rate_limited() {
        let aggregator = AlertAggregator::new();
        aggregator.push(vec!["alert".to_string()]);

        // Never sent before, so the window is considered elapsed.
        assert!(aggregator
            .try_drain(Utc::now(), Duration::seconds(300))
            .is_some());
    }

    #[test]
    fn test_drain_within_interval_returns_none_and_keeps_buffer() {
        let aggregator = AlertAggregator::new();
        let start = Utc::now();

        aggregator.push(vec!["first".to_string()]);
        assert!(aggregator.try_drain(start, Duration::seconds(300)).is_some());

        aggregator.push(vec!["second".to_string()]);
        let one_second_later = start + Duration::seconds(1);
        assert!(aggregator
            .try_drain(one_second_later, Duration::seconds(300))
            .is_none());
        assert_eq!(aggregator.pending_count(), 1);
    }

    #[test]
    fn test_elapsed_exactly_interval_does_not_drain() {
        let aggregator = AlertAggregator::new();
        let start = Utc::now();

        aggregator.push(vec!["first".to_string()]);
        aggregator.try_drain(start, Duration::seconds(300)).unwrap();

        aggregator.push(vec!["second".to_string()]);
        let boundary = start + Duration::seconds(300);
        assert!(aggregator
            .try_drain(boundary, Duration::seconds(300))
            .is_none());

        let past_boundary = start + Duration::seconds(301);
        assert!(aggregator
            .try_drain(past_boundary, Duration::seconds(300))
            .is_some());
    }

    #[test]
    fn test_last_sent_stamped_at_drain_time() {
        let aggregator = AlertAggregator::new();
        let drain_time = Utc::now();

        aggregator.push(vec!["first".to_string()]);
        aggregator
            .try_drain(drain_time, Duration::seconds(300))
            .unwrap();

        // A second batch becomes eligible relative to the drain time,
        // independent of when (or whether) delivery completed.
        aggregator.push(vec!["second".to_string()]);
        let eligible = drain_time + Duration::seconds(301);
        assert!(aggregator
            .try_drain(eligible, Duration::seconds(300))
            .is_some());
    }

    #[test]
    fn test_concurrent_pushes_and_drain_lose_nothing() {
        let aggregator = Arc::new(AlertAggregator::new());
        let threads = 8;
        let per_thread = 50;

        let mut handles = Vec::new();
        for thread_id in 0..threads {
            let aggregator = Arc::clone(&aggregator);
            handles.push(thread::spawn(move || {
                for i in 0..per_thread {
                    aggregator.push(vec![format!("t{}-m{}", thread_id, i)]);
                }
            }));
        }

        let drained = aggregator
            .try_drain(Utc::now(), Duration::seconds(300))
            .unwrap_or_default();

        for handle in handles {
            handle.join().unwrap();
        }

        let mut all: Vec<String> = drained;
        all.extend(
            aggregator
                .try_drain(Utc::now() + Duration::seconds(301), Duration::seconds(300))
                .unwrap_or_default(),
        );

        // Union of drained sets equals everything pushed, no loss, no dups.
        assert_eq!(all.len(), threads * per_thread);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), threads * per_thread);
    }
}
