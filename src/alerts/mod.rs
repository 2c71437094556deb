/// Shared alert buffer with rate-limited draining
pub mod aggregator;

/// Batch notification rendering and dispatch
pub mod notifier;

pub use aggregator::AlertAggregator;
pub use notifier::{NotificationTransport, Notifier, WebhookTransport};
