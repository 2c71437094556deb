//! Batch notification rendering and dispatch
//!
//! The notifier joins a drained batch into one newline-separated body and
//! hands it to the transport on a detached thread. The scheduling loop
//! never waits for delivery; the outcome is only logged. A failed send
//! permanently loses the batch: there is no retry and the alert buffer is
//! not repopulated. This trades delivery guarantees for a loop that can
//! never stall on a slow transport.

use crate::error::TransportError;
use log::{error, info};
use serde_json::json;
use std::sync::Arc;
use std::thread;

/// Outbound message channel for alert batches
///
/// Authentication and encryption are the transport's concern; the core
/// only supplies a subject and a body.
pub trait NotificationTransport: Send + Sync {
    /// Deliver a single message
    fn send(&self, subject: &str, body: &str) -> Result<(), TransportError>;
}

/// Transport that POSTs the message to an authenticated HTTPS endpoint
///
/// Sender identity, recipient address, and the bearer credential come from
/// configuration; the endpoint's own connection timeout is the only
/// timeout in play.
pub struct WebhookTransport {
    endpoint: String,
    sender: String,
    recipient: String,
    credential: String,
}

impl WebhookTransport {
    pub fn new(endpoint: String, sender: String, recipient: String, credential: String) -> Self {
        Self {
            endpoint,
            sender,
            recipient,
            credential,
        }
    }
}

impl NotificationTransport for WebhookTransport {
    fn send(&self, subject: &str, body: &str) -> Result<(), TransportError> {
        // reqwest is async; drive it with a local runtime since delivery
        // already happens off the tick loop.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::SendFailed(format!("runtime: {}", e)))?;

        let payload = json!({
            "from": self.sender,
            "to": self.recipient,
            "subject": subject,
            "body": body,
        });

        runtime.block_on(async {
            let response = reqwest::Client::new()
                .post(&self.endpoint)
                .bearer_auth(&self.credential)
                .json(&payload)
                .send()
                .await?;
            response.error_for_status()?;
            Ok(())
        })
    }
}

/// Renders drained batches and dispatches them without blocking the caller
pub struct Notifier {
    transport: Arc<dyn NotificationTransport>,
    subject: String,
}

impl Notifier {
    pub fn new(transport: Arc<dyn NotificationTransport>, subject: String) -> Self {
        Self { transport, subject }
    }

    /// Send a batch synchronously and log the outcome
    pub fn send_batch(&self, batch: &[String]) {
        let body = batch.join("\n");
        match self.transport.send(&self.subject, &body) {
            Ok(()) => info!("Sent notification with {} alerts", batch.len()),
            Err(e) => {
                // The batch is gone: no retry, and the buffer is not
                // repopulated.
                error!(
                    "Failed to send notification, {} alerts dropped: {}",
                    batch.len(),
                    e
                );
            }
        }
    }

    /// Dispatch a batch on a detached thread
    ///
    /// Returns immediately; delivery success or failure is only logged.
    pub fn dispatch(&self, batch: Vec<String>) {
        let worker = Notifier {
            transport: Arc::clone(&self.transport),
            subject: self.subject.clone(),
        };
        thread::spawn(move || {
            worker.send_batch(&batch);
        });
    }
}
