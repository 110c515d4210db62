//! Notification port.
//!
//! After an order is stored, the pipeline publishes a plain-text notification
//! through a [`Notifier`]. From the pipeline's point of view this is
//! fire-and-forget: it awaits the call so the send has returned before the
//! response is built, but a failure is only logged. The durable write has
//! already happened and is what the caller is told about.
//!
//! Implementations own their channel, addressing and delivery guarantees.
//! Any connection-like resource they use must be scoped to one `publish`
//! call and released on every path out of it.
//!
//! # Implementations
//!
//! - `RedpandaNotifier` (in `order-intake-redpanda`): Kafka-compatible producer
//! - `RecordingNotifier` (in `order-intake-testing`): captures messages for assertions

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur while publishing a notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Could not open a connection to the broker.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The broker rejected or did not acknowledge the message.
    #[error("Publish failed for destination '{destination}': {reason}")]
    SendFailed {
        /// Topic or queue the message was addressed to.
        destination: String,
        /// Why the send failed.
        reason: String,
    },

    /// The publish call did not complete in time.
    #[error("Publish timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

/// Publish-only messaging collaborator.
///
/// # Dyn Compatibility
///
/// Uses an explicit `Pin<Box<dyn Future>>` return so the pipeline can hold
/// an `Arc<dyn Notifier>`.
pub trait Notifier: Send + Sync {
    /// Publish `message` to the configured destination.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if the message could not be handed to the
    /// broker.
    fn publish<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>>;
}
