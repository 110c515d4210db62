//! A [`Notifier`] that records what it was asked to publish.
//!
//! Each `publish` call opens a simulated connection that is closed when the
//! call's future completes or is dropped, mirroring the one-connection-per-send
//! discipline of the real adapter.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only happens after a test already panicked

use order_intake_core::notifier::{Notifier, PublishError};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// How the notifier responds to `publish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishBehavior {
    /// Accept every message.
    Accept,
    /// Reject every message with this reason.
    Reject(String),
    /// Fail to open the connection with this reason.
    Unreachable(String),
    /// Never complete.
    Stall,
}

#[derive(Debug, Default)]
struct NotifierState {
    attempts: Vec<String>,
    delivered: Vec<String>,
    connections_opened: usize,
    connections_closed: usize,
}

/// In-memory notifier for tests.
///
/// # Example
///
/// ```
/// use order_intake_testing::RecordingNotifier;
/// use order_intake_core::Notifier;
///
/// # async fn example() {
/// let notifier = RecordingNotifier::new();
/// notifier.publish("Customer: C1, Product: P9, Qty: 3").await.unwrap();
/// assert_eq!(notifier.delivered(), vec!["Customer: C1, Product: P9, Qty: 3".to_string()]);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    behavior: PublishBehavior,
    state: Arc<Mutex<NotifierState>>,
}

impl RecordingNotifier {
    /// A notifier that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::with_behavior(PublishBehavior::Accept)
    }

    /// A notifier with the given behaviour.
    #[must_use]
    pub fn with_behavior(behavior: PublishBehavior) -> Self {
        Self {
            behavior,
            state: Arc::new(Mutex::new(NotifierState::default())),
        }
    }

    /// Every message `publish` was called with, accepted or not.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().attempts.clone()
    }

    /// Messages that were accepted.
    #[must_use]
    pub fn delivered(&self) -> Vec<String> {
        self.state.lock().unwrap().delivered.clone()
    }

    /// Connections opened across all calls.
    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.state.lock().unwrap().connections_opened
    }

    /// Connections closed across all calls.
    #[must_use]
    pub fn connections_closed(&self) -> usize {
        self.state.lock().unwrap().connections_closed
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn publish<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
        Box::pin(async move {
            self.state.lock().unwrap().attempts.push(message.to_string());

            if let PublishBehavior::Unreachable(reason) = &self.behavior {
                return Err(PublishError::ConnectionFailed(reason.clone()));
            }

            let _connection = SimulatedConnection::open(Arc::clone(&self.state));

            match &self.behavior {
                PublishBehavior::Reject(reason) => Err(PublishError::SendFailed {
                    destination: "order-queue".to_string(),
                    reason: reason.clone(),
                }),
                PublishBehavior::Stall => std::future::pending().await,
                PublishBehavior::Accept | PublishBehavior::Unreachable(_) => {
                    self.state.lock().unwrap().delivered.push(message.to_string());
                    Ok(())
                },
            }
        })
    }
}

struct SimulatedConnection {
    state: Arc<Mutex<NotifierState>>,
}

impl SimulatedConnection {
    fn open(state: Arc<Mutex<NotifierState>>) -> Self {
        state.lock().unwrap().connections_opened += 1;
        Self { state }
    }
}

impl Drop for SimulatedConnection {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.connections_closed += 1;
        }
    }
}
