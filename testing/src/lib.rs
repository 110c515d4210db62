//! # Order Intake Testing
//!
//! In-memory collaborators for exercising the order pipeline without a
//! database or a broker.
//!
//! This crate provides:
//! - [`InMemoryStoreRegistry`]: scripted name bindings with a [`StoreLedger`]
//!   recording lookups, connections, inserts and handle releases
//! - [`RecordingNotifier`]: captures published messages and counts the
//!   per-call connections it opens and closes
//! - Small fixtures for the canonical test order
//!
//! ## Example
//!
//! ```ignore
//! use order_intake_testing::{Binding, InMemoryStoreRegistry, RecordingNotifier};
//!
//! #[tokio::test]
//! async fn test_order_flow() {
//!     let registry = InMemoryStoreRegistry::new().bind("customer-orders", Binding::Healthy);
//!     let ledger = registry.ledger();
//!     let notifier = Arc::new(RecordingNotifier::new());
//!     let pipeline = OrderPipeline::new(Arc::new(registry), notifier.clone(), config);
//!
//!     let envelope = pipeline.submit(Some(sample_submission())).await;
//!     assert_eq!(envelope.code(), 200);
//!     assert_eq!(ledger.handles_released(), 1);
//! }
//! ```

pub mod notifier;
pub mod store;

use order_intake_core::order::OrderSubmission;

// Re-export commonly used items
pub use notifier::{PublishBehavior, RecordingNotifier};
pub use store::{Binding, InMemoryStoreRegistry, InsertedRow, StoreLedger};

/// Candidate identifiers used by the fixtures: direct name, scoped name, alias.
pub const TEST_CANDIDATES: [&str; 3] =
    ["env/db/customer-orders", "customer-orders", "db/customer-orders"];

/// The canonical valid submission: customer `C1`, product `P9`, quantity 3.
#[must_use]
pub fn sample_submission() -> OrderSubmission {
    OrderSubmission::new("C1", "P9", 3)
}
