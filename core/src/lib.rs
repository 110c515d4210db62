//! # Order Intake Core
//!
//! The order submission pipeline: accept an order, store it, announce it.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────┐
//! │ OrderSubmission  │  (optional fields, straight off the wire)
//! └────────┬─────────┘
//!          │ validate
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ ResourceResolver │────►│  StoreRegistry   │  first candidate that yields a handle
//! └────────┬─────────┘     └──────────────────┘
//!          │ insert (one row, handle released after)
//!          ▼
//! ┌──────────────────┐
//! │     Notifier     │  best effort: failures are logged, never returned
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │  ResultEnvelope  │  200 / 400 / 500
//! └──────────────────┘
//! ```
//!
//! ## Principles
//!
//! - Configuration is passed in, never embedded: candidates and timeouts live
//!   in [`PipelineConfig`].
//! - Collaborators sit behind dyn-compatible traits ([`StoreRegistry`],
//!   [`Notifier`]) so tests swap in the in-memory versions from
//!   `order-intake-testing`.
//! - No retry and no shared mutable state between requests.

pub mod envelope;
pub mod notifier;
pub mod order;
pub mod pipeline;
pub mod resolver;
pub mod store;

// Re-export commonly used types
pub use envelope::ResultEnvelope;
pub use notifier::{Notifier, PublishError};
pub use order::{NotificationMessage, Order, OrderSubmission, ValidationError};
pub use pipeline::{ORDER_ACCEPTED_MESSAGE, OrderPipeline, PipelineConfig, PipelineError, Stage};
pub use resolver::{ResolutionExhausted, ResourceResolver};
pub use store::{LookupError, StoreError, StoreHandle, StoreProvider, StoreRegistry};
