//! Axum HTTP surface for the order intake pipeline.
//!
//! The web layer only translates HTTP into a pipeline call and back. All
//! validation, persistence and notification decisions live in
//! `order-intake-core`.
//!
//! # Request Flow
//!
//! 1. **Correlation ID** is taken from `X-Correlation-ID` or generated
//! 2. **Body** is parsed as an `OrderSubmission`; anything unparseable is
//!    treated as an absent payload
//! 3. **Pipeline** runs and returns a `ResultEnvelope`
//! 4. **Response** status is the envelope `code`, the body is the envelope
//!
//! # Example
//!
//! ```ignore
//! use order_intake_web::{AppState, order_router};
//!
//! let pipeline = Arc::new(OrderPipeline::new(registry, notifier, config));
//! let app = order_router(AppState::new(pipeline));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::order_router;
pub use state::AppState;
