//! The order submission pipeline.
//!
//! Every submission walks the same linear path:
//!
//! ```text
//! Received ──► Validated ──► Persisted ──► Notified ──► Completed
//!    │             │
//!    └─────────────┴──► Failed(stage, cause)
//! ```
//!
//! - **Validate**: an absent payload, a missing field, a blank string or a
//!   non-positive quantity ends the request with a 400 before any
//!   collaborator is touched.
//! - **Persist**: a handle is resolved from the configured candidates, one
//!   insert is run, and the handle is released before the step returns. An
//!   insert that affects zero rows is a failure even though the database
//!   reported none. Every persistence failure is a 500 and skips notification.
//! - **Notify**: the notification is published once. A failed publish is
//!   logged and counted, and the request **still succeeds** because the
//!   order is already stored.
//!
//! There is no retry anywhere: one resolution attempt per candidate, one
//! insert, one publish.

use crate::envelope::{ResultEnvelope, STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR};
use crate::notifier::{Notifier, PublishError};
use crate::order::{NotificationMessage, Order, OrderSubmission, ValidationError};
use crate::resolver::{ResolutionExhausted, ResourceResolver};
use crate::store::{StoreError, StoreRegistry};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Message returned with a successfully processed order.
pub const ORDER_ACCEPTED_MESSAGE: &str = "Order received and processed";

/// Position of a submission in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The request arrived; nothing has been checked yet.
    Received,
    /// The payload passed validation.
    Validated,
    /// The order row was inserted.
    Persisted,
    /// The notification publish returned (successfully or not).
    Notified,
    /// The success envelope was built.
    Completed,
}

impl Stage {
    /// Lower-case name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Persisted => "persisted",
            Self::Notified => "notified",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client sent something that cannot become an order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// No payload at all.
    #[error("Order payload is required")]
    Missing,

    /// A payload that failed field validation.
    #[error("Invalid order payload: {0}")]
    Invalid(#[from] ValidationError),
}

/// The order could not be stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// No candidate identifier yielded a store handle.
    #[error(transparent)]
    Resolution(#[from] ResolutionExhausted),

    /// The insert statement failed.
    #[error(transparent)]
    Insert(#[from] StoreError),

    /// The insert succeeded at the SQL level but affected no rows.
    #[error("Failed to insert order, no rows affected")]
    NoRowsAffected,

    /// The insert did not finish within the configured bound.
    #[error("insert timed out after {0:?}")]
    TimedOut(Duration),
}

/// Why a submission failed.
///
/// The `Display` text is the envelope message returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Client error, reported as 400.
    #[error(transparent)]
    InvalidPayload(#[from] PayloadError),

    /// Server error, reported as 500.
    #[error("Failed to process order: {0}")]
    PersistenceFailed(#[from] PersistenceError),
}

impl PipelineError {
    /// The last stage the submission reached before failing.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::InvalidPayload(_) => Stage::Received,
            Self::PersistenceFailed(_) => Stage::Validated,
        }
    }

    /// Status code reported to the caller.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPayload(_) => STATUS_BAD_REQUEST,
            Self::PersistenceFailed(_) => STATUS_INTERNAL_ERROR,
        }
    }
}

/// Static configuration supplied by the surrounding application.
///
/// Timeouts are all off by default; a `None` leaves the collaborator's own
/// timeout behaviour in charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Ordered candidate identifiers for the order store.
    pub candidates: Vec<String>,
    /// Bound on each candidate's lookup plus acquisition.
    pub resolve_timeout: Option<Duration>,
    /// Bound on the insert.
    pub persist_timeout: Option<Duration>,
    /// Bound on the publish call.
    pub publish_timeout: Option<Duration>,
}

impl PipelineConfig {
    /// Configuration with the given candidates and no timeouts.
    #[must_use]
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
            resolve_timeout: None,
            persist_timeout: None,
            publish_timeout: None,
        }
    }

    /// Set the per-candidate resolution timeout.
    #[must_use]
    pub const fn resolve_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Set the insert timeout.
    #[must_use]
    pub const fn persist_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.persist_timeout = timeout;
        self
    }

    /// Set the publish timeout.
    #[must_use]
    pub const fn publish_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.publish_timeout = timeout;
        self
    }
}

/// Validates, persists and announces submitted orders.
///
/// Holds no per-request state; one instance is shared across all requests.
///
/// # Example
///
/// ```ignore
/// let pipeline = OrderPipeline::new(registry, notifier, PipelineConfig::new(candidates));
/// let envelope = pipeline.submit(Some(OrderSubmission::new("C1", "P9", 3))).await;
/// assert_eq!(envelope.code(), 200);
/// ```
pub struct OrderPipeline {
    resolver: ResourceResolver,
    notifier: Arc<dyn Notifier>,
    candidates: Vec<String>,
    persist_timeout: Option<Duration>,
    publish_timeout: Option<Duration>,
}

impl OrderPipeline {
    /// Build a pipeline from its collaborators and configuration.
    #[must_use]
    pub fn new(
        registry: Arc<dyn StoreRegistry>,
        notifier: Arc<dyn Notifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            resolver: ResourceResolver::new(registry).with_attempt_timeout(config.resolve_timeout),
            notifier,
            candidates: config.candidates,
            persist_timeout: config.persist_timeout,
            publish_timeout: config.publish_timeout,
        }
    }

    /// Ordered candidate identifiers this pipeline resolves against.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Run one submission and map the outcome onto a [`ResultEnvelope`].
    ///
    /// Never fails: every outcome, including collaborator errors, becomes an
    /// envelope with the matching status code.
    #[tracing::instrument(name = "order_submission", skip_all)]
    pub async fn submit(&self, submission: Option<OrderSubmission>) -> ResultEnvelope<Order> {
        match self.process(submission).await {
            Ok(order) => {
                metrics::counter!("order_intake.submissions", "outcome" => "accepted").increment(1);
                ResultEnvelope::success(ORDER_ACCEPTED_MESSAGE, order)
            },
            Err(err) => {
                let stage = err.stage();
                match &err {
                    PipelineError::InvalidPayload(_) => {
                        tracing::warn!(%stage, error = %err, "order rejected");
                        metrics::counter!("order_intake.submissions", "outcome" => "rejected")
                            .increment(1);
                    },
                    PipelineError::PersistenceFailed(_) => {
                        tracing::error!(%stage, error = %err, "order processing failed");
                        metrics::counter!("order_intake.submissions", "outcome" => "failed")
                            .increment(1);
                    },
                }
                ResultEnvelope::error(err.status_code(), err.to_string())
            },
        }
    }

    /// Run one submission, returning the stored order or the failure.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidPayload`] if the submission is absent or invalid
    /// - [`PipelineError::PersistenceFailed`] if resolution or the insert failed
    ///
    /// A failed notification is never an error.
    pub async fn process(
        &self,
        submission: Option<OrderSubmission>,
    ) -> Result<Order, PipelineError> {
        let order = Self::validate(submission)?;
        tracing::debug!(?order, stage = %Stage::Validated, "order validated");

        self.persist(&order).await?;
        tracing::debug!(stage = %Stage::Persisted, "order persisted");

        if let Err(err) = self.notify(&order).await {
            tracing::error!(
                error = %err,
                customer_id = %order.customer_id(),
                "order notification failed; order remains stored"
            );
            metrics::counter!("order_intake.notifications.failed").increment(1);
        }
        tracing::debug!(stage = %Stage::Notified, "notification step finished");

        Ok(order)
    }

    fn validate(submission: Option<OrderSubmission>) -> Result<Order, PayloadError> {
        Ok(submission.ok_or(PayloadError::Missing)?.validate()?)
    }

    async fn persist(&self, order: &Order) -> Result<(), PersistenceError> {
        let (mut handle, identifier) = self.resolver.resolve(&self.candidates).await?.into_parts();

        let insert = handle.insert_order(order);
        let rows = match self.persist_timeout {
            Some(limit) => tokio::time::timeout(limit, insert)
                .await
                .map_err(|_| PersistenceError::TimedOut(limit))??,
            None => insert.await?,
        };
        drop(handle);

        if rows == 0 {
            return Err(PersistenceError::NoRowsAffected);
        }

        tracing::info!(identifier = %identifier, rows, "order stored");
        Ok(())
    }

    async fn notify(&self, order: &Order) -> Result<(), PublishError> {
        let message = NotificationMessage::for_order(order);
        let publish = self.notifier.publish(message.as_str());

        match self.publish_timeout {
            Some(limit) => tokio::time::timeout(limit, publish)
                .await
                .unwrap_or(Err(PublishError::TimedOut(limit))),
            None => publish.await,
        }?;

        tracing::info!(message = %message, "order notification published");
        Ok(())
    }
}

impl fmt::Debug for OrderPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderPipeline")
            .field("resolver", &self.resolver)
            .field("candidates", &self.candidates)
            .field("persist_timeout", &self.persist_timeout)
            .field("publish_timeout", &self.publish_timeout)
            .finish_non_exhaustive()
    }
}
