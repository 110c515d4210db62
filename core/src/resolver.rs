//! Sequential fallback across named store bindings.
//!
//! [`ResourceResolver`] walks an ordered list of candidate identifiers and
//! returns the first [`StoreHandle`] it can obtain. The order of the list is
//! the priority: there is no scoring and no retry of the whole scan. Each
//! failed candidate is recorded and the scan moves on; only when every
//! candidate has failed does resolution fail, with all causes attached.
//!
//! # Example
//!
//! ```ignore
//! let resolver = ResourceResolver::new(registry);
//! let resolved = resolver
//!     .resolve(&["env/db/customer-orders", "customer-orders", "db/customer-orders"])
//!     .await?;
//! tracing::info!(identifier = %resolved.identifier(), "store resolved");
//! ```

use crate::store::{LookupError, StoreError, StoreHandle, StoreRegistry};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a single candidate did not yield a handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The registry lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A provider was found but no handle could be acquired from it.
    #[error(transparent)]
    Acquisition(#[from] StoreError),

    /// Lookup plus acquisition did not finish within the attempt timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// A failed candidate and its cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionAttempt {
    /// The candidate identifier that was tried.
    pub identifier: String,
    /// Why it failed.
    pub failure: AttemptFailure,
}

impl fmt::Display for ResolutionAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.failure)
    }
}

/// Every candidate failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionExhausted {
    attempts: Vec<ResolutionAttempt>,
}

impl ResolutionExhausted {
    /// The failed attempts, in the order they were made.
    #[must_use]
    pub fn attempts(&self) -> &[ResolutionAttempt] {
        &self.attempts
    }
}

impl fmt::Display for ResolutionExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("store not found: no candidate identifiers configured");
        }
        f.write_str("store not found with any candidate identifier (")?;
        for (i, attempt) in self.attempts.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{attempt}")?;
        }
        f.write_str(")")
    }
}

impl std::error::Error for ResolutionExhausted {}

/// A handle together with the identifier that produced it.
///
/// The identifier is kept for logging only.
pub struct Resolved {
    handle: Box<dyn StoreHandle>,
    identifier: String,
}

impl Resolved {
    /// The identifier that produced the handle.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Split into the handle and the identifier.
    #[must_use]
    pub fn into_parts(self) -> (Box<dyn StoreHandle>, String) {
        (self.handle, self.identifier)
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Resolves a store handle from an ordered list of candidate identifiers.
#[derive(Clone)]
pub struct ResourceResolver {
    registry: Arc<dyn StoreRegistry>,
    attempt_timeout: Option<Duration>,
}

impl ResourceResolver {
    /// Create a resolver backed by `registry`, with no attempt timeout.
    #[must_use]
    pub fn new(registry: Arc<dyn StoreRegistry>) -> Self {
        Self {
            registry,
            attempt_timeout: None,
        }
    }

    /// Bound each candidate's lookup plus acquisition by `timeout`.
    ///
    /// A candidate that exceeds it counts as failed and the scan continues.
    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Return the first handle any candidate yields.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionExhausted`] carrying every attempt and its cause
    /// when no candidate yields a handle.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        candidates: &[S],
    ) -> Result<Resolved, ResolutionExhausted> {
        let mut attempts = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let identifier = candidate.as_ref();
            tracing::debug!(identifier, "trying store candidate");

            match self.attempt(identifier).await {
                Ok(handle) => {
                    let resolved = Resolved {
                        handle,
                        identifier: identifier.to_string(),
                    };
                    tracing::info!(
                        identifier = resolved.identifier(),
                        failed_before = attempts.len(),
                        "store handle acquired"
                    );
                    return Ok(resolved);
                },
                Err(failure) => {
                    tracing::warn!(identifier, error = %failure, "store candidate failed");
                    metrics::counter!("order_intake.resolution.failures").increment(1);
                    attempts.push(ResolutionAttempt {
                        identifier: identifier.to_string(),
                        failure,
                    });
                },
            }
        }

        Err(ResolutionExhausted { attempts })
    }

    async fn attempt(&self, identifier: &str) -> Result<Box<dyn StoreHandle>, AttemptFailure> {
        let acquire = async {
            let provider = self.registry.lookup(identifier).await?;
            Ok::<_, AttemptFailure>(provider.connect().await?)
        };

        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, acquire)
                .await
                .unwrap_or(Err(AttemptFailure::TimedOut(limit))),
            None => acquire.await,
        }
    }
}

impl fmt::Debug for ResourceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceResolver")
            .field("attempt_timeout", &self.attempt_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_lists_every_cause_in_order() {
        let exhausted = ResolutionExhausted {
            attempts: vec![
                ResolutionAttempt {
                    identifier: "a".to_string(),
                    failure: LookupError::NotFound("a".to_string()).into(),
                },
                ResolutionAttempt {
                    identifier: "b".to_string(),
                    failure: StoreError::Acquisition("refused".to_string()).into(),
                },
            ],
        };

        assert_eq!(
            exhausted.to_string(),
            "store not found with any candidate identifier \
             (a: name not bound: a; b: connection acquisition failed: refused)"
        );
        assert_eq!(exhausted.attempts().len(), 2);
    }

    #[test]
    fn exhaustion_without_candidates_says_so() {
        let exhausted = ResolutionExhausted { attempts: Vec::new() };
        assert_eq!(
            exhausted.to_string(),
            "store not found: no candidate identifiers configured"
        );
    }
}
