//! The standard response wrapper returned for every submission.

use serde::{Deserialize, Serialize};

/// Status code reported on success.
pub const STATUS_OK: u16 = 200;
/// Status code reported when the client sent an unusable payload.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// Status code reported when the server could not process a valid order.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Uniform success/error wrapper.
///
/// `data` is populated only on success and is left out of the serialized
/// body otherwise, so an error renders as `{"code": 400, "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    code: u16,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T> ResultEnvelope<T> {
    /// Build a 200 envelope carrying `data`.
    #[must_use]
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            code: STATUS_OK,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Build an error envelope with no payload.
    #[must_use]
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Status code of the outcome.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Human-readable description of the outcome.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Payload, present only on success.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the envelope and return its payload.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Whether the envelope reports success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == STATUS_OK
    }
}
