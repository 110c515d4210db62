//! Order types and validation.
//!
//! Two shapes exist for an order:
//!
//! - [`OrderSubmission`]: what arrives over the wire. Every field is optional
//!   because the transport cannot guarantee any of them.
//! - [`Order`]: a validated order. Constructing one through
//!   [`OrderSubmission::validate`] guarantees that all fields are present,
//!   both strings are non-blank and the quantity is positive.
//!
//! # Example
//!
//! ```
//! use order_intake_core::order::OrderSubmission;
//!
//! let submission = OrderSubmission::new("C1", "P9", 3);
//! let order = submission.validate().unwrap();
//! assert_eq!(order.quantity(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A reason an [`OrderSubmission`] could not become an [`Order`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent from the submission.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A string field was present but empty or whitespace only.
    #[error("{0} must not be blank")]
    BlankField(&'static str),

    /// The quantity was zero or negative.
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i32),
}

/// An order as it arrives from a client, before validation.
///
/// Field names follow the wire format (`customerId`, `productCode`,
/// `quantity`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    /// Customer placing the order.
    pub customer_id: Option<String>,

    /// Code of the product being ordered.
    pub product_code: Option<String>,

    /// Number of units ordered.
    pub quantity: Option<i32>,
}

impl OrderSubmission {
    /// Create a submission with every field populated.
    #[must_use]
    pub fn new(
        customer_id: impl Into<String>,
        product_code: impl Into<String>,
        quantity: i32,
    ) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            product_code: Some(product_code.into()),
            quantity: Some(quantity),
        }
    }

    /// Validate the submission and turn it into an [`Order`].
    ///
    /// Fields are checked in wire order and the first violation is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a field is missing, a string field is
    /// blank, or the quantity is not positive.
    pub fn validate(self) -> Result<Order, ValidationError> {
        let customer_id = required_text("customerId", self.customer_id)?;
        let product_code = required_text("productCode", self.product_code)?;
        let quantity = self.quantity.ok_or(ValidationError::MissingField("quantity"))?;

        if quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity(quantity));
        }

        Ok(Order {
            customer_id,
            product_code,
            quantity,
        })
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(value)
}

/// A validated customer order.
///
/// Orders carry no identifier; the store assigns one on insert. Once built,
/// an order is only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    customer_id: String,
    product_code: String,
    quantity: i32,
}

impl Order {
    /// Customer placing the order.
    #[must_use]
    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Code of the product being ordered.
    #[must_use]
    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    /// Number of units ordered. Always positive.
    #[must_use]
    pub const fn quantity(&self) -> i32 {
        self.quantity
    }
}

/// The notification text derived from an [`Order`].
///
/// The format is fixed: `Customer: <customerId>, Product: <productCode>, Qty: <quantity>`.
/// Downstream consumers parse it, so it must stay byte-for-byte stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage(String);

impl NotificationMessage {
    /// Format the notification for an order.
    #[must_use]
    pub fn for_order(order: &Order) -> Self {
        Self(format!(
            "Customer: {}, Product: {}, Qty: {}",
            order.customer_id, order.product_code, order.quantity
        ))
    }

    /// The message body.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
