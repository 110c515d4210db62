//! HTTP request handlers.

pub mod health;
pub mod orders;

pub use health::health_check;
pub use orders::submit_order;
