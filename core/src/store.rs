//! Persistence port: named store lookup, handle acquisition and the order insert.
//!
//! The pipeline never talks to a database directly. It asks a
//! [`StoreRegistry`] for a provider bound under some name, asks that
//! [`StoreProvider`] for a [`StoreHandle`], and runs exactly one insert through
//! the handle.
//!
//! ```text
//! StoreRegistry::lookup(name) ──► StoreProvider::connect() ──► StoreHandle::insert_order(order)
//!        │                              │                              │
//!   NotFound / Lookup              Acquisition                   Insert error
//! ```
//!
//! # Release
//!
//! A handle is released by dropping it. Implementations return pooled
//! connections (or close dedicated ones) in `Drop`, so every exit path of the
//! caller releases the handle exactly once, including early returns and
//! cancelled futures.
//!
//! # Implementations
//!
//! - `PgStoreRegistry` (in `order-intake-postgres`): `sqlx` pools bound under names
//! - `InMemoryStoreRegistry` (in `order-intake-testing`): scripted outcomes with call accounting
//!
//! # Dyn Compatibility
//!
//! These traits return `Pin<Box<dyn Future>>` instead of using `async fn` so
//! they can be held as `Arc<dyn StoreRegistry>` by the resolver.

use crate::order::Order;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the naming/registry service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Nothing is bound under the requested name.
    #[error("name not bound: {0}")]
    NotFound(String),

    /// The registry itself could not be queried.
    #[error("lookup failed for '{name}': {reason}")]
    Unavailable {
        /// The name being looked up.
        name: String,
        /// Why the lookup failed.
        reason: String,
    },
}

/// Errors raised while acquiring or using a store handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No connection could be obtained from the provider.
    #[error("connection acquisition failed: {0}")]
    Acquisition(String),

    /// The insert statement failed.
    #[error("insert failed: {0}")]
    Insert(String),
}

/// Naming service that maps logical identifiers to store providers.
pub trait StoreRegistry: Send + Sync {
    /// Look up the provider bound under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] when nothing is bound under `name`,
    /// or [`LookupError::Unavailable`] when the registry cannot be queried.
    fn lookup(
        &self,
        name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn StoreProvider>, LookupError>> + Send + '_>>;
}

/// Something a handle can be acquired from (a pool, a data source).
pub trait StoreProvider: Send + Sync {
    /// Acquire an exclusively owned handle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Acquisition`] if no connection can be obtained.
    fn connect(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn StoreHandle>, StoreError>> + Send + '_>>;
}

/// An exclusively owned, scoped connection to the order store.
///
/// Dropping the handle releases it.
pub trait StoreHandle: Send {
    /// Insert one order row.
    ///
    /// The statement shape is fixed:
    /// `INSERT INTO orders (customer_id, product_code, quantity) VALUES (?, ?, ?)`.
    ///
    /// # Returns
    ///
    /// The number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Insert`] if the statement fails.
    fn insert_order<'a>(
        &'a mut self,
        order: &'a Order,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + 'a>>;
}
