//! In-memory [`StoreRegistry`] with scripted bindings and a shared ledger.
//!
//! Every lookup, connection and insert is recorded in a [`StoreLedger`], and
//! every handle counts itself as released when dropped, so tests can assert
//! both what was called and that nothing leaked.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only happens after a test already panicked

use order_intake_core::order::Order;
use order_intake_core::store::{LookupError, StoreError, StoreHandle, StoreProvider, StoreRegistry};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// How a bound name behaves when used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Connects and inserts one row.
    Healthy,
    /// Connects, but the insert reports zero rows affected.
    NoRowsAffected,
    /// Lookup succeeds but acquiring a connection fails with this reason.
    RefuseConnection(String),
    /// Connects, but the insert fails with this reason.
    FailInsert(String),
    /// Lookup itself fails as if the registry were down.
    LookupUnavailable(String),
    /// Acquisition never completes.
    StallConnect,
    /// Connects, but the insert never completes.
    StallInsert,
}

/// One row written through a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedRow {
    /// Name the handle was resolved from.
    pub binding: String,
    /// `customer_id` parameter.
    pub customer_id: String,
    /// `product_code` parameter.
    pub product_code: String,
    /// `quantity` parameter.
    pub quantity: i32,
}

#[derive(Debug, Default)]
struct LedgerState {
    lookups: Vec<String>,
    connect_attempts: Vec<String>,
    inserts: Vec<InsertedRow>,
    handles_opened: usize,
    handles_released: usize,
}

/// Shared record of everything the registry was asked to do.
#[derive(Debug, Clone, Default)]
pub struct StoreLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl StoreLedger {
    /// Names passed to `lookup`, in call order.
    #[must_use]
    pub fn lookups(&self) -> Vec<String> {
        self.state.lock().unwrap().lookups.clone()
    }

    /// Names whose provider was asked to connect, in call order.
    #[must_use]
    pub fn connect_attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().connect_attempts.clone()
    }

    /// Rows inserted (including zero-row inserts), in call order.
    #[must_use]
    pub fn inserts(&self) -> Vec<InsertedRow> {
        self.state.lock().unwrap().inserts.clone()
    }

    /// Handles successfully acquired.
    #[must_use]
    pub fn handles_opened(&self) -> usize {
        self.state.lock().unwrap().handles_opened
    }

    /// Handles dropped.
    #[must_use]
    pub fn handles_released(&self) -> usize {
        self.state.lock().unwrap().handles_released
    }

    /// Whether the registry was not touched at all.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.lookups.is_empty() && state.connect_attempts.is_empty() && state.inserts.is_empty()
    }
}

/// In-memory naming service for tests.
///
/// # Example
///
/// ```
/// use order_intake_testing::{Binding, InMemoryStoreRegistry};
///
/// let registry = InMemoryStoreRegistry::new()
///     .bind("customer-orders", Binding::Healthy)
///     .bind("db/customer-orders", Binding::RefuseConnection("pool closed".into()));
/// let ledger = registry.ledger();
/// assert!(ledger.is_untouched());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoreRegistry {
    bindings: HashMap<String, Binding>,
    ledger: StoreLedger,
}

impl InMemoryStoreRegistry {
    /// Create a registry with nothing bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` with the given behaviour.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.bindings.insert(name.into(), binding);
        self
    }

    /// Handle to the shared ledger.
    #[must_use]
    pub fn ledger(&self) -> StoreLedger {
        self.ledger.clone()
    }
}

impl StoreRegistry for InMemoryStoreRegistry {
    fn lookup(
        &self,
        name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn StoreProvider>, LookupError>> + Send + '_>> {
        let name = name.to_string();
        Box::pin(async move {
            self.ledger.state.lock().unwrap().lookups.push(name.clone());

            match self.bindings.get(&name) {
                None => Err(LookupError::NotFound(name)),
                Some(Binding::LookupUnavailable(reason)) => Err(LookupError::Unavailable {
                    name,
                    reason: reason.clone(),
                }),
                Some(binding) => Ok(Arc::new(InMemoryProvider {
                    name,
                    binding: binding.clone(),
                    ledger: self.ledger.clone(),
                }) as Arc<dyn StoreProvider>),
            }
        })
    }
}

struct InMemoryProvider {
    name: String,
    binding: Binding,
    ledger: StoreLedger,
}

impl StoreProvider for InMemoryProvider {
    fn connect(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn StoreHandle>, StoreError>> + Send + '_>> {
        Box::pin(async move {
            self.ledger
                .state
                .lock()
                .unwrap()
                .connect_attempts
                .push(self.name.clone());

            match &self.binding {
                Binding::RefuseConnection(reason) => Err(StoreError::Acquisition(reason.clone())),
                Binding::StallConnect => std::future::pending().await,
                _ => {
                    self.ledger.state.lock().unwrap().handles_opened += 1;
                    Ok(Box::new(InMemoryHandle {
                        name: self.name.clone(),
                        binding: self.binding.clone(),
                        ledger: self.ledger.clone(),
                    }) as Box<dyn StoreHandle>)
                },
            }
        })
    }
}

struct InMemoryHandle {
    name: String,
    binding: Binding,
    ledger: StoreLedger,
}

impl StoreHandle for InMemoryHandle {
    fn insert_order<'a>(
        &'a mut self,
        order: &'a Order,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            match &self.binding {
                Binding::FailInsert(reason) => return Err(StoreError::Insert(reason.clone())),
                Binding::StallInsert => return std::future::pending().await,
                _ => {},
            }

            self.ledger.state.lock().unwrap().inserts.push(InsertedRow {
                binding: self.name.clone(),
                customer_id: order.customer_id().to_string(),
                product_code: order.product_code().to_string(),
                quantity: order.quantity(),
            });

            if self.binding == Binding::NoRowsAffected {
                Ok(0)
            } else {
                Ok(1)
            }
        })
    }
}

impl Drop for InMemoryHandle {
    fn drop(&mut self) {
        if let Ok(mut state) = self.ledger.state.lock() {
            state.handles_released += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_intake_core::order::OrderSubmission;

    #[tokio::test]
    async fn unbound_name_is_not_found() {
        let registry = InMemoryStoreRegistry::new();
        let result = registry.lookup("missing").await;
        assert!(matches!(result, Err(LookupError::NotFound(name)) if name == "missing"));
        assert_eq!(registry.ledger().lookups(), vec!["missing".to_string()]);
    }

    #[tokio::test]
    async fn dropping_a_handle_releases_it() {
        let registry = InMemoryStoreRegistry::new().bind("db", Binding::Healthy);
        let ledger = registry.ledger();
        let order = OrderSubmission::new("C1", "P9", 3).validate().unwrap();

        let provider = registry.lookup("db").await.unwrap();
        let mut handle = provider.connect().await.unwrap();
        assert_eq!(handle.insert_order(&order).await.unwrap(), 1);
        assert_eq!(ledger.handles_released(), 0);

        drop(handle);
        assert_eq!(ledger.handles_opened(), 1);
        assert_eq!(ledger.handles_released(), 1);
        assert_eq!(ledger.inserts()[0].binding, "db");
    }
}
