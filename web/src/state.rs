//! Application state shared by the HTTP handlers.

use order_intake_core::OrderPipeline;
use std::sync::Arc;

/// Shared state: the order pipeline.
///
/// Cloning is cheap; every clone points at the same pipeline.
///
/// # Examples
///
/// ```ignore
/// let pipeline = OrderPipeline::new(registry, notifier, config);
/// let app = order_router(AppState::new(Arc::new(pipeline)));
/// ```
#[derive(Clone, Debug)]
pub struct AppState {
    pipeline: Arc<OrderPipeline>,
}

impl AppState {
    /// Create state around an existing pipeline.
    #[must_use]
    pub const fn new(pipeline: Arc<OrderPipeline>) -> Self {
        Self { pipeline }
    }

    /// The order pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &OrderPipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone_send_sync() {
        fn assert_state<T: Clone + Send + Sync + 'static>() {}
        assert_state::<AppState>();
    }
}
