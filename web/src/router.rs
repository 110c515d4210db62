//! Order intake HTTP router.

use crate::handlers;
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Create the order intake router.
///
/// # Routes
///
/// - `POST /orders` - Submit an order
/// - `GET /health` - Liveness probe
///
/// Every route runs inside the correlation ID middleware and an HTTP trace
/// layer.
///
/// # Example
///
/// ```rust,ignore
/// let app = order_router(AppState::new(Arc::new(pipeline)));
/// axum::serve(listener, app).await?;
/// ```
pub fn order_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(handlers::submit_order))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
