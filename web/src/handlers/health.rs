//! Health check endpoint.

use axum::http::StatusCode;

/// Liveness probe.
///
/// Returns 200 OK while the process is serving requests. It does not check
/// the database or the broker: the pipeline resolves both per request and
/// reports their failures in the order response.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
