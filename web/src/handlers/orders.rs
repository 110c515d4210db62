//! Order submission endpoint.

use crate::extractors::CorrelationId;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use order_intake_core::{Order, OrderSubmission, ResultEnvelope};

/// Submit an order.
///
/// A missing, non-JSON or malformed body is handed to the pipeline as an
/// absent payload, so the caller always gets an envelope back. The HTTP
/// status always equals the envelope `code`.
///
/// # Endpoint
///
/// ```text
/// POST /orders
/// Content-Type: application/json
///
/// {"customerId": "C1", "productCode": "P9", "quantity": 3}
/// ```
///
/// # Response
///
/// ```json
/// {
///   "code": 200,
///   "message": "Order received and processed",
///   "data": {"customerId": "C1", "productCode": "P9", "quantity": 3}
/// }
/// ```
///
/// Failures omit `data`:
///
/// ```json
/// {"code": 500, "message": "Failed to process order: ..."}
/// ```
pub async fn submit_order(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    payload: Option<Json<OrderSubmission>>,
) -> (StatusCode, Json<ResultEnvelope<Order>>) {
    if payload.is_none() {
        tracing::debug!(
            correlation_id = %correlation_id,
            "Request body missing or not a valid order"
        );
    }

    let envelope = state.pipeline().submit(payload.map(|Json(submission)| submission)).await;
    let status = StatusCode::from_u16(envelope.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(envelope))
}
