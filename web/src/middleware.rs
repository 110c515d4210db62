//! Correlation ID middleware.
//!
//! Every request gets a correlation ID: the caller's `X-Correlation-ID` if it
//! sent a usable one, a fresh UUID v4 otherwise. The ID is
//!
//! 1. stored in the request extensions as a [`CorrelationId`],
//! 2. recorded on an `http_request` tracing span wrapping the handler, so the
//!    pipeline's `order_submission` span and all its logs carry it,
//! 3. echoed back in the response `X-Correlation-ID` header.
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use order_intake_web::middleware::correlation_id_layer;
//!
//! let app = Router::new()
//!     .route("/orders", post(submit_order))
//!     .layer(correlation_id_layer());
//! ```

use crate::extractors::CorrelationId;
use axum::{extract::Request, http::HeaderValue, response::Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Longest caller-supplied ID that is accepted as is.
pub const MAX_CORRELATION_ID_LEN: usize = 128;

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(CorrelationId::parse)
            .unwrap_or_else(CorrelationId::generate);

        req.extensions_mut().insert(correlation_id.clone());

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Ok(header_value) = HeaderValue::from_str(correlation_id.as_str()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> Router {
        Router::new()
            .route("/test", get(|id: CorrelationId| async move { id.to_string() }))
            .layer(correlation_id_layer())
    }

    async fn response_id(request: Request<Body>) -> (String, String) {
        let response = app().oneshot(request).await.unwrap();
        let header = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present")
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (header, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_correlation_id_generated_if_missing() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let (header, body) = response_id(request).await;

        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(header, body, "handler sees the same ID the client gets back");
    }

    #[tokio::test]
    async fn test_correlation_id_preserved_from_request() {
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, "order-client-42")
            .body(Body::empty())
            .unwrap();

        let (header, body) = response_id(request).await;

        assert_eq!(header, "order-client-42");
        assert_eq!(body, "order-client-42");
    }

    #[tokio::test]
    async fn test_oversized_id_is_replaced() {
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, "x".repeat(MAX_CORRELATION_ID_LEN + 1))
            .body(Body::empty())
            .unwrap();

        let (header, _) = response_id(request).await;

        assert!(Uuid::parse_str(&header).is_ok());
    }
}
