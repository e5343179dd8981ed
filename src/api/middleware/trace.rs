//! Per-request trace IDs
//!
//! Each request gets a UUID v4 trace id, carried through an `info_span`
//! so every log line inside the request includes it, and stamped on the
//! response as `X-Trace-Id`.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::{info_span, Instrument};
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// Extension type carrying the trace id for handlers
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn trace_id_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    request.extensions_mut().insert(TraceId(trace_id.clone()));

    let response = async move {
        tracing::info!("request started");
        let response = next.run(request).await;
        tracing::info!(status = %response.status(), "request completed");
        response
    }
    .instrument(span)
    .await;

    let (mut parts, body) = response.into_parts();
    parts.headers.insert(
        TRACE_ID_HEADER,
        HeaderValue::from_str(&trace_id).unwrap_or_else(|_| HeaderValue::from_static("invalid")),
    );
    Response::from_parts(parts, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/test", get(|| async { StatusCode::OK }))
            .layer(middleware::from_fn(trace_id_middleware))
    }

    #[tokio::test]
    async fn test_response_carries_a_valid_trace_id() {
        let response = app()
            .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let trace_id = response.headers().get(TRACE_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(trace_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_trace_ids_are_unique_per_request() {
        let first = app()
            .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let second = app()
            .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_ne!(
            first.headers().get(TRACE_ID_HEADER),
            second.headers().get(TRACE_ID_HEADER)
        );
    }
}
