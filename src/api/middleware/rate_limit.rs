//! Per-IP sliding-window rate limiter
//!
//! Applied to the public search endpoint. Request timestamps are kept
//! per client IP; a request is rejected with 429 and a `Retry-After`
//! header once the window is full.

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<RwLock<HashMap<IpAddr, Vec<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_seconds: u64) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Check whether a request from this IP fits in the current window
    pub async fn check(&self, ip: IpAddr) -> Result<(), RateLimitExceeded> {
        let mut state = self.requests.write().await;
        let now = Instant::now();
        let window_start = now - self.window;

        let timestamps = state.entry(ip).or_default();
        timestamps.retain(|&t| t > window_start);

        if timestamps.len() >= self.max_requests {
            let retry_after = timestamps
                .first()
                .map(|&oldest| oldest.duration_since(window_start).as_secs().max(1))
                .unwrap_or(1);
            return Err(RateLimitExceeded {
                limit: self.max_requests,
                window_seconds: self.window.as_secs(),
                retry_after,
            });
        }

        timestamps.push(now);
        Ok(())
    }

    /// Drop IPs with no requests in the current window
    pub async fn cleanup_expired(&self) {
        let mut state = self.requests.write().await;
        let window_start = Instant::now() - self.window;
        state.retain(|_, timestamps| {
            timestamps.retain(|&t| t > window_start);
            !timestamps.is_empty()
        });
    }
}

#[derive(Debug)]
pub struct RateLimitExceeded {
    pub limit: usize,
    pub window_seconds: u64,
    pub retry_after: u64,
}

impl IntoResponse for RateLimitExceeded {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "RateLimited",
            "message": format!(
                "Rate limit exceeded. Maximum {} requests per {} seconds allowed.",
                self.limit, self.window_seconds
            ),
            "details": {
                "limit": self.limit,
                "window_seconds": self.window_seconds,
                "retry_after": self.retry_after,
            }
        }));

        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        response.headers_mut().insert(
            "Retry-After",
            HeaderValue::from_str(&self.retry_after.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("60")),
        );
        response
    }
}

/// Middleware enforcing the rate limit for the routes it wraps
///
/// The limiter itself is injected through request extensions so one
/// shared instance covers every wrapped route.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = match request.extensions().get::<RateLimiter>().cloned() {
        Some(limiter) => limiter,
        None => return next.run(request).await,
    };

    let client_ip = extract_client_ip(&request);
    if let Err(exceeded) = limiter.check(client_ip).await {
        tracing::warn!(ip = %client_ip, limit = exceeded.limit, "rate limit exceeded");
        return exceeded.into_response();
    }

    next.run(request).await
}

/// Best-effort client IP: proxy headers first, loopback as the fallback
fn extract_client_ip(request: &Request) -> IpAddr {
    if let Some(forwarded) = request.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first) = forwarded_str.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }

    if let Some(real_ip) = request.headers().get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            if let Ok(ip) = ip_str.parse::<IpAddr>() {
                return ip;
            }
        }
    }

    IpAddr::from([127, 0, 0, 1])
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

    #[tokio::test]
    async fn test_allows_requests_within_limit() {
        let limiter = RateLimiter::new(5, 60);
        let ip = IpAddr::from([127, 0, 0, 1]);

        for _ in 0..5 {
            assert!(limiter.check(ip).await.is_ok());
        }
        assert!(limiter.check(ip).await.is_err());
    }

    #[tokio::test]
    async fn test_ips_are_limited_independently() {
        let limiter = RateLimiter::new(2, 60);
        let ip1 = IpAddr::from([10, 0, 0, 1]);
        let ip2 = IpAddr::from([10, 0, 0, 2]);

        assert!(limiter.check(ip1).await.is_ok());
        assert!(limiter.check(ip1).await.is_ok());
        assert!(limiter.check(ip1).await.is_err());

        assert!(limiter.check(ip2).await.is_ok());
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = RateLimiter::new(2, 1);
        let ip = IpAddr::from([127, 0, 0, 1]);

        assert!(limiter.check(ip).await.is_ok());
        assert!(limiter.check(ip).await.is_ok());
        assert!(limiter.check(ip).await.is_err());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(limiter.check(ip).await.is_ok());
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_ips() {
        let limiter = RateLimiter::new(5, 1);
        let ip = IpAddr::from([127, 0, 0, 1]);
        limiter.check(ip).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;
        limiter.cleanup_expired().await;

        assert!(limiter.requests.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_middleware_returns_429_with_retry_after() {
        let limiter = RateLimiter::new(1, 60);
        let app = Router::new()
            .route("/search", get(|| async { "OK" }))
            .layer(middleware::from_fn(
                move |mut req: Request<Body>, next: Next| {
                    let limiter = limiter.clone();
                    async move {
                        req.extensions_mut().insert(limiter);
                        rate_limit_middleware(req, next).await
                    }
                },
            ));

        let ok = app
            .clone()
            .oneshot(Request::builder().uri("/search").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let limited = app
            .oneshot(Request::builder().uri("/search").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.headers().contains_key("Retry-After"));

        let body = axum::body::to_bytes(limited.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "RateLimited");
        assert_eq!(json["details"]["limit"], 1);
    }

    #[tokio::test]
    async fn test_client_ip_from_forwarded_headers() {
        let request = Request::builder()
            .uri("/search")
            .header("X-Forwarded-For", "192.168.1.100, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request), IpAddr::from([192, 168, 1, 100]));

        let request = Request::builder()
            .uri("/search")
            .header("X-Real-IP", "192.168.1.200")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request), IpAddr::from([192, 168, 1, 200]));

        let request = Request::builder().uri("/search").body(Body::empty()).unwrap();
        assert_eq!(extract_client_ip(&request), IpAddr::from([127, 0, 0, 1]));
    }
}
