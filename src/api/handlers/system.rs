//! System endpoints

use crate::api::models::HealthResponse;
use axum::Json;
use chrono::Utc;

/// Handler for GET /api/v1/health - liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await.0;
        assert_eq!(response.status, "ok");
        assert!(!response.version.is_empty());
    }
}
