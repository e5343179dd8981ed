//! Bearer token extraction
//!
//! Every catalog-touching endpoint forwards the caller's token upstream
//! verbatim. This layer only checks the header shape; the provider is
//! the authority on whether the token is actually valid.

use crate::catalog::BearerToken;
use crate::core::error::{Result, SetlistError};
use axum::http::{header, HeaderMap};

/// Extract and validate the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<BearerToken> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            SetlistError::AuthenticationError("missing Authorization header".to_string())
        })?;

    let raw = value.strip_prefix("Bearer ").ok_or_else(|| {
        SetlistError::AuthenticationError(
            "Authorization header must use the Bearer scheme".to_string(),
        )
    })?;

    BearerToken::new(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extracts_bearer_token() {
        let token = bearer_token(&headers_with("Bearer abc123")).unwrap();
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn test_missing_header_is_auth_error() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, SetlistError::AuthenticationError(_)));
    }

    #[test]
    fn test_wrong_scheme_is_auth_error() {
        let err = bearer_token(&headers_with("Basic abc123")).unwrap_err();
        assert!(matches!(err, SetlistError::AuthenticationError(_)));
    }

    #[test]
    fn test_blank_or_oversized_token_is_auth_error() {
        let err = bearer_token(&headers_with("Bearer    ")).unwrap_err();
        assert!(matches!(err, SetlistError::AuthenticationError(_)));

        let oversized = format!("Bearer {}", "x".repeat(201));
        let err = bearer_token(&headers_with(&oversized)).unwrap_err();
        assert!(matches!(err, SetlistError::AuthenticationError(_)));
    }
}
