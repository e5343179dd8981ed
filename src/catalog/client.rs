//! Upstream catalog provider client
//!
//! This module defines the interface to the paginated upstream catalog
//! (a Genius-style lyrics API) and its production implementation over
//! reqwest. Failures are classified explicitly: `Transient` for
//! timeouts and connection errors (retry-eligible), `Provider` for
//! upstream-reported failures (never retried), `Auth` for rejected
//! credentials. Retry eligibility is never inferred from message text.

use crate::core::error::SetlistError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque bearer token forwarded to the upstream provider
///
/// The token is supplied per request by the caller; this layer only
/// validates its shape and never manages its lifecycle.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    /// Maximum accepted token length
    pub const MAX_LEN: usize = 200;

    pub fn new(raw: impl Into<String>) -> Result<Self, SetlistError> {
        let raw = raw.into();
        if raw.trim().is_empty() || raw.len() > Self::MAX_LEN {
            return Err(SetlistError::AuthenticationError(
                "missing or invalid bearer token".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens never appear in logs
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(****)")
    }
}

/// Errors surfaced by the catalog client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Timeout or connection failure; eligible for retry
    #[error("transient network failure: {0}")]
    Transient(String),

    /// Failure reported by the provider; never retried
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// Provider rejected the bearer token
    #[error("provider rejected credentials (status {status})")]
    Auth { status: u16 },

    /// Response body did not match the expected shape
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Transient(_))
    }
}

impl From<ClientError> for SetlistError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Auth { .. } => SetlistError::AuthenticationError(err.to_string()),
            ClientError::Transient(_)
            | ClientError::Provider { .. }
            | ClientError::Decode(_) => SetlistError::UpstreamError(err.to_string()),
        }
    }
}

/// Primary artist attached to a search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrimaryArtist {
    pub id: u64,
    pub name: String,
}

/// One result from the artist search endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub primary_artist: Option<PrimaryArtist>,
}

/// One song from the artist songs endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Song {
    pub id: u64,
    pub title: String,
}

/// One page of an artist's songs
///
/// `next_page == None` is the sole termination signal for a page walk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongPage {
    pub songs: Vec<Song>,
    #[serde(default)]
    pub next_page: Option<u32>,
}

/// Catalog client capability
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search for artists matching a query, one page at a time
    async fn search_artists(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
        token: &BearerToken,
    ) -> Result<Vec<SearchHit>, ClientError>;

    /// Fetch one page of an artist's songs
    async fn fetch_artist_songs(
        &self,
        artist_id: &str,
        page: u32,
        per_page: u32,
        token: &BearerToken,
    ) -> Result<SongPage, ClientError>;
}

/// Production catalog client over the Genius-style HTTP API
pub struct GeniusClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<HitEnvelope>,
}

#[derive(Debug, Deserialize)]
struct HitEnvelope {
    result: SearchHit,
}

#[derive(Debug, Deserialize)]
struct SongsEnvelope {
    response: SongPage,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl GeniusClient {
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self, SetlistError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                SetlistError::InitializationError(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn classify_request_error(err: reqwest::Error) -> ClientError {
        if err.is_timeout() || err.is_connect() {
            ClientError::Transient(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            // Treat remaining request-level failures (DNS, TLS, aborted
            // sockets) as transient network conditions
            ClientError::Transient(err.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ClientError::Auth {
                status: status.as_u16(),
            });
        }

        let message = match response.json::<ProviderErrorBody>().await {
            Ok(body) => body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };

        Err(ClientError::Provider {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CatalogClient for GeniusClient {
    async fn search_artists(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
        token: &BearerToken,
    ) -> Result<Vec<SearchHit>, ClientError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("page", &page.to_string()),
                ("per_page", &per_page.to_string()),
            ])
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(Self::classify_request_error)?;

        let response = Self::check_status(response).await?;
        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(envelope
            .response
            .hits
            .into_iter()
            .map(|hit| hit.result)
            .collect())
    }

    async fn fetch_artist_songs(
        &self,
        artist_id: &str,
        page: u32,
        per_page: u32,
        token: &BearerToken,
    ) -> Result<SongPage, ClientError> {
        let url = format!("{}/artists/{}/songs", self.base_url, artist_id);
        let response = self
            .http
            .get(&url)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(Self::classify_request_error)?;

        let response = Self::check_status(response).await?;
        let envelope: SongsEnvelope = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(envelope.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_validation() {
        assert!(BearerToken::new("valid-token").is_ok());
        assert!(BearerToken::new("").is_err());
        assert!(BearerToken::new("   ").is_err());
        assert!(BearerToken::new("x".repeat(201)).is_err());
        assert!(BearerToken::new("x".repeat(200)).is_ok());
    }

    #[test]
    fn test_bearer_token_debug_redacts() {
        let token = BearerToken::new("super-secret").unwrap();
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ClientError::Transient("timed out".into()).is_transient());
        assert!(!ClientError::Provider {
            status: 500,
            message: "server error".into()
        }
        .is_transient());
        assert!(!ClientError::Auth { status: 401 }.is_transient());
        assert!(!ClientError::Decode("bad json".into()).is_transient());
    }

    #[test]
    fn test_client_error_maps_to_setlist_error() {
        let err: SetlistError = ClientError::Auth { status: 401 }.into();
        assert!(matches!(err, SetlistError::AuthenticationError(_)));

        let err: SetlistError = ClientError::Provider {
            status: 503,
            message: "unavailable".into(),
        }
        .into();
        assert!(matches!(err, SetlistError::UpstreamError(_)));

        let err: SetlistError = ClientError::Transient("timeout".into()).into();
        assert!(matches!(err, SetlistError::UpstreamError(_)));
    }

    #[test]
    fn test_search_envelope_parsing() {
        let raw = r#"{
            "response": {
                "hits": [
                    {
                        "result": {
                            "id": 10,
                            "title": "HUMBLE.",
                            "primary_artist": {"id": 1234, "name": "Kendrick Lamar"}
                        }
                    },
                    {
                        "result": {"id": 11, "title": "Orphan Song"}
                    }
                ]
            }
        }"#;

        let envelope: SearchEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.response.hits.len(), 2);
        let first = &envelope.response.hits[0].result;
        assert_eq!(first.primary_artist.as_ref().unwrap().id, 1234);
        assert!(envelope.response.hits[1].result.primary_artist.is_none());
    }

    #[test]
    fn test_songs_envelope_parsing() {
        let raw = r#"{
            "response": {
                "songs": [{"id": 1, "title": "HUMBLE."}, {"id": 2, "title": "DNA."}],
                "next_page": 2
            }
        }"#;

        let envelope: SongsEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.response.songs.len(), 2);
        assert_eq!(envelope.response.next_page, Some(2));

        let last = r#"{"response": {"songs": [], "next_page": null}}"#;
        let envelope: SongsEnvelope = serde_json::from_str(last).unwrap();
        assert!(envelope.response.songs.is_empty());
        assert_eq!(envelope.response.next_page, None);
    }
}
