//! API request and response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for GET /api/v1/artists/songs
#[derive(Debug, Deserialize)]
pub struct ArtistSongsQuery {
    pub q: String,
}

/// Response body for the synchronous aggregation endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSongsResponse {
    pub artist_id: String,
    pub songs: Vec<String>,
}

/// Query parameters for GET /api/v1/artists/search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_search_per_page")]
    pub per_page: u32,
}

/// Query parameters for GET /api/v1/artists/:id/songs
#[derive(Debug, Deserialize)]
pub struct SongPageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_songs_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_search_per_page() -> u32 {
    10
}

fn default_songs_per_page() -> u32 {
    50
}

/// Request body for POST /api/v1/artists/songs/stream
#[derive(Debug, Serialize, Deserialize)]
pub struct StartStreamRequest {
    pub query: String,
}

/// Response body for POST /api/v1/artists/songs/stream
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStreamResponse {
    pub session_id: Uuid,
    pub topic: String,
}

/// Response body for GET /api/v1/health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
