//! Artist endpoints
//!
//! Thin handlers: extract the bearer token, validate inputs, delegate to
//! the resolver/aggregator, and shape the response.

use crate::api::middleware::bearer_token;
use crate::api::models::{ArtistSongsQuery, ArtistSongsResponse, SearchQuery, SongPageQuery};
use crate::core::error::Result;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use super::AppState;

/// Handler for GET /api/v1/artists/search - one page of artist search hits
pub async fn search_artists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;
    let page = state
        .resolver
        .search_page(&query.q, query.page, query.per_page, &token)
        .await?;

    Ok(Json(page))
}

/// Handler for GET /api/v1/artists/songs - full deduplicated catalog
pub async fn get_artist_songs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ArtistSongsQuery>,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;
    let artist_id = state.resolver.resolve(&query.q, &token).await?;
    let result = state.aggregator.aggregate_all(&artist_id, &token).await?;

    Ok(Json(ArtistSongsResponse {
        artist_id: result.artist_id,
        songs: result.titles,
    }))
}

/// Handler for GET /api/v1/artists/:id/songs - single song page
pub async fn get_artist_songs_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(artist_id): Path<String>,
    Query(query): Query<SongPageQuery>,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;
    let song_page = state
        .pages
        .fetch_page(&artist_id, query.page, query.per_page, &token)
        .await?;

    Ok(Json(song_page))
}
