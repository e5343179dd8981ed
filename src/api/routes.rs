//! API routes

use crate::api::handlers::{
    get_artist_songs, get_artist_songs_page, health_check, search_artists, start_stream,
    subscribe_stream, AppState,
};
use crate::api::middleware::{rate_limit_middleware, RateLimiter};
use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{get, post},
    Router,
};

/// Build the API routes
///
/// Only the public search endpoint sits behind the rate limiter; the
/// remaining endpoints are guarded by the bearer-token check inside
/// their handlers.
pub fn build_api_routes(state: AppState, limiter: RateLimiter) -> Router {
    let search_routes = Router::new()
        .route("/api/v1/artists/search", get(search_artists))
        .layer(middleware::from_fn(
            move |mut req: Request, next: Next| {
                let limiter = limiter.clone();
                async move {
                    req.extensions_mut().insert(limiter);
                    rate_limit_middleware(req, next).await
                }
            },
        ));

    Router::new()
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/artists/songs", get(get_artist_songs))
        .route("/api/v1/artists/:id/songs", get(get_artist_songs_page))
        .route("/api/v1/artists/songs/stream", post(start_stream))
        .route("/api/v1/stream/:session_id", get(subscribe_stream))
        .merge(search_routes)
        .with_state(state)
}
