//! HTTP server
//!
//! Wires the catalog, cache, and streaming components into an Axum
//! router, applies the global middleware stack (trace ids, request
//! tracing, CORS), and serves with graceful shutdown.

use crate::api::handlers::AppState;
use crate::api::middleware::{trace_id_middleware, RateLimiter};
use crate::api::routes::build_api_routes;
use crate::cache::{CacheStore, MemoryCache};
use crate::catalog::{
    ArtistResolver, CatalogAggregator, GeniusClient, RetryPolicy, SongPageCache,
};
use crate::core::config::ServerConfig;
use crate::core::Config;
use crate::stream::{SessionBroadcaster, StreamJobRunner};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Interval for the cache sweep and rate-limiter cleanup task
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

pub struct ApiServer {
    router: Router,
    config: ServerConfig,
}

impl ApiServer {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let server_config = config.server.clone();
        let router = Self::build_router(config)?;

        Ok(Self {
            router,
            config: server_config,
        })
    }

    fn build_router(config: Config) -> anyhow::Result<Router> {
        let client = Arc::new(GeniusClient::new(
            config.catalog.base_url.clone(),
            Duration::from_secs(config.catalog.request_timeout),
        )?);

        let cache = Arc::new(MemoryCache::new());
        let cache_store: Arc<dyn CacheStore> = cache.clone();
        let ttl = Duration::from_secs(config.cache.ttl_seconds);

        let resolver = Arc::new(ArtistResolver::new(
            client.clone(),
            cache_store.clone(),
            RetryPolicy::ExponentialBackoff {
                attempts: config.catalog.search_retry_attempts,
                base: Duration::from_millis(config.catalog.search_backoff_base_ms),
            },
            ttl,
        ));

        let pages = Arc::new(SongPageCache::new(
            client.clone(),
            cache_store.clone(),
            ttl,
        ));

        let aggregator = Arc::new(CatalogAggregator::new(
            pages.clone(),
            cache_store.clone(),
            config.catalog.page_size,
            config.catalog.max_pages,
            ttl,
        ));

        // The streaming job retries resolution on a fixed delay instead of
        // the search path's exponential backoff
        let stream_resolver = Arc::new(ArtistResolver::new(
            client,
            cache_store.clone(),
            RetryPolicy::FixedDelay {
                attempts: config.stream.retry_attempts,
                delay: Duration::from_millis(config.stream.retry_delay_ms),
            },
            ttl,
        ));

        let broadcaster = Arc::new(SessionBroadcaster::new(config.stream.channel_capacity));
        let jobs = Arc::new(StreamJobRunner::new(
            stream_resolver,
            aggregator.clone(),
            cache_store,
            broadcaster.clone(),
            ttl,
        ));

        let state = AppState {
            resolver,
            pages,
            aggregator,
            jobs,
            broadcaster,
        };

        let limiter = RateLimiter::new(
            config.security.rate_limit_requests,
            config.security.rate_limit_window,
        );

        // Periodic maintenance: expired cache entries and idle rate-limit
        // buckets would otherwise only be dropped on access
        let sweep_cache = cache;
        let sweep_limiter = limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);
            loop {
                interval.tick().await;
                sweep_cache.sweep().await;
                sweep_limiter.cleanup_expired().await;
            }
        });

        let router = build_api_routes(state, limiter).layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(trace_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(Self::build_cors_layer(&config.security.allowed_origins)),
        );

        Ok(router)
    }

    fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
        use tower_http::cors::Any;

        let cors = CorsLayer::new();

        if allowed_origins.contains(&"*".to_string()) {
            cors.allow_origin(Any).allow_methods(Any).allow_headers(Any)
        } else {
            let origins: Vec<_> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            cors.allow_origin(origins).allow_methods(Any).allow_headers(Any)
        }
    }

    /// Start the HTTP server and block until graceful shutdown
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;
        info!(addr = %socket_addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");
        Ok(())
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Initiating graceful shutdown...");
}
