//! Artist resolver
//!
//! Maps a human artist query to the provider's canonical artist id:
//! normalize, consult the cache, otherwise search the catalog under the
//! retry policy and extract the first hit's primary artist.
//!
//! Cache policy is success-only: a resolved id is cached for the TTL,
//! but a miss against the provider is never cached (no negative
//! caching). Concurrent misses for the same normalized query share one
//! upstream call through the single-flight lock.

use crate::cache::{keys, CacheStore, KeyedLock};
use crate::catalog::client::{BearerToken, CatalogClient, SearchHit};
use crate::catalog::retry::{with_retry, RetryPolicy};
use crate::core::error::{Result, SetlistError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Maximum accepted query length in characters
pub const MAX_QUERY_LEN: usize = 100;

/// Page of artist search hits, as served by `search_page`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistSearchPage {
    pub hits: Vec<SearchHit>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
}

pub struct ArtistResolver {
    client: Arc<dyn CatalogClient>,
    cache: Arc<dyn CacheStore>,
    flight: KeyedLock,
    policy: RetryPolicy,
    ttl: Duration,
}

impl ArtistResolver {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        cache: Arc<dyn CacheStore>,
        policy: RetryPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            client,
            cache,
            flight: KeyedLock::new(),
            policy,
            ttl,
        }
    }

    /// Normalize a query: trim, lower-case, bound the length
    pub fn normalize(query: &str) -> Result<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_QUERY_LEN {
            return Err(SetlistError::ValidationError(
                "missing or invalid artist name".to_string(),
            ));
        }
        Ok(trimmed.to_lowercase())
    }

    /// Resolve a query to the provider's artist id
    pub async fn resolve(&self, query: &str, token: &BearerToken) -> Result<String> {
        let normalized = Self::normalize(query)?;
        let cache_key = keys::artist_id(&normalized);

        if let Some(artist_id) = self.cache.get(&cache_key).await {
            tracing::debug!(query = %normalized, artist_id = %artist_id, "resolver cache hit");
            return Ok(artist_id);
        }

        let _guard = self.flight.acquire(&cache_key).await;

        // Another caller may have filled the cache while we waited
        if let Some(artist_id) = self.cache.get(&cache_key).await {
            return Ok(artist_id);
        }

        let hits = with_retry(&self.policy, || {
            self.client.search_artists(&normalized, 1, 10, token)
        })
        .await
        .map_err(SetlistError::from)?;

        let artist_id = hits
            .first()
            .and_then(|hit| hit.primary_artist.as_ref())
            .map(|artist| artist.id.to_string())
            .ok_or_else(|| {
                SetlistError::NotFound(format!("no primary artist found for '{}'", normalized))
            })?;

        self.cache
            .set(&cache_key, artist_id.clone(), self.ttl)
            .await;

        tracing::info!(query = %normalized, artist_id = %artist_id, "artist resolved");
        Ok(artist_id)
    }

    /// One page of artist search hits, cached only when non-empty
    ///
    /// Empty pages are deliberately not cached, mirroring the resolver's
    /// success-only policy for this namespace.
    pub async fn search_page(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
        token: &BearerToken,
    ) -> Result<ArtistSearchPage> {
        let normalized = Self::normalize(query)?;
        let page = clamp_page(page);
        let per_page = clamp_per_page(per_page);
        let cache_key = keys::artist_search(&normalized, page, per_page);

        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(result) = serde_json::from_str::<ArtistSearchPage>(&cached) {
                return Ok(result);
            }
        }

        let hits = with_retry(&self.policy, || {
            self.client.search_artists(&normalized, page, per_page, token)
        })
        .await
        .map_err(SetlistError::from)?;

        let result = ArtistSearchPage {
            total: hits.len(),
            hits,
            page,
            per_page,
        };

        if !result.hits.is_empty() {
            self.cache
                .set(&cache_key, serde_json::to_string(&result)?, self.ttl)
                .await;
        }

        Ok(result)
    }
}

/// Clamp a 1-based page number
pub fn clamp_page(page: u32) -> u32 {
    page.max(1)
}

/// Clamp per-page to the provider's accepted range, defaulting to 10
pub fn clamp_per_page(per_page: u32) -> u32 {
    if (1..=50).contains(&per_page) {
        per_page
    } else {
        10
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::catalog::test_support::{artist_hit, orphan_hit, token, MockCatalogClient, MockFailure};

    fn resolver_with(client: Arc<MockCatalogClient>) -> (ArtistResolver, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let resolver = ArtistResolver::new(
            client,
            cache.clone(),
            RetryPolicy::ExponentialBackoff {
                attempts: 3,
                base: Duration::from_millis(500),
            },
            Duration::from_secs(600),
        );
        (resolver, cache)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(ArtistResolver::normalize("  Adele ").unwrap(), "adele");
        assert_eq!(
            ArtistResolver::normalize("Kendrick Lamar").unwrap(),
            "kendrick lamar"
        );
        assert!(ArtistResolver::normalize("").is_err());
        assert!(ArtistResolver::normalize("   ").is_err());
        assert!(ArtistResolver::normalize(&"x".repeat(101)).is_err());
        assert!(ArtistResolver::normalize(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_paging_clamps() {
        assert_eq!(clamp_page(0), 1);
        assert_eq!(clamp_page(7), 7);
        assert_eq!(clamp_per_page(0), 10);
        assert_eq!(clamp_per_page(51), 10);
        assert_eq!(clamp_per_page(50), 50);
    }

    #[tokio::test]
    async fn test_resolve_extracts_primary_artist() {
        let client = Arc::new(MockCatalogClient::new());
        client.push_search_hits(vec![artist_hit(1234, "Kendrick Lamar")]);
        let (resolver, _cache) = resolver_with(client.clone());

        let artist_id = resolver.resolve("kendrick lamar", &token()).await.unwrap();
        assert_eq!(artist_id, "1234");
        assert_eq!(client.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_equivalent_queries_share_one_cache_entry() {
        let client = Arc::new(MockCatalogClient::new());
        client.push_search_hits(vec![artist_hit(42, "Adele")]);
        let (resolver, cache) = resolver_with(client.clone());

        let first = resolver.resolve("Adele", &token()).await.unwrap();
        // Differently-cased and padded rendering of the same query: must
        // hit the cache, zero further provider calls
        let second = resolver.resolve("  ADELE ", &token()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.search_calls(), 1);
        assert_eq!(cache.get("artist_id:adele").await, Some("42".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_exactly_three() {
        let client = Arc::new(MockCatalogClient::new());
        for _ in 0..3 {
            client.push_search_failure(MockFailure::Transient);
        }
        let (resolver, _cache) = resolver_with(client.clone());

        let err = resolver.resolve("adele", &token()).await.unwrap_err();
        assert!(matches!(err, SetlistError::UpstreamError(_)));
        assert_eq!(client.search_calls(), 3);
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_retried() {
        let client = Arc::new(MockCatalogClient::new());
        client.push_search_failure(MockFailure::Provider(500));
        let (resolver, _cache) = resolver_with(client.clone());

        let err = resolver.resolve("adele", &token()).await.unwrap_err();
        assert!(matches!(err, SetlistError::UpstreamError(_)));
        assert_eq!(client.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_no_negative_caching() {
        let client = Arc::new(MockCatalogClient::new());
        client.push_search_hits(vec![]);
        let (resolver, cache) = resolver_with(client.clone());

        let err = resolver.resolve("unknown artist", &token()).await.unwrap_err();
        assert!(matches!(err, SetlistError::NotFound(_)));
        assert_eq!(cache.get("artist_id:unknown artist").await, None);
    }

    #[tokio::test]
    async fn test_hit_without_primary_artist_is_not_found() {
        let client = Arc::new(MockCatalogClient::new());
        client.push_search_hits(vec![orphan_hit()]);
        let (resolver, cache) = resolver_with(client.clone());

        let err = resolver.resolve("orphan", &token()).await.unwrap_err();
        assert!(matches!(err, SetlistError::NotFound(_)));
        assert_eq!(cache.get("artist_id:orphan").await, None);
    }

    #[tokio::test]
    async fn test_validation_happens_before_cache_and_network() {
        let client = Arc::new(MockCatalogClient::new());
        let (resolver, _cache) = resolver_with(client.clone());

        let err = resolver.resolve("   ", &token()).await.unwrap_err();
        assert!(matches!(err, SetlistError::ValidationError(_)));
        assert_eq!(client.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_upstream_call() {
        let client = Arc::new(
            MockCatalogClient::new().with_response_delay(Duration::from_millis(20)),
        );
        // Only one scripted response: if both tasks reached the provider,
        // the second would fail on an unscripted call
        client.push_search_hits(vec![artist_hit(7, "Bj\u{f6}rk")]);
        let (resolver, _cache) = resolver_with(client.clone());
        let resolver = Arc::new(resolver);

        let a = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve("bj\u{f6}rk", &token()).await })
        };
        let b = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve("bj\u{f6}rk", &token()).await })
        };

        assert_eq!(a.await.unwrap().unwrap(), "7");
        assert_eq!(b.await.unwrap().unwrap(), "7");
        assert_eq!(client.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_page_caches_only_non_empty_results() {
        let client = Arc::new(MockCatalogClient::new());
        client.push_search_hits(vec![]);
        client.push_search_hits(vec![artist_hit(5, "Adele")]);
        let (resolver, _cache) = resolver_with(client.clone());

        // Empty result is served but not cached
        let empty = resolver.search_page("adele", 1, 10, &token()).await.unwrap();
        assert!(empty.hits.is_empty());

        // Second call misses the cache and reaches the provider again
        let filled = resolver.search_page("adele", 1, 10, &token()).await.unwrap();
        assert_eq!(filled.hits.len(), 1);
        assert_eq!(client.search_calls(), 2);

        // Third call is served from cache
        let cached = resolver.search_page("adele", 1, 10, &token()).await.unwrap();
        assert_eq!(cached, filled);
        assert_eq!(client.search_calls(), 2);
    }
}
