//! Song page cache and catalog paginator/aggregator
//!
//! `SongPageCache` wraps the client's songs endpoint with one cache entry
//! per (artist id, page, per_page). Every successful fetch is cached
//! unconditionally, empty pages included — the asymmetry versus the
//! resolver's success-only policy is intentional: repeated empty-tail
//! pages are cheap to re-serve.
//!
//! `CatalogAggregator` walks all pages through the continuation cursor
//! and deduplicates titles once over the full collected sequence. The
//! walk is bounded: a repeated cursor or an exceeded page cap is a fatal
//! upstream error, never an infinite loop.

use crate::cache::{keys, CacheStore};
use crate::catalog::client::{BearerToken, CatalogClient, SongPage};
use crate::catalog::resolver::{clamp_page, clamp_per_page};
use crate::core::error::{Result, SetlistError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Whole-artist aggregation outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateResult {
    pub artist_id: String,
    pub titles: Vec<String>,
}

/// Per-page cache wrapper around the songs endpoint
pub struct SongPageCache {
    client: Arc<dyn CatalogClient>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl SongPageCache {
    pub fn new(client: Arc<dyn CatalogClient>, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { client, cache, ttl }
    }

    fn validate_artist_id(artist_id: &str) -> Result<()> {
        if artist_id.is_empty() || !artist_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(SetlistError::ValidationError(
                "missing or invalid artist id".to_string(),
            ));
        }
        Ok(())
    }

    /// Fetch one page of an artist's songs, through the per-page cache
    pub async fn fetch_page(
        &self,
        artist_id: &str,
        page: u32,
        per_page: u32,
        token: &BearerToken,
    ) -> Result<SongPage> {
        Self::validate_artist_id(artist_id)?;
        let page = clamp_page(page);
        let per_page = clamp_per_page(per_page);
        let cache_key = keys::song_page(artist_id, page, per_page);

        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(song_page) = serde_json::from_str::<SongPage>(&cached) {
                tracing::debug!(artist_id, page, "song page cache hit");
                return Ok(song_page);
            }
        }

        let song_page = self
            .client
            .fetch_artist_songs(artist_id, page, per_page, token)
            .await
            .map_err(SetlistError::from)?;

        // Cache every successful page, empty ones included
        self.cache
            .set(&cache_key, serde_json::to_string(&song_page)?, self.ttl)
            .await;

        Ok(song_page)
    }
}

/// Paginator/aggregator walking an artist's full catalog
pub struct CatalogAggregator {
    pages: Arc<SongPageCache>,
    cache: Arc<dyn CacheStore>,
    page_size: u32,
    max_pages: u32,
    ttl: Duration,
}

impl CatalogAggregator {
    pub fn new(
        pages: Arc<SongPageCache>,
        cache: Arc<dyn CacheStore>,
        page_size: u32,
        max_pages: u32,
        ttl: Duration,
    ) -> Self {
        Self {
            pages,
            cache,
            page_size,
            max_pages,
            ttl,
        }
    }

    /// Aggregate an artist's complete deduplicated title list
    ///
    /// Consults the aggregate cache first; on miss walks every page and
    /// refreshes the aggregate entry wholesale. A page-fetch error aborts
    /// the aggregation and discards partial results.
    pub async fn aggregate_all(
        &self,
        artist_id: &str,
        token: &BearerToken,
    ) -> Result<AggregateResult> {
        let cache_key = keys::artist_titles(artist_id);

        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(titles) = serde_json::from_str::<Vec<String>>(&cached) {
                tracing::debug!(artist_id, "aggregate cache hit");
                return Ok(AggregateResult {
                    artist_id: artist_id.to_string(),
                    titles,
                });
            }
        }

        let (all_titles, _last_page) = self.walk(artist_id, token, |_, _| {}).await?;
        let titles = dedup_titles(all_titles);

        self.cache
            .set(&cache_key, serde_json::to_string(&titles)?, self.ttl)
            .await;

        tracing::info!(artist_id, count = titles.len(), "catalog aggregated");
        Ok(AggregateResult {
            artist_id: artist_id.to_string(),
            titles,
        })
    }

    /// Walk every page from page 1, invoking `on_page` with each page's
    /// raw (not yet deduplicated) titles as it arrives
    ///
    /// Pages are fetched strictly sequentially; ordering of `on_page`
    /// invocations is the fetch order. Returns the full raw title
    /// sequence and the last page number walked.
    pub async fn walk<F>(
        &self,
        artist_id: &str,
        token: &BearerToken,
        mut on_page: F,
    ) -> Result<(Vec<String>, u32)>
    where
        F: FnMut(&[String], u32),
    {
        let mut page = 1u32;
        let mut visited: HashSet<u32> = HashSet::new();
        let mut all_titles = Vec::new();

        loop {
            if !visited.insert(page) {
                return Err(SetlistError::UpstreamError(format!(
                    "pagination cursor loop detected at page {}",
                    page
                )));
            }
            if visited.len() > self.max_pages as usize {
                return Err(SetlistError::UpstreamError(format!(
                    "page walk exceeded the {} page cap",
                    self.max_pages
                )));
            }

            let song_page = self
                .pages
                .fetch_page(artist_id, page, self.page_size, token)
                .await?;

            let titles: Vec<String> = song_page
                .songs
                .into_iter()
                .map(|song| song.title)
                .collect();
            on_page(&titles, page);
            all_titles.extend(titles);

            match song_page.next_page {
                Some(next) => page = clamp_page(next),
                None => break,
            }
        }

        Ok((all_titles, page))
    }
}

/// Deduplicate titles by exact string equality, preserving first-seen order
pub fn dedup_titles(titles: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .filter(|title| seen.insert(title.clone()))
        .collect()
}
