//! Background streaming job
//!
//! `StreamJobRunner::start` validates the query, opens a session topic,
//! and spawns the actual work so the caller gets its session id back
//! immediately. The spawned job resolves the artist under the streaming
//! retry policy, walks the catalog page by page publishing one event per
//! page, then publishes a terminal `done` event and refreshes the
//! aggregate title cache. A failure at any stage is published to the
//! topic as a terminal event with `error` set, never swallowed.

use crate::cache::{keys, CacheStore};
use crate::catalog::{dedup_titles, ArtistResolver, BearerToken, CatalogAggregator};
use crate::core::error::Result;
use crate::stream::broadcaster::{SessionBroadcaster, SessionId, StreamEvent};
use std::sync::Arc;
use std::time::Duration;

pub struct StreamJobRunner {
    resolver: Arc<ArtistResolver>,
    aggregator: Arc<CatalogAggregator>,
    cache: Arc<dyn CacheStore>,
    broadcaster: Arc<SessionBroadcaster>,
    ttl: Duration,
}

impl StreamJobRunner {
    pub fn new(
        resolver: Arc<ArtistResolver>,
        aggregator: Arc<CatalogAggregator>,
        cache: Arc<dyn CacheStore>,
        broadcaster: Arc<SessionBroadcaster>,
        ttl: Duration,
    ) -> Self {
        Self {
            resolver,
            aggregator,
            cache,
            broadcaster,
            ttl,
        }
    }

    /// Start a streaming job and return its session id
    ///
    /// Validation failures are reported to the caller directly; anything
    /// after the spawn is reported on the session topic instead.
    pub async fn start(self: Arc<Self>, query: &str, token: &BearerToken) -> Result<SessionId> {
        let normalized = ArtistResolver::normalize(query)?;
        let session_id = self.broadcaster.open_session().await;

        let runner = self;
        let token = token.clone();
        tokio::spawn(async move {
            runner.run(session_id, normalized, token).await;
        });

        Ok(session_id)
    }

    async fn run(&self, session_id: SessionId, query: String, token: BearerToken) {
        let artist_id = match self.resolver.resolve(&query, &token).await {
            Ok(artist_id) => artist_id,
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "stream job failed to resolve artist");
                self.broadcaster
                    .publish(&session_id, StreamEvent::failed(0, err.to_string()))
                    .await;
                self.broadcaster.close_session(&session_id).await;
                return;
            }
        };

        // Publishing happens from inside the sequential walk, so hold the
        // raw sender rather than going through the registry per page.
        let sender = match self.broadcaster.sender(&session_id).await {
            Some(sender) => sender,
            None => return,
        };

        let walked = self
            .aggregator
            .walk(&artist_id, &token, |titles, page| {
                let _ = sender.send(StreamEvent::page(titles.to_vec(), page));
            })
            .await;

        match walked {
            Ok((all_titles, last_page)) => {
                self.broadcaster
                    .publish(&session_id, StreamEvent::done(last_page))
                    .await;

                let titles = dedup_titles(all_titles);
                match serde_json::to_string(&titles) {
                    Ok(json) => {
                        self.cache
                            .set(&keys::artist_titles(&artist_id), json, self.ttl)
                            .await;
                    }
                    Err(err) => {
                        tracing::error!(artist_id = %artist_id, error = %err, "failed to serialize aggregate titles");
                    }
                }
                tracing::info!(
                    artist_id = %artist_id,
                    pages = last_page,
                    songs = titles.len(),
                    "stream job completed"
                );
            }
            Err(err) => {
                tracing::warn!(artist_id = %artist_id, error = %err, "stream job failed mid-walk");
                self.broadcaster
                    .publish(&session_id, StreamEvent::failed(0, err.to_string()))
                    .await;
            }
        }

        self.broadcaster.close_session(&session_id).await;
    }
}
