//! Catalog client test double shared by the resolver, paginator, and
//! streaming job tests.

use crate::catalog::client::{
    BearerToken, CatalogClient, ClientError, PrimaryArtist, SearchHit, Song, SongPage,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted failure modes for the mock
#[derive(Debug, Clone)]
pub enum MockFailure {
    Transient,
    Provider(u16),
}

impl From<MockFailure> for ClientError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Transient => ClientError::Transient("mock timeout".to_string()),
            MockFailure::Provider(status) => ClientError::Provider {
                status,
                message: "mock provider failure".to_string(),
            },
        }
    }
}

/// Scripted catalog client
///
/// Search responses are consumed in order; song pages are keyed by page
/// number. Unscripted calls fail loudly so tests catch unexpected traffic.
#[derive(Default)]
pub struct MockCatalogClient {
    search_script: Mutex<VecDeque<Result<Vec<SearchHit>, MockFailure>>>,
    pages: Mutex<HashMap<u32, Result<SongPage, MockFailure>>>,
    pub search_calls: AtomicU32,
    pub songs_calls: AtomicU32,
    response_delay: Option<Duration>,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, for tests exercising concurrent callers
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = Some(delay);
        self
    }

    pub fn push_search_hits(&self, hits: Vec<SearchHit>) {
        self.search_script.lock().unwrap().push_back(Ok(hits));
    }

    pub fn push_search_failure(&self, failure: MockFailure) {
        self.search_script.lock().unwrap().push_back(Err(failure));
    }

    pub fn set_page(&self, page: u32, titles: &[&str], next_page: Option<u32>) {
        let songs = titles
            .iter()
            .enumerate()
            .map(|(i, title)| Song {
                id: (page as u64) * 1000 + i as u64,
                title: title.to_string(),
            })
            .collect();
        self.pages
            .lock()
            .unwrap()
            .insert(page, Ok(SongPage { songs, next_page }));
    }

    pub fn set_page_failure(&self, page: u32, failure: MockFailure) {
        self.pages.lock().unwrap().insert(page, Err(failure));
    }

    pub fn search_calls(&self) -> u32 {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn songs_calls(&self) -> u32 {
        self.songs_calls.load(Ordering::SeqCst)
    }
}

/// Build a search hit whose primary artist is set
pub fn artist_hit(artist_id: u64, artist_name: &str) -> SearchHit {
    SearchHit {
        id: artist_id * 10,
        title: format!("top song by {}", artist_name),
        primary_artist: Some(PrimaryArtist {
            id: artist_id,
            name: artist_name.to_string(),
        }),
    }
}

/// Build a search hit with no primary artist attached
pub fn orphan_hit() -> SearchHit {
    SearchHit {
        id: 1,
        title: "orphan".to_string(),
        primary_artist: None,
    }
}

pub fn token() -> BearerToken {
    BearerToken::new("test-token").unwrap()
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn search_artists(
        &self,
        _query: &str,
        _page: u32,
        _per_page: u32,
        _token: &BearerToken,
    ) -> Result<Vec<SearchHit>, ClientError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.response_delay {
            tokio::time::sleep(delay).await;
        }
        match self.search_script.lock().unwrap().pop_front() {
            Some(Ok(hits)) => Ok(hits),
            Some(Err(failure)) => Err(failure.into()),
            None => Err(ClientError::Provider {
                status: 599,
                message: "unscripted search call".to_string(),
            }),
        }
    }

    async fn fetch_artist_songs(
        &self,
        _artist_id: &str,
        page: u32,
        _per_page: u32,
        _token: &BearerToken,
    ) -> Result<SongPage, ClientError> {
        self.songs_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.response_delay {
            tokio::time::sleep(delay).await;
        }
        match self.pages.lock().unwrap().get(&page) {
            Some(Ok(song_page)) => Ok(song_page.clone()),
            Some(Err(failure)) => Err(failure.clone().into()),
            None => Err(ClientError::Provider {
                status: 599,
                message: format!("unscripted songs call for page {}", page),
            }),
        }
    }
}
