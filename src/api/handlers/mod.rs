//! API request handlers

pub mod artists;
pub mod streams;
pub mod system;

pub use artists::{get_artist_songs, get_artist_songs_page, search_artists};
pub use streams::{start_stream, subscribe_stream};
pub use system::health_check;

use crate::catalog::{ArtistResolver, CatalogAggregator, SongPageCache};
use crate::stream::{SessionBroadcaster, StreamJobRunner};
use std::sync::Arc;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ArtistResolver>,
    pub pages: Arc<SongPageCache>,
    pub aggregator: Arc<CatalogAggregator>,
    pub jobs: Arc<StreamJobRunner>,
    pub broadcaster: Arc<SessionBroadcaster>,
}
