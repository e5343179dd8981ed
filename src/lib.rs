//! Setlist Backend Library
//!
//! Resolves human artist queries against a paginated upstream song
//! catalog: canonical artist lookup, full-catalog aggregation with
//! deduplication and TTL caching, and a per-session streaming mode.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod core;
pub mod stream;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::{Config, SetlistError};
pub use cache::{CacheStore, MemoryCache};
pub use catalog::{ArtistResolver, CatalogAggregator, CatalogClient};
pub use stream::{SessionBroadcaster, StreamJobRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
