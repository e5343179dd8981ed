//! Catalog module
//!
//! Everything that talks to the upstream song catalog:
//! - the provider client and its tagged error taxonomy
//! - bounded retry policies
//! - the artist resolver
//! - the per-page song cache and the paginator/aggregator

pub mod client;
pub mod paginator;
pub mod resolver;
pub mod retry;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{BearerToken, CatalogClient, ClientError, GeniusClient, SearchHit, Song, SongPage};
pub use paginator::{dedup_titles, AggregateResult, CatalogAggregator, SongPageCache};
pub use resolver::{ArtistResolver, ArtistSearchPage};
pub use retry::RetryPolicy;
