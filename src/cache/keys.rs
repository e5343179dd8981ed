//! Deterministic cache-key builders
//!
//! Keys are pure functions of (namespace, normalized identifier, paging).
//! No randomness, no versioning. Each namespace is read and written by
//! exactly one component.

/// Resolver namespace: normalized query -> artist id
pub fn artist_id(normalized_query: &str) -> String {
    format!("artist_id:{}", normalized_query)
}

/// Artist search namespace: one entry per (query, page, per_page)
pub fn artist_search(normalized_query: &str, page: u32, per_page: u32) -> String {
    format!(
        "artist_search:{}:page={}:per_page={}",
        normalized_query, page, per_page
    )
}

/// Per-page song cache namespace: one entry per (artist id, page, per_page)
pub fn song_page(artist_id: &str, page: u32, per_page: u32) -> String {
    format!(
        "artist_songs:{}:page={}:per_page={}",
        artist_id, page, per_page
    )
}

/// Aggregate namespace: whole-artist deduplicated title list, keyed by artist id alone
pub fn artist_titles(artist_id: &str) -> String {
    format!("artist_songs_titles:{}", artist_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(artist_id("adele"), "artist_id:adele");
        assert_eq!(
            artist_search("adele", 1, 10),
            "artist_search:adele:page=1:per_page=10"
        );
        assert_eq!(
            song_page("1234", 2, 50),
            "artist_songs:1234:page=2:per_page=50"
        );
        assert_eq!(artist_titles("1234"), "artist_songs_titles:1234");
    }

    #[test]
    fn test_keys_are_deterministic() {
        assert_eq!(song_page("42", 1, 50), song_page("42", 1, 50));
        assert_ne!(song_page("42", 1, 50), song_page("42", 2, 50));
        assert_ne!(song_page("42", 1, 50), song_page("42", 1, 10));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        // Same artist id, different namespaces
        assert_ne!(artist_titles("1234"), song_page("1234", 1, 50));
        assert_ne!(artist_id("1234"), artist_titles("1234"));
    }
}
