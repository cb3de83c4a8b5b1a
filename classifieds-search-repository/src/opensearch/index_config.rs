//! Index configuration and mappings.
//!
//! This module defines the index names and the explicit settings and mappings
//! for the posts index and the search-history index. Nothing relies on dynamic
//! mapping.

use serde_json::{json, Value};

/// Default name of the canonical posts index.
pub const DEFAULT_POSTS_INDEX: &str = "posts";

/// Default name of the search-history index.
pub const DEFAULT_HISTORY_INDEX: &str = "search_history";

/// Default wildcard pattern used to discover stray post indices left behind by
/// older deployments (e.g. `posts_v1`).
pub const DEFAULT_STRAY_INDEX_PATTERN: &str = "posts*";

/// Name of the custom index-time analyzer used for autocomplete.
pub const AUTOCOMPLETE_ANALYZER: &str = "autocomplete";

/// Name of the edge n-gram token filter composed into the autocomplete analyzer.
pub const AUTOCOMPLETE_FILTER: &str = "autocomplete_filter";

/// Shortest prefix indexed by the autocomplete analyzer.
pub const EDGE_NGRAM_MIN_GRAM: u32 = 2;

/// Longest prefix indexed by the autocomplete analyzer.
pub const EDGE_NGRAM_MAX_GRAM: u32 = 20;

/// Names of the indices owned by the search service.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The canonical posts index.
    pub posts_index: String,
    /// The append-only search-history index.
    pub history_index: String,
    /// Wildcard pattern for discovering stray post indices.
    pub stray_index_pattern: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POSTS_INDEX, DEFAULT_HISTORY_INDEX)
    }
}

impl IndexConfig {
    /// Create a new index configuration with the default stray pattern.
    pub fn new(posts_index: impl Into<String>, history_index: impl Into<String>) -> Self {
        Self {
            posts_index: posts_index.into(),
            history_index: history_index.into(),
            stray_index_pattern: DEFAULT_STRAY_INDEX_PATTERN.to_string(),
        }
    }

    pub fn with_stray_index_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.stray_index_pattern = pattern.into();
        self
    }

    /// Whether `name` is one of the two canonical indices.
    pub fn is_canonical(&self, name: &str) -> bool {
        name == self.posts_index || name == self.history_index
    }

    /// Whether a listed index should be merged into the canonical posts index.
    ///
    /// System indices (leading `.`) and the canonical indices never are.
    pub fn is_stray(&self, name: &str) -> bool {
        !name.starts_with('.') && !self.is_canonical(name)
    }
}

/// Settings and mappings for the posts index.
///
/// The configuration includes:
/// - **autocomplete analyzer**: standard tokenizer, lowercase, edge n-grams 2..20.
///   Applied at index time on `title` and `categoryName`; searches use the
///   standard analyzer so a typed query is not itself split into n-grams.
/// - **completion field**: `suggest` feeds the prefix suggester
/// - **keyword fields**: ids, status, city and country for exact filtering
pub fn get_posts_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1,
            "analysis": {
                "filter": {
                    AUTOCOMPLETE_FILTER: {
                        "type": "edge_ngram",
                        "min_gram": EDGE_NGRAM_MIN_GRAM,
                        "max_gram": EDGE_NGRAM_MAX_GRAM
                    }
                },
                "analyzer": {
                    AUTOCOMPLETE_ANALYZER: {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", AUTOCOMPLETE_FILTER]
                    }
                }
            }
        },
        "mappings": {
            "dynamic": false,
            "properties": {
                "id": { "type": "keyword" },
                "title": {
                    "type": "text",
                    "analyzer": AUTOCOMPLETE_ANALYZER,
                    "search_analyzer": "standard",
                    "fields": {
                        "keyword": { "type": "keyword" }
                    }
                },
                "description": { "type": "text" },
                "price": { "type": "float" },
                "status": { "type": "keyword" },
                "viewCount": { "type": "long" },
                "categoryId": { "type": "keyword" },
                "categoryName": {
                    "type": "text",
                    "analyzer": AUTOCOMPLETE_ANALYZER,
                    "search_analyzer": "standard",
                    "fields": {
                        "keyword": { "type": "keyword" }
                    }
                },
                "categorySlug": { "type": "keyword" },
                "locationId": { "type": "keyword" },
                "city": { "type": "keyword" },
                "country": { "type": "keyword" },
                "zoneId": { "type": "keyword" },
                "zoneName": { "type": "keyword" },
                "images": { "type": "keyword" },
                "userId": { "type": "keyword" },
                "createdAt": { "type": "date" },
                "updatedAt": { "type": "date" },
                "suggest": { "type": "completion" }
            }
        }
    })
}

/// Settings and mappings for the search-history index.
pub fn get_history_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic": false,
            "properties": {
                "userId": { "type": "keyword" },
                "query": { "type": "text" },
                "categoryId": { "type": "keyword" },
                "locationId": { "type": "keyword" },
                "timestamp": { "type": "date" },
                "resultCount": { "type": "integer" }
            }
        }
    })
}
