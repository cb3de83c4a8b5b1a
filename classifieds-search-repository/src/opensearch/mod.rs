//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch (or a protocol-compatible Elasticsearch) as the backend,
//! together with the index settings and mappings it creates.

mod index_config;
mod provider;

pub use index_config::{
    get_history_index_settings, get_posts_index_settings, IndexConfig, AUTOCOMPLETE_ANALYZER,
    DEFAULT_HISTORY_INDEX, DEFAULT_POSTS_INDEX, DEFAULT_STRAY_INDEX_PATTERN,
};
pub use provider::OpenSearchProvider;
