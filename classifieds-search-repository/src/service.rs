//! Search service implementation.
//!
//! This module provides the main service for interacting with the search
//! indices. Application code uses it to search posts, fetch suggestions and
//! recommendations, record search history and keep the document index in step
//! with post mutations.
//!
//! # Failure policy
//!
//! Read-path calls propagate every engine error unchanged; the service adds no
//! retry or fallback. History recording is best-effort and never fails the
//! request it belongs to. Live indexing calls return `Result`, and the
//! `*_best_effort` variants log and drop the error for callers that must not
//! block on the index.

use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use classifieds_search_shared::{
    Post, RecommendationResponse, SearchDocument, SearchHistoryEntry, SearchParams,
    SearchResponse, Suggestion,
};

use crate::config::SearchServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::{get_history_index_settings, get_posts_index_settings, IndexConfig};
use crate::query;
use crate::recommend::{
    top_categories, HISTORY_SCAN_LIMIT, HISTORY_WINDOW_DAYS, RECOMMENDATION_REASON,
    TOP_CATEGORY_COUNT,
};
use crate::reconcile::{self, ReindexSummary};
use crate::types::IndexInfo;

/// Default number of history entries returned by [`SearchService::get_user_search_history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default number of hits returned by [`SearchService::get_personalized_recommendations`].
pub const DEFAULT_RECOMMENDATION_SIZE: usize = 20;

/// The main service for interacting with the search indices.
///
/// The service owns its provider and both index names; construct one at
/// startup and share it for the lifetime of the process.
///
/// # Example
///
/// ```no_run
/// use classifieds_search_repository::opensearch::{IndexConfig, OpenSearchProvider};
/// use classifieds_search_repository::SearchService;
/// use classifieds_search_shared::SearchParams;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Box::new(OpenSearchProvider::new("http://localhost:9200").await?);
/// let service = SearchService::new(provider, IndexConfig::default());
/// service.ensure_indices().await?;
///
/// let page = service.search(&SearchParams::text("iphone").with_size(2)).await?;
/// if let Some(cursor) = page.next_cursor() {
///     let next = service
///         .search(&SearchParams::text("iphone").with_size(2).after(cursor))
///         .await?;
///     println!("{} more", next.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SearchService {
    provider: Box<dyn SearchIndexProvider>,
    indices: IndexConfig,
    config: SearchServiceConfig,
}

impl SearchService {
    /// Create a new SearchService with default configuration.
    ///
    /// # Arguments
    ///
    /// * `provider` - A boxed implementation of `SearchIndexProvider` (e.g., `OpenSearchProvider`)
    /// * `indices` - Names of the document and history indices
    pub fn new(provider: Box<dyn SearchIndexProvider>, indices: IndexConfig) -> Self {
        Self {
            provider,
            indices,
            config: SearchServiceConfig::default(),
        }
    }

    /// Create a new SearchService with custom configuration.
    ///
    /// Use this when you need to customize bulk chunking or scroll batching.
    pub fn with_config(
        provider: Box<dyn SearchIndexProvider>,
        indices: IndexConfig,
        config: SearchServiceConfig,
    ) -> Self {
        Self {
            provider,
            indices,
            config,
        }
    }

    pub fn indices(&self) -> &IndexConfig {
        &self.indices
    }

    pub fn config(&self) -> &SearchServiceConfig {
        &self.config
    }

    pub(crate) fn provider(&self) -> &dyn SearchIndexProvider {
        self.provider.as_ref()
    }

    /// Check that the engine is reachable.
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        self.provider.ping().await
    }

    /// Create both indices with their explicit mappings if they don't exist yet.
    ///
    /// Safe to call on every start: an existing index is left untouched, its
    /// mapping included.
    #[instrument(skip(self))]
    pub async fn ensure_indices(&self) -> Result<(), SearchIndexError> {
        let wanted = [
            (&self.indices.posts_index, get_posts_index_settings()),
            (&self.indices.history_index, get_history_index_settings()),
        ];

        for (index, settings) in wanted {
            if self.provider.index_exists(index).await? {
                debug!(index = %index, "Index exists");
                continue;
            }
            self.provider.create_index(index, &settings).await?;
            info!(index = %index, "Created index");
        }

        Ok(())
    }

    /// Write the current state of a post to the document index.
    ///
    /// The document is replaced wholesale, so indexing the same id twice leaves
    /// one document holding the second call's values.
    #[instrument(skip(self, post), fields(post_id = %post.id))]
    pub async fn index_post(&self, post: &Post) -> Result<(), SearchIndexError> {
        let document = SearchDocument::from(post);
        let body = document_body(&document)?;

        self.provider
            .index_document(&self.indices.posts_index, Some(document.document_id()), &body)
            .await
    }

    /// Same as [`index_post`](Self::index_post); documents always hold the full post.
    pub async fn update_post(&self, post: &Post) -> Result<(), SearchIndexError> {
        self.index_post(post).await
    }

    /// Delete a post's document.
    ///
    /// # Returns
    ///
    /// * `Err(SearchIndexError::DocumentNotFound)` - If no document has this id
    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: &str) -> Result<(), SearchIndexError> {
        if post_id.is_empty() {
            return Err(SearchIndexError::validation("post_id is required"));
        }

        self.provider
            .delete_document(&self.indices.posts_index, post_id)
            .await
    }

    /// Index a post, logging instead of returning a failure.
    ///
    /// For post-mutation code paths where indexing must not fail the mutation;
    /// a later sync run restores anything missed here.
    pub async fn index_post_best_effort(&self, post: &Post) {
        if let Err(e) = self.index_post(post).await {
            warn!(post_id = %post.id, error = %e, "Failed to index post");
        }
    }

    /// Delete a post's document, logging instead of returning a failure.
    pub async fn delete_post_best_effort(&self, post_id: &str) {
        match self.delete_post(post_id).await {
            Ok(()) => {}
            Err(SearchIndexError::DocumentNotFound(_)) => {
                debug!(post_id = %post_id, "Post was not indexed");
            }
            Err(e) => warn!(post_id = %post_id, error = %e, "Failed to delete post document"),
        }
    }

    /// Fetch the indexed document for a post, if any.
    pub async fn get_document(
        &self,
        post_id: &str,
    ) -> Result<Option<SearchDocument>, SearchIndexError> {
        let Some(source) = self
            .provider
            .get_document(&self.indices.posts_index, post_id)
            .await?
        else {
            return Ok(None);
        };

        serde_json::from_value(source)
            .map(Some)
            .map_err(|e| SearchIndexError::parse(format!("Invalid document {}: {}", post_id, e)))
    }

    /// Search active posts.
    ///
    /// Results are newest first with the post id as tie-break. Pass the
    /// `sort` of the last hit back as `search_after` to fetch the next page.
    #[instrument(skip(self))]
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, SearchIndexError> {
        let body = query::build_search_body(params);
        let response = self
            .provider
            .search(&self.indices.posts_index, &body)
            .await?;

        query::parse_search_response(&response)
    }

    /// Search, then record the search for `user_id` if the requester is signed in.
    pub async fn search_and_record(
        &self,
        user_id: Option<&str>,
        params: &SearchParams,
    ) -> Result<SearchResponse, SearchIndexError> {
        let response = self.search(params).await?;
        self.record_search(user_id, params, response.total).await;
        Ok(response)
    }

    /// Up to five completions for a prefix.
    ///
    /// A blank prefix returns an empty list without calling the engine.
    #[instrument(skip(self))]
    pub async fn get_suggestions(&self, prefix: &str) -> Result<Vec<Suggestion>, SearchIndexError> {
        if prefix.trim().is_empty() {
            return Ok(Vec::new());
        }

        let body = query::build_suggest_body(prefix);
        let response = self
            .provider
            .search(&self.indices.posts_index, &body)
            .await?;

        Ok(query::parse_suggestions(&response))
    }

    /// Append a history entry for a served search.
    ///
    /// Anonymous searches (`user_id` is `None`) are never recorded. Failures are
    /// logged and dropped.
    #[instrument(skip(self, params))]
    pub async fn record_search(
        &self,
        user_id: Option<&str>,
        params: &SearchParams,
        result_count: u64,
    ) {
        let Some(user_id) = user_id else {
            return;
        };

        let entry = SearchHistoryEntry {
            user_id: user_id.to_string(),
            query: params.query.clone().unwrap_or_default(),
            category_id: params.category_id.clone(),
            location_id: params.location_id.clone(),
            timestamp: Utc::now(),
            result_count,
        };

        let body = match serde_json::to_value(&entry) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to serialize search history entry");
                return;
            }
        };

        if let Err(e) = self
            .provider
            .index_document(&self.indices.history_index, None, &body)
            .await
        {
            warn!(error = %e, "Failed to record search history");
        }
    }

    /// A user's most recent searches, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_HISTORY_LIMIT`].
    pub async fn get_user_search_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SearchHistoryEntry>, SearchIndexError> {
        let body = query::build_user_history_body(user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
        let response = self
            .provider
            .search(&self.indices.history_index, &body)
            .await?;

        query::parse_sources(&response)
    }

    /// Active posts from the categories a user searched most in the last 30 days.
    ///
    /// A user without recent history gets an empty response. A user whose
    /// recent searches never named a category gets the generic newest-first
    /// listing, not flagged as personalized.
    #[instrument(skip(self))]
    pub async fn get_personalized_recommendations(
        &self,
        user_id: &str,
        size: Option<usize>,
    ) -> Result<RecommendationResponse, SearchIndexError> {
        let size = size.unwrap_or(DEFAULT_RECOMMENDATION_SIZE);
        let since = Utc::now() - Duration::days(HISTORY_WINDOW_DAYS);

        let history_body = query::build_history_window_body(user_id, since, HISTORY_SCAN_LIMIT);
        let history_response = self
            .provider
            .search(&self.indices.history_index, &history_body)
            .await?;
        let entries: Vec<SearchHistoryEntry> = query::parse_sources(&history_response)?;

        if entries.is_empty() {
            debug!(user_id = %user_id, "No recent search history");
            return Ok(RecommendationResponse::empty());
        }

        let categories = top_categories(&entries, TOP_CATEGORY_COUNT);
        if categories.is_empty() {
            debug!(user_id = %user_id, "No categories in history, using popular posts");
            let popular = self.search(&SearchParams::default().with_size(size)).await?;
            return Ok(RecommendationResponse::from(popular));
        }

        let body = query::build_category_affinity_body(&categories, size);
        let response = self
            .provider
            .search(&self.indices.posts_index, &body)
            .await?;
        let SearchResponse { hits, total } = query::parse_search_response(&response)?;

        Ok(RecommendationResponse {
            hits: hits
                .into_iter()
                .map(|hit| hit.recommended(RECOMMENDATION_REASON))
                .collect(),
            total,
            top_categories: categories,
        })
    }

    /// Drop and recreate the document index, then bulk-index `posts` into it.
    pub async fn reindex_all(&self, posts: &[Post]) -> Result<ReindexSummary, SearchIndexError> {
        let report = reconcile::full_reindex(self, posts).await?;
        Ok(ReindexSummary::from(&report))
    }

    /// Every index matching the configured stray-index pattern, canonical
    /// indices included.
    pub async fn list_indices(&self) -> Result<Vec<IndexInfo>, SearchIndexError> {
        self.provider
            .list_indices(&self.indices.stray_index_pattern)
            .await
    }

    /// Document counts of the document and history indices.
    ///
    /// An index that doesn't exist is reported with zero documents.
    pub async fn index_stats(&self) -> Result<Vec<IndexInfo>, SearchIndexError> {
        let mut stats = Vec::with_capacity(2);

        for index in [&self.indices.posts_index, &self.indices.history_index] {
            let docs_count = if self.provider.index_exists(index).await? {
                self.provider.count(index).await?
            } else {
                0
            };
            stats.push(IndexInfo {
                name: index.clone(),
                docs_count,
            });
        }

        Ok(stats)
    }
}

/// Serialize a document into the body the engine stores.
pub(crate) fn document_body(document: &SearchDocument) -> Result<Value, SearchIndexError> {
    serde_json::to_value(document).map_err(|e| {
        SearchIndexError::serialization(format!("Document {}: {}", document.document_id(), e))
    })
}
