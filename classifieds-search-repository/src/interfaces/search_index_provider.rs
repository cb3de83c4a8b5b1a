//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! or an in-memory double in tests).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationSummary, IndexDocumentRequest, IndexInfo, ScrollPage};

/// Abstracts the underlying search engine (OpenSearch, Elasticsearch, etc.).
///
/// Every operation names the index it targets, so one provider serves both the
/// posts index and the search-history index. Implementations are injected into
/// `SearchService` and the reconcile jobs to enable dependency injection and
/// easy testing with mock implementations.
///
/// Request bodies are engine query DSL built by [`crate::query`]; search
/// responses are returned as raw JSON and parsed there as well.
///
/// # Writes
///
/// There is no partial update. `index_document` and `bulk_index` replace the
/// stored document wholesale, which makes every write an idempotent
/// upsert-by-id.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check that the engine is reachable.
    async fn ping(&self) -> Result<(), SearchIndexError>;

    /// Whether the named index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create an index with the given settings and mappings.
    ///
    /// Creating an index that already exists is not an error.
    async fn create_index(&self, index: &str, settings: &Value) -> Result<(), SearchIndexError>;

    /// Drop an index and all its documents.
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// List indices whose names match a wildcard pattern (e.g. `posts*`).
    async fn list_indices(&self, pattern: &str) -> Result<Vec<IndexInfo>, SearchIndexError>;

    /// Write one document, replacing any document with the same id.
    ///
    /// With `document_id` set to `None` the engine assigns an id.
    async fn index_document(
        &self,
        index: &str,
        document_id: Option<&str>,
        body: &Value,
    ) -> Result<(), SearchIndexError>;

    /// Fetch the stored source of a document, if it exists.
    async fn get_document(
        &self,
        index: &str,
        document_id: &str,
    ) -> Result<Option<Value>, SearchIndexError>;

    /// Delete a document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was deleted
    /// * `Err(SearchIndexError::DocumentNotFound)` - If no document has this id
    /// * `Err(SearchIndexError)` - If the deletion fails
    async fn delete_document(&self, index: &str, document_id: &str)
        -> Result<(), SearchIndexError>;

    /// Write many documents in one bulk request.
    ///
    /// Item-level failures are reported in the summary; only a failure of the
    /// request as a whole is returned as an error.
    async fn bulk_index(
        &self,
        index: &str,
        documents: &[IndexDocumentRequest],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Execute a search request body and return the raw response.
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchIndexError>;

    /// Number of documents in the index.
    async fn count(&self, index: &str) -> Result<u64, SearchIndexError>;

    /// Delete every document matching `query`, keeping the index itself.
    ///
    /// Returns the number of documents deleted.
    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<u64, SearchIndexError>;

    /// Make all previous writes visible to searches and counts.
    async fn refresh(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Start a scroll over `index` and return its first page.
    async fn open_scroll(
        &self,
        index: &str,
        body: &Value,
        keep_alive: &str,
    ) -> Result<ScrollPage, SearchIndexError>;

    /// Fetch the next page of an open scroll.
    async fn continue_scroll(
        &self,
        scroll_id: &str,
        keep_alive: &str,
    ) -> Result<ScrollPage, SearchIndexError>;

    /// Release the engine-side scroll context.
    async fn clear_scroll(&self, scroll_id: &str) -> Result<(), SearchIndexError>;
}
