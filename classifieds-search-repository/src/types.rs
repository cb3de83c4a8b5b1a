//! Request and response types for search index operations.

use serde::Serialize;
use serde_json::Value;

use crate::errors::SearchIndexError;

/// A document to write with an explicit id, used by bulk operations.
#[derive(Debug, Clone)]
pub struct IndexDocumentRequest {
    /// The document id. For posts this is always the post id.
    pub document_id: String,
    /// The full document body. Writes replace any existing document wholesale.
    pub body: Value,
}

impl IndexDocumentRequest {
    pub fn new(document_id: impl Into<String>, body: Value) -> Self {
        Self {
            document_id: document_id.into(),
            body,
        }
    }
}

/// A raw hit returned by a search or scroll request.
#[derive(Debug, Clone)]
pub struct RawHit {
    pub document_id: String,
    pub source: Value,
}

/// One page of a scroll sequence.
///
/// The sequence is exhausted when a page comes back with no hits.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    /// Engine-side handle for fetching the next page.
    pub scroll_id: Option<String>,
    pub hits: Vec<RawHit>,
}

/// Name and document count of an index, as listed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub name: String,
    pub docs_count: u64,
}

/// Result of a batch operation for a single document.
///
/// This struct represents the outcome of a single write within a bulk request.
/// It indicates whether the write succeeded and includes error details if it failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document id.
    pub document_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    pub fn succeeded(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(document_id: impl Into<String>, error: SearchIndexError) -> Self {
        Self {
            document_id: document_id.into(),
            success: false,
            error: Some(error),
        }
    }
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// This struct provides a complete overview of a bulk operation, including the total
/// number of items processed, how many succeeded and failed, and detailed results for
/// each individual item. This allows callers to handle partial failures gracefully.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-document results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }

    /// Iterate over the failed results.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
