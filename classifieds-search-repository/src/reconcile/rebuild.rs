use serde::Serialize;
use tracing::{debug, info, warn};

use classifieds_search_shared::{Post, SearchDocument};

use crate::errors::SearchIndexError;
use crate::query::match_all_query;
use crate::service::{document_body, SearchService};
use crate::types::{BatchOperationResult, BatchOperationSummary, IndexDocumentRequest};

/// How [`rebuild`] writes the canonical document index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildOptions {
    /// Delete every document in the index before writing.
    pub clear_first: bool,
    /// Write post by post. When unset, posts are written in bulk chunks and a
    /// rejected chunk counts every post in it as failed. Either way a failed
    /// write is counted and the run moves on.
    pub error_tolerant: bool,
}

impl RebuildOptions {
    /// Bulk-load into an index that was just recreated.
    pub const BULK_LOAD: Self = Self {
        clear_first: false,
        error_tolerant: false,
    };

    /// Clear the index contents, then write post by post.
    pub const CLEAR_AND_INDEX: Self = Self {
        clear_first: true,
        error_tolerant: true,
    };
}

/// Outcome of a [`rebuild`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildReport {
    /// Number of posts read from the relational store.
    pub source_count: usize,
    /// Documents in the index before clearing. Zero when not clearing.
    pub existing_count: u64,
    /// Documents removed by the clearing step.
    pub cleared: u64,
    /// Posts written successfully.
    pub indexed: usize,
    /// Posts that failed to write.
    pub errors: usize,
}

/// Rebuild the canonical document index from `posts`.
///
/// Writes follow the order of `posts`, one request at a time. The index is
/// refreshed once at the end so the written documents are searchable when
/// this returns.
pub async fn rebuild(
    service: &SearchService,
    posts: &[Post],
    options: RebuildOptions,
) -> Result<RebuildReport, SearchIndexError> {
    let provider = service.provider();
    let index = service.indices().posts_index.as_str();

    let mut report = RebuildReport {
        source_count: posts.len(),
        ..Default::default()
    };

    if options.clear_first {
        report.existing_count = provider.count(index).await?;
        info!(index = %index, documents = report.existing_count, "Existing documents");

        if report.existing_count > 0 {
            report.cleared = provider.delete_by_query(index, &match_all_query()).await?;
            info!(index = %index, deleted = report.cleared, "Cleared index");
        }
    }

    if options.error_tolerant {
        for post in posts {
            match service.index_post(post).await {
                Ok(()) => report.indexed += 1,
                Err(e) => {
                    report.errors += 1;
                    warn!(post_id = %post.id, error = %e, "Failed to index post");
                }
            }
        }
    } else {
        let summary = bulk_load(service, posts).await;
        report.indexed = summary.succeeded;
        report.errors = summary.failed;
    }

    provider.refresh(index).await?;

    info!(
        index = %index,
        source = report.source_count,
        indexed = report.indexed,
        errors = report.errors,
        "Rebuild finished"
    );
    Ok(report)
}

/// Bulk-index posts in chunks of the configured size.
async fn bulk_load(service: &SearchService, posts: &[Post]) -> BatchOperationSummary {
    let provider = service.provider();
    let index = service.indices().posts_index.as_str();
    let mut total = BatchOperationSummary::default();

    let chunk_size = service.config().bulk_chunk_size.max(1);

    for (chunk_number, chunk) in posts.chunks(chunk_size).enumerate() {
        let mut requests = Vec::with_capacity(chunk.len());
        let mut unserializable = Vec::new();

        for post in chunk {
            let document = SearchDocument::from(post);
            match document_body(&document) {
                Ok(body) => requests.push(IndexDocumentRequest::new(&post.id, body)),
                Err(e) => unserializable.push(BatchOperationResult::failed(&post.id, e)),
            }
        }

        let mut summary = match provider.bulk_index(index, &requests).await {
            Ok(summary) => summary,
            Err(e) => {
                let ids: Vec<&str> = requests.iter().map(|r| r.document_id.as_str()).collect();
                warn!(chunk = chunk_number, post_ids = ?ids, error = %e, "Bulk request failed");
                rejected_chunk(&requests, &e)
            }
        };
        summary.merge(BatchOperationSummary::from_results(unserializable));

        for failure in summary.failures() {
            warn!(
                post_id = %failure.document_id,
                error = ?failure.error,
                "Failed to index post"
            );
        }
        debug!(
            chunk = chunk_number,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk chunk written"
        );

        total.merge(summary);
    }

    total
}

/// Every request of a chunk the engine rejected as a whole, as failed results.
pub(crate) fn rejected_chunk(
    requests: &[IndexDocumentRequest],
    error: &SearchIndexError,
) -> BatchOperationSummary {
    BatchOperationSummary::from_results(
        requests
            .iter()
            .map(|request| BatchOperationResult::failed(request.document_id.as_str(), error.clone()))
            .collect(),
    )
}
