use std::pin::pin;

use futures::TryStreamExt;
use serde::Serialize;
use tracing::{info, warn};

use classifieds_search_shared::Post;

use crate::errors::SearchIndexError;
use crate::reconcile::rebuild::rejected_chunk;
use crate::reconcile::{rebuild, scroll_batches, RebuildOptions, RebuildReport};
use crate::service::SearchService;
use crate::types::{IndexDocumentRequest, IndexInfo};

/// What was copied out of one stray index before it was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedIndex {
    pub name: String,
    pub copied: usize,
    pub errors: usize,
}

/// Outcome of a [`consolidate`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateReport {
    pub merged: Vec<MergedIndex>,
    pub rebuild: RebuildReport,
    /// Document counts of the canonical indices after the rebuild.
    pub final_counts: Vec<IndexInfo>,
}

/// Merge every stray index into the canonical document index, delete the
/// strays, then rebuild the canonical index from `posts`.
///
/// Stray indices are those matching the configured pattern other than the two
/// canonical ones and hidden system indices.
pub async fn consolidate(
    service: &SearchService,
    posts: &[Post],
) -> Result<ConsolidateReport, SearchIndexError> {
    service.ping().await?;
    service.ensure_indices().await?;

    let indices = service.indices();
    let strays: Vec<IndexInfo> = service
        .list_indices()
        .await?
        .into_iter()
        .filter(|info| indices.is_stray(&info.name))
        .collect();

    info!(count = strays.len(), "Found stray indices");

    let mut merged = Vec::with_capacity(strays.len());
    for stray in strays {
        info!(index = %stray.name, documents = stray.docs_count, "Merging stray index");
        merged.push(merge_stray(service, &stray.name).await?);
    }

    let rebuild = rebuild(service, posts, RebuildOptions::CLEAR_AND_INDEX).await?;
    let final_counts = service.index_stats().await?;

    Ok(ConsolidateReport {
        merged,
        rebuild,
        final_counts,
    })
}

/// Copy every document of `stray` into the canonical index, then delete `stray`.
async fn merge_stray(service: &SearchService, stray: &str) -> Result<MergedIndex, SearchIndexError> {
    let provider = service.provider();
    let target = service.indices().posts_index.as_str();
    let config = service.config();

    let mut result = MergedIndex {
        name: stray.to_string(),
        copied: 0,
        errors: 0,
    };

    let mut batches = pin!(scroll_batches(
        provider,
        stray,
        config.scroll_batch_size,
        &config.scroll_keep_alive,
    ));

    while let Some(batch) = batches.try_next().await? {
        let requests: Vec<IndexDocumentRequest> = batch
            .into_iter()
            .map(|hit| IndexDocumentRequest::new(hit.document_id, hit.source))
            .collect();

        let summary = match provider.bulk_index(target, &requests).await {
            Ok(summary) => summary,
            Err(e) => {
                let ids: Vec<&str> = requests.iter().map(|r| r.document_id.as_str()).collect();
                warn!(index = %stray, doc_ids = ?ids, error = %e, "Bulk copy failed");
                rejected_chunk(&requests, &e)
            }
        };
        for failure in summary.failures() {
            warn!(
                index = %stray,
                doc_id = %failure.document_id,
                error = ?failure.error,
                "Failed to copy document"
            );
        }

        result.copied += summary.succeeded;
        result.errors += summary.failed;
    }

    provider.refresh(target).await?;
    provider.delete_index(stray).await?;

    info!(
        index = %stray,
        copied = result.copied,
        errors = result.errors,
        "Merged and deleted stray index"
    );
    Ok(result)
}
