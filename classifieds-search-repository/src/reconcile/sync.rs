use serde::Serialize;
use tracing::{info, warn};

use classifieds_search_shared::Post;

use crate::errors::SearchIndexError;
use crate::reconcile::{rebuild, RebuildOptions, RebuildReport};
use crate::service::SearchService;

/// Outcome of a [`sync`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub rebuild: RebuildReport,
    /// Documents in the index after the refresh.
    pub final_count: u64,
}

impl SyncReport {
    /// Whether the index holds exactly one document per source post.
    ///
    /// Advisory: a mismatch is reported, never treated as a failure.
    pub fn counts_match(&self) -> bool {
        self.final_count == self.rebuild.source_count as u64
    }
}

/// Replace the contents of the document index with `posts`, keeping the index
/// and its mapping.
///
/// Individual post failures are counted and skipped. Running it twice without
/// source changes gives the same final count.
pub async fn sync(service: &SearchService, posts: &[Post]) -> Result<SyncReport, SearchIndexError> {
    service.ping().await?;
    service.ensure_indices().await?;

    let rebuild = rebuild(service, posts, RebuildOptions::CLEAR_AND_INDEX).await?;
    let final_count = service
        .provider()
        .count(&service.indices().posts_index)
        .await?;

    let report = SyncReport {
        rebuild,
        final_count,
    };

    if report.counts_match() {
        info!(count = final_count, "Index matches source");
    } else {
        warn!(
            indexed = final_count,
            source = report.rebuild.source_count,
            "Index count differs from source"
        );
    }

    Ok(report)
}
