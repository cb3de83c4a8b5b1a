use serde::Serialize;
use tracing::info;

use classifieds_search_shared::Post;

use crate::errors::SearchIndexError;
use crate::reconcile::{rebuild, RebuildOptions, RebuildReport};
use crate::service::SearchService;

/// Result of a full reindex: posts indexed and posts that failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReindexSummary {
    pub count: usize,
    pub errors: usize,
}

impl From<&RebuildReport> for ReindexSummary {
    fn from(report: &RebuildReport) -> Self {
        Self {
            count: report.indexed,
            errors: report.errors,
        }
    }
}

/// Drop the document index, recreate it with the current mapping and
/// bulk-load `posts`.
///
/// Use this when the mapping itself changed. The index is unavailable between
/// the delete and the end of the load.
pub async fn full_reindex(
    service: &SearchService,
    posts: &[Post],
) -> Result<RebuildReport, SearchIndexError> {
    let provider = service.provider();
    let index = service.indices().posts_index.as_str();

    if provider.index_exists(index).await? {
        provider.delete_index(index).await?;
        info!(index = %index, "Deleted existing index");
    }

    service.ensure_indices().await?;

    rebuild(service, posts, RebuildOptions::BULK_LOAD).await
}
