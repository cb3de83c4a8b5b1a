//! Read-only diagnostics: nothing here creates, writes or deletes.

use classifieds_search_repository::IndexInfo;
use classifieds_search_shared::{Post, SearchDocument};

use crate::config::Dependencies;
use crate::errors::ReconcileError;
use crate::report;

/// What the database and the index hold for one post.
#[derive(Debug, Clone)]
pub struct PostCheck {
    pub post_id: String,
    pub source: Option<Post>,
    pub indexed: Option<SearchDocument>,
}

impl PostCheck {
    /// Whether the indexed title and status match the database row.
    ///
    /// `None` unless the post is present on both sides.
    pub fn fields_match(&self) -> Option<bool> {
        let (source, indexed) = (self.source.as_ref()?, self.indexed.as_ref()?);
        Some(source.title == indexed.title && source.status.unwrap_or_default() == indexed.status)
    }
}

/// Everything the checker prints.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub elasticsearch_url: String,
    /// The posts and history indices, in that order.
    pub canonical: Vec<IndexInfo>,
    /// Every index matching the stray-index pattern.
    pub matching: Vec<IndexInfo>,
    pub source_count: u64,
    pub post: Option<PostCheck>,
}

impl CheckReport {
    /// Documents in the posts index.
    pub fn indexed_count(&self) -> u64 {
        self.canonical.first().map_or(0, |info| info.docs_count)
    }

    pub fn counts_match(&self) -> bool {
        self.indexed_count() == self.source_count
    }
}

/// Print connectivity, index counts and the database count, and optionally
/// compare one post across both stores.
pub async fn run(deps: &Dependencies, post_id: Option<&str>) -> Result<(), ReconcileError> {
    let canonical = deps.service.index_stats().await?;
    let matching = deps.service.list_indices().await?;
    let source_count = deps.catalog.count_posts().await?;

    let post = match post_id {
        Some(post_id) => Some(PostCheck {
            post_id: post_id.to_string(),
            source: deps.catalog.find_post(post_id).await?,
            indexed: deps.service.get_document(post_id).await?,
        }),
        None => None,
    };

    let result = CheckReport {
        elasticsearch_url: deps.elasticsearch_url.clone(),
        canonical,
        matching,
        source_count,
        post,
    };

    println!("{}", report::check(&result));
    Ok(())
}
