use tracing::info;

use crate::config::Dependencies;
use crate::errors::ReconcileError;
use crate::report;

/// Drop the posts index, recreate it and bulk-load every post.
pub async fn run(deps: &Dependencies) -> Result<(), ReconcileError> {
    let posts = deps.catalog.list_posts().await?;
    info!(posts = posts.len(), "Loaded posts from the database");

    let summary = deps.service.reindex_all(&posts).await?;
    let stats = deps.service.index_stats().await?;

    println!("{}", report::reindex(posts.len(), &summary, &stats));
    Ok(())
}
