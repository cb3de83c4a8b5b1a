use tracing::info;

use classifieds_search_repository::reconcile;

use crate::config::Dependencies;
use crate::errors::ReconcileError;
use crate::report;

/// Merge stray indices into the posts index, delete them, then rebuild from
/// the database.
pub async fn run(deps: &Dependencies) -> Result<(), ReconcileError> {
    let posts = deps.catalog.list_posts().await?;
    info!(posts = posts.len(), "Loaded posts from the database");

    let result = reconcile::consolidate(&deps.service, &posts).await?;

    println!("{}", report::consolidate(&result));
    Ok(())
}
