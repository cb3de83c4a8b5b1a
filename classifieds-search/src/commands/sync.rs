use tracing::info;

use classifieds_search_repository::reconcile;

use crate::config::Dependencies;
use crate::errors::ReconcileError;
use crate::report;

/// Replace the contents of the posts index with every post, one at a time.
pub async fn run(deps: &Dependencies) -> Result<(), ReconcileError> {
    let posts = deps.catalog.list_posts().await?;
    info!(posts = posts.len(), "Loaded posts from the database");

    let result = reconcile::sync(&deps.service, &posts).await?;

    println!("{}", report::sync(&result));
    Ok(())
}
