//! Drop, recreate and bulk-load the posts index from the database.

use classifieds_search::{bootstrap, commands, ReconcileError};

#[tokio::main]
async fn main() -> Result<(), ReconcileError> {
    let deps = bootstrap("reindex").await?;
    commands::reindex::run(&deps).await
}
