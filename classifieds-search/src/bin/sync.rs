//! Replace the contents of the posts index with every post in the database.

use classifieds_search::{bootstrap, commands, ReconcileError};

#[tokio::main]
async fn main() -> Result<(), ReconcileError> {
    let deps = bootstrap("sync").await?;
    commands::sync::run(&deps).await
}
