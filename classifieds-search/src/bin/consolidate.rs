//! Merge leftover indices into the posts index, then rebuild it from the database.

use classifieds_search::{bootstrap, commands, ReconcileError};

#[tokio::main]
async fn main() -> Result<(), ReconcileError> {
    let deps = bootstrap("consolidate").await?;
    commands::consolidate::run(&deps).await
}
