//! Print index and database counts.
//!
//! Usage: `check-index [post-id]`

use std::env;

use classifieds_search::{bootstrap, commands, ReconcileError};

#[tokio::main]
async fn main() -> Result<(), ReconcileError> {
    let post_id = env::args().nth(1);

    let deps = bootstrap("check-index").await?;
    commands::check::run(&deps, post_id.as_deref()).await
}
