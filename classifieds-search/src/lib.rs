//! # Classifieds Search
//!
//! Operator scripts that keep the marketplace's search index in line with
//! the PostgreSQL catalog.
//!
//! ## Binaries
//!
//! - `reindex`: drop and recreate the posts index, then bulk-load every post
//! - `sync`: clear the posts index and re-index post by post, tolerating failures
//! - `consolidate`: merge stray indices into the posts index, delete them, then sync
//! - `check-index [post-id]`: print counts and compare one post across both stores
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`catalog`]: Read access to posts in PostgreSQL
//! - [`commands`]: The body of each script
//! - [`report`]: Summaries printed to standard output
//! - [`errors`]: Error types for the scripts

pub mod catalog;
pub mod commands;
pub mod config;
pub mod errors;
pub mod report;
pub mod telemetry;

pub use config::{Dependencies, LogFormat, Settings};
pub use errors::{CatalogError, ReconcileError};
pub use telemetry::init_tracing;

use dotenv::dotenv;
use tracing::info;

/// Load `.env`, read settings, start tracing and connect to both stores.
pub async fn bootstrap(script: &str) -> Result<Dependencies, ReconcileError> {
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format)?;

    info!(
        script,
        service_version = env!("CARGO_PKG_VERSION"),
        "Starting"
    );

    Dependencies::connect(&settings).await
}
