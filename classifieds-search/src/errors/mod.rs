//! Error types for the reconciliation scripts.

use classifieds_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors from reading posts out of the relational store.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Query or connection failure.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// A row that can't be turned into a post.
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

impl CatalogError {
    /// Create an invalid row error.
    pub fn invalid_row(msg: impl Into<String>) -> Self {
        Self::InvalidRow(msg.into())
    }
}

/// Errors that end a script run with a non-zero exit code.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The search engine did not answer the startup ping.
    #[error("Search engine unreachable: {source}. Check that the search engine is reachable at {url}")]
    Unreachable {
        url: String,
        source: SearchIndexError,
    },

    /// Search engine error.
    #[error("Search index error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// Relational store error.
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),
}

impl ReconcileError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an unreachable-engine error for `url`.
    pub fn unreachable(url: impl Into<String>, source: SearchIndexError) -> Self {
        Self::Unreachable {
            url: url.into(),
            source,
        }
    }
}
