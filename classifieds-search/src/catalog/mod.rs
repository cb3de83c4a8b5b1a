//! Read access to posts in the relational store.
//!
//! The store is the system of record; nothing here writes to it.

mod postgres;

use async_trait::async_trait;

use classifieds_search_shared::Post;

use crate::errors::CatalogError;

pub use postgres::PostgresPostSource;

/// Source of posts with their category, location and zone joined.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Every post, whatever its status, oldest first.
    ///
    /// This is a single unpaginated read: the reconcile jobs load the whole
    /// catalog before writing, so memory grows with the number of posts.
    async fn list_posts(&self) -> Result<Vec<Post>, CatalogError>;

    /// One post by id.
    async fn find_post(&self, post_id: &str) -> Result<Option<Post>, CatalogError>;

    /// Number of posts, whatever their status.
    async fn count_posts(&self) -> Result<u64, CatalogError>;
}
