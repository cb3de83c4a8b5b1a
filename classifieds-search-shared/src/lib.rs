//! # Classifieds Search Shared
//!
//! This crate defines the data structures shared across the classifieds search
//! service: the relational post record consumed from the marketplace database,
//! the flat document stored in the search index, search parameters and results,
//! and the mapper that projects one into the other.

pub mod mapper;
pub mod types;

pub use types::post::{Post, PostCategory, PostLocation, PostStatus, PostZone};
pub use types::search_document::{SearchDocument, SuggestInput};
pub use types::search_history::SearchHistoryEntry;
pub use types::search_query::{SearchParams, SortCursor, DEFAULT_PAGE_SIZE};
pub use types::search_result::{RecommendationResponse, SearchHit, SearchResponse, Suggestion};
