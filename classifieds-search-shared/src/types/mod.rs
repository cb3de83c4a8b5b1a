//! This module defines the core data structures used across the search service.

pub mod post;
pub mod search_document;
pub mod search_history;
pub mod search_query;
pub mod search_result;
