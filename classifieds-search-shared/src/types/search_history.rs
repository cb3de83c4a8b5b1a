//! Search history entries, one per search served to an authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only record of a single executed search.
///
/// Entries are written after a search is served and read back only by the
/// recommender and the history endpoint. They are never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub user_id: String,
    /// Query text; empty when the search was driven by filters alone.
    #[serde(default)]
    pub query: String,
    pub category_id: Option<String>,
    pub location_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Total hits the recorded search returned.
    #[serde(default)]
    pub result_count: u64,
}
