//! Frequency-based category affinity from a user's recent searches.

use classifieds_search_shared::SearchHistoryEntry;

/// Trailing window of history the recommender reads.
pub const HISTORY_WINDOW_DAYS: i64 = 30;

/// Maximum number of history entries the recommender reads.
pub const HISTORY_SCAN_LIMIT: usize = 100;

/// Number of categories recommendations are drawn from.
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Reason attached to every personalized hit.
pub const RECOMMENDATION_REASON: &str = "Based on your search history";

/// The `limit` most frequent categories across `entries`, most frequent first.
///
/// Entries without a category are ignored. Ties keep first-seen order, so the
/// result is deterministic for a given input order.
pub fn top_categories(entries: &[SearchHistoryEntry], limit: usize) -> Vec<String> {
    let mut tally: Vec<(&str, usize)> = Vec::new();

    for category_id in entries.iter().filter_map(|e| e.category_id.as_deref()) {
        match tally.iter_mut().find(|(id, _)| *id == category_id) {
            Some((_, count)) => *count += 1,
            None => tally.push((category_id, 1)),
        }
    }

    // Stable sort keeps first-seen order among equal counts
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
        .into_iter()
        .take(limit)
        .map(|(id, _)| id.to_string())
        .collect()
}
