//! Search result types for the posts index.
//!
//! This module defines the response structures returned from search operations.

use serde::{Deserialize, Serialize};

use crate::types::search_document::SearchDocument;
use crate::types::search_query::SortCursor;

/// A single search hit: the stored document plus its own sort cursor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub document: SearchDocument,

    /// Sort key of this hit; pass it back as `searchAfter` for the next page.
    #[serde(default)]
    pub sort: SortCursor,

    /// Set on hits returned by personalized recommendations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recommended: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<String>,
}

impl SearchHit {
    pub fn new(document: SearchDocument, sort: SortCursor) -> Self {
        Self {
            document,
            sort,
            is_recommended: None,
            recommendation_reason: None,
        }
    }

    /// Mark this hit as a recommendation with a human-readable reason.
    pub fn recommended(mut self, reason: impl Into<String>) -> Self {
        self.is_recommended = Some(true);
        self.recommendation_reason = Some(reason.into());
        self
    }
}

/// Complete search response with hits and the total match count.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// The page of hits, newest first.
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents.
    /// May be greater than the number of returned hits due to pagination.
    pub total: u64,
}

impl SearchResponse {
    /// Create an empty search response.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(hits: Vec<SearchHit>, total: u64) -> Self {
        Self { hits, total }
    }

    /// Returns true if there are no hits on this page.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits on this page.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Cursor for the next page, if this page had any hits.
    pub fn next_cursor(&self) -> Option<SortCursor> {
        self.hits.last().map(|hit| hit.sort.clone())
    }
}

/// An autocomplete suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub text: String,
    pub score: f64,
}

/// Personalized recommendations for a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub hits: Vec<SearchHit>,
    pub total: u64,

    /// The categories the recommendations were drawn from, most frequent
    /// first. Empty when the response fell back to popular posts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_categories: Vec<String>,
}

impl RecommendationResponse {
    /// Create an empty response for users with no history.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the hits were personalized from search history.
    pub fn is_personalized(&self) -> bool {
        !self.top_categories.is_empty()
    }
}

impl From<SearchResponse> for RecommendationResponse {
    fn from(response: SearchResponse) -> Self {
        Self {
            hits: response.hits,
            total: response.total,
            top_categories: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::post::PostStatus;
    use chrono::Utc;
    use serde_json::json;

    fn document(id: &str) -> SearchDocument {
        SearchDocument {
            id: id.to_string(),
            title: "Sofa".to_string(),
            description: String::new(),
            price: 300.0,
            status: PostStatus::Active,
            view_count: 0,
            category_id: None,
            category_name: None,
            category_slug: None,
            location_id: None,
            city: None,
            country: "Albania".to_string(),
            zone_id: None,
            zone_name: None,
            images: vec![],
            user_id: "user-1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            suggest: vec![],
        }
    }

    #[test]
    fn test_search_response_empty() {
        let response = SearchResponse::empty();
        assert!(response.is_empty());
        assert_eq!(response.len(), 0);
        assert_eq!(response.total, 0);
        assert!(response.next_cursor().is_none());
    }

    #[test]
    fn test_next_cursor_is_last_hit_sort() {
        let response = SearchResponse::new(
            vec![
                SearchHit::new(document("a"), vec![json!(2), json!("a")]),
                SearchHit::new(document("b"), vec![json!(1), json!("b")]),
            ],
            2,
        );

        assert_eq!(response.next_cursor(), Some(vec![json!(1), json!("b")]));
    }

    #[test]
    fn test_hit_flattens_document() {
        let hit = SearchHit::new(document("a"), vec![json!(1), json!("a")])
            .recommended("Based on your search history");

        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["id"], "a");
        assert_eq!(value["sort"][1], "a");
        assert_eq!(value["isRecommended"], true);
        assert_eq!(value["recommendationReason"], "Based on your search history");
    }

    #[test]
    fn test_fallback_has_no_top_categories() {
        let response: RecommendationResponse = SearchResponse::empty().into();
        assert!(!response.is_personalized());

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("topCategories").is_none());
    }
}
