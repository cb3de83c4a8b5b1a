//! Search document types for the posts index.
//!
//! This module defines the flat document structure that is indexed in the search
//! engine, one per marketplace post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::post::PostStatus;

/// One entry of the completion suggester field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestInput {
    pub input: String,
    pub weight: u32,
}

impl SuggestInput {
    pub fn new(input: impl Into<String>, weight: u32) -> Self {
        Self {
            input: input.into(),
            weight,
        }
    }
}

/// Document representation of a post in the search index.
///
/// Field names are serialized in camelCase because that is how the index
/// mapping declares them.
///
/// # Fields
///
/// - `id`: The source post id, also used as the document id
/// - `title`, `description`: Full-text fields; `title` is also autocomplete-analyzed
/// - `status`: Only `ACTIVE` documents are returned by searches
/// - `category_*`, `location_id`, `city`, `country`: Denormalized join data for filtering
/// - `zone_id`, `zone_name`: Present only when the post has a zone
/// - `suggest`: Completion suggester inputs built from title and category name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub view_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub suggest: Vec<SuggestInput>,
}

impl SearchDocument {
    /// The document id used in the search index. Always the source post id.
    pub fn document_id(&self) -> &str {
        &self.id
    }

    /// Whether this document may surface in default search results.
    pub fn is_active(&self) -> bool {
        self.status == PostStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SearchDocument {
        SearchDocument {
            id: "post-1".to_string(),
            title: "iPhone 13".to_string(),
            description: "Like new".to_string(),
            price: 800.0,
            status: PostStatus::Active,
            view_count: 3,
            category_id: Some("cat-1".to_string()),
            category_name: Some("Celularë".to_string()),
            category_slug: Some("celulare".to_string()),
            location_id: Some("loc-1".to_string()),
            city: Some("Tirana".to_string()),
            country: "Albania".to_string(),
            zone_id: None,
            zone_name: None,
            images: vec!["https://cdn.example.com/1.jpg".to_string()],
            user_id: "user-1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            suggest: vec![SuggestInput::new("iPhone 13", 10)],
        }
    }

    #[test]
    fn test_serializes_index_field_names() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["categoryId"], "cat-1");
        assert_eq!(value["viewCount"], 3);
        assert_eq!(value["status"], "ACTIVE");
        assert_eq!(value["suggest"][0]["weight"], 10);
        // Zone fields are omitted entirely when the post has no zone
        assert!(value.get("zoneId").is_none());
        assert!(value.get("zoneName").is_none());
    }

    #[test]
    fn test_deserializes_sparse_source() {
        let source = json!({
            "id": "post-2",
            "title": "Sofa",
            "price": 300.0,
            "country": "Albania",
            "userId": "user-2",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        });

        let doc: SearchDocument = serde_json::from_value(source).unwrap();

        assert_eq!(doc.status, PostStatus::Active);
        assert_eq!(doc.view_count, 0);
        assert!(doc.images.is_empty());
        assert!(doc.suggest.is_empty());
        assert_eq!(doc.document_id(), "post-2");
    }
}
