//! Search query types for the posts index.
//!
//! This module defines the parameters a caller supplies to search the index.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of hits per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// The sort-key tuple of a hit, `[createdAt, id]`.
///
/// A page's last cursor is passed back as `search_after` to fetch the next page.
pub type SortCursor = Vec<Value>;

/// Search parameters.
///
/// Every field is optional: an empty parameter set matches every active post,
/// newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query matched against title, category name and description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,

    /// Page size. Defaults to [`DEFAULT_PAGE_SIZE`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    /// Sort cursor of the last hit of the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<SortCursor>,
}

impl SearchParams {
    /// Create a free-text search.
    ///
    /// # Example
    ///
    /// ```
    /// use classifieds_search_shared::SearchParams;
    ///
    /// let params = SearchParams::text("iphone").with_size(2);
    /// assert_eq!(params.page_size(), 2);
    /// ```
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    pub fn with_price_range(mut self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Continue after the given cursor.
    pub fn after(mut self, cursor: SortCursor) -> Self {
        self.search_after = Some(cursor);
        self
    }

    /// The effective page size.
    pub fn page_size(&self) -> usize {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// The query text, if it contains anything besides whitespace.
    pub fn query_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Whether a price range filter applies.
    pub fn has_price_range(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_page_size() {
        assert_eq!(SearchParams::default().page_size(), 20);
        assert_eq!(SearchParams::default().with_size(5).page_size(), 5);
    }

    #[test]
    fn test_blank_query_is_no_query() {
        assert_eq!(SearchParams::text("   ").query_text(), None);
        assert_eq!(SearchParams::text("").query_text(), None);
        assert_eq!(SearchParams::text(" sofa ").query_text(), Some("sofa"));
        assert_eq!(SearchParams::default().query_text(), None);
    }

    #[test]
    fn test_price_range_detection() {
        assert!(!SearchParams::default().has_price_range());
        assert!(SearchParams::default()
            .with_price_range(Some(10.0), None)
            .has_price_range());
        assert!(SearchParams::default()
            .with_price_range(None, Some(10.0))
            .has_price_range());
    }

    #[test]
    fn test_deserializes_client_params() {
        let params: SearchParams = serde_json::from_value(json!({
            "query": "iphone",
            "categoryId": "cat-1",
            "minPrice": 100,
            "searchAfter": [1714557600000u64, "post-9"]
        }))
        .unwrap();

        assert_eq!(params.category_id.as_deref(), Some("cat-1"));
        assert_eq!(params.min_price, Some(100.0));
        assert_eq!(params.search_after.unwrap().len(), 2);
    }
}
