//! Projection of a relational [`Post`] into a [`SearchDocument`].
//!
//! Every fallback rule is a small pure function so the mapping stays the same
//! for the live indexing path and for the reconciliation jobs.

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::types::post::Post;
use crate::types::search_document::{SearchDocument, SuggestInput};

/// Country used when a post has no location or the location has no country.
pub const DEFAULT_COUNTRY: &str = "Albania";

/// Completion weight of the title suggestion.
pub const TITLE_SUGGEST_WEIGHT: u32 = 10;

/// Completion weight of the category name suggestion.
pub const CATEGORY_SUGGEST_WEIGHT: u32 = 5;

/// Prefer the post's own foreign key, falling back to the joined record's id.
pub fn prefer_foreign_key(foreign_key: Option<&str>, joined_id: Option<&str>) -> Option<String> {
    foreign_key.or(joined_id).map(str::to_string)
}

/// Coerce an arbitrary-precision price into the index's floating-point field.
pub fn price_to_f64(price: &BigDecimal) -> f64 {
    price
        .to_f64()
        .or_else(|| price.to_string().parse().ok())
        .unwrap_or(0.0)
}

/// Build the completion inputs: title at weight 10, category name at weight 5.
/// Empty inputs are dropped.
pub fn suggest_inputs(title: &str, category_name: Option<&str>) -> Vec<SuggestInput> {
    [
        (Some(title), TITLE_SUGGEST_WEIGHT),
        (category_name, CATEGORY_SUGGEST_WEIGHT),
    ]
    .into_iter()
    .filter_map(|(input, weight)| match input {
        Some(text) if !text.is_empty() => Some(SuggestInput::new(text, weight)),
        _ => None,
    })
    .collect()
}

impl From<&Post> for SearchDocument {
    fn from(post: &Post) -> Self {
        let category = post.category.as_ref();
        let location = post.location.as_ref();
        let zone = post.zone.as_ref();

        let category_name = category.map(|c| c.name.clone());
        let country = location
            .and_then(|l| l.country.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY)
            .to_string();

        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            price: price_to_f64(&post.price),
            status: post.status.unwrap_or_default(),
            view_count: post.view_count.unwrap_or(0),
            category_id: prefer_foreign_key(
                post.category_id.as_deref(),
                category.map(|c| c.id.as_str()),
            ),
            suggest: suggest_inputs(&post.title, category_name.as_deref()),
            category_name,
            category_slug: category.map(|c| c.slug.clone()),
            location_id: prefer_foreign_key(
                post.location_id.as_deref(),
                location.map(|l| l.id.as_str()),
            ),
            city: location.map(|l| l.city.clone()),
            country,
            zone_id: prefer_foreign_key(post.zone_id.as_deref(), zone.map(|z| z.id.as_str())),
            zone_name: zone.map(|z| z.name.clone()),
            images: post.images.clone(),
            user_id: post.user_id.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<Post> for SearchDocument {
    fn from(post: Post) -> Self {
        SearchDocument::from(&post)
    }
}
