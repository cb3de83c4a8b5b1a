//! Marketplace post as read from the relational store.
//!
//! The search service never writes these records; it only projects them into
//! [`SearchDocument`](crate::SearchDocument)s.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a post. Only `Active` posts are ever returned by searches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    #[default]
    Active,
    Sold,
    Hidden,
    Deleted,
}

impl PostStatus {
    /// The keyword stored in the index for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Active => "ACTIVE",
            PostStatus::Sold => "SOLD",
            PostStatus::Hidden => "HIDDEN",
            PostStatus::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(PostStatus::Active),
            "SOLD" => Ok(PostStatus::Sold),
            "HIDDEN" => Ok(PostStatus::Hidden),
            "DELETED" => Ok(PostStatus::Deleted),
            other => Err(format!("Unknown post status: {}", other)),
        }
    }
}

/// Category joined onto a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostCategory {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Location joined onto a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostLocation {
    pub id: String,
    pub city: String,
    pub country: Option<String>,
}

/// Zone (neighbourhood) joined onto a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostZone {
    pub id: String,
    pub name: String,
}

/// A marketplace post with its category, location and zone eagerly joined.
///
/// The foreign keys and the joined records are both optional: rows loaded
/// without their joins, or older rows missing a status or view count, must
/// still map to a valid document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: BigDecimal,
    pub status: Option<PostStatus>,
    pub view_count: Option<i64>,
    pub category_id: Option<String>,
    pub location_id: Option<String>,
    pub zone_id: Option<String>,
    pub category: Option<PostCategory>,
    pub location: Option<PostLocation>,
    pub zone: Option<PostZone>,
    pub images: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
