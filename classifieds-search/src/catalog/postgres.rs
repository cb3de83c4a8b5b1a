//! PostgreSQL implementation of the post source.
//!
//! Reads the Prisma-managed `Post`, `Category`, `Location` and `Zone` tables,
//! whose quoted camelCase column names are kept as-is.

use std::str::FromStr;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};

use classifieds_search_shared::{Post, PostCategory, PostLocation, PostStatus, PostZone};

use crate::catalog::PostSource;
use crate::errors::CatalogError;

const SELECT_POSTS: &str = r#"
    SELECT
        p."id", p."title", p."description", p."price", p."status"::text AS "status",
        p."viewCount", p."categoryId", p."locationId", p."zoneId", p."images",
        p."userId", p."createdAt", p."updatedAt",
        c."id" AS "joinedCategoryId", c."name" AS "categoryName", c."slug" AS "categorySlug",
        l."id" AS "joinedLocationId", l."city", l."country",
        z."id" AS "joinedZoneId", z."name" AS "zoneName"
    FROM "Post" p
    LEFT JOIN "Category" c ON c."id" = p."categoryId"
    LEFT JOIN "Location" l ON l."id" = p."locationId"
    LEFT JOIN "Zone" z ON z."id" = p."zoneId"
"#;

/// PostgreSQL-backed post source.
pub struct PostgresPostSource {
    pool: PgPool,
}

impl PostgresPostSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostSource for PostgresPostSource {
    async fn list_posts(&self) -> Result<Vec<Post>, CatalogError> {
        let query = format!(r#"{} ORDER BY p."createdAt", p."id""#, SELECT_POSTS);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        debug!(rows = rows.len(), "Read posts");
        rows.iter().map(post_from_row).collect()
    }

    async fn find_post(&self, post_id: &str) -> Result<Option<Post>, CatalogError> {
        let query = format!(r#"{} WHERE p."id" = $1"#, SELECT_POSTS);
        let row = sqlx::query(&query)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn count_posts(&self) -> Result<u64, CatalogError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Post""#)
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count).map_err(|e| CatalogError::invalid_row(e.to_string()))
    }
}

/// Map one joined row to a post.
///
/// Join columns are all null when the foreign key points nowhere, in which
/// case the joined record is left out.
fn post_from_row(row: &PgRow) -> Result<Post, CatalogError> {
    let id: String = row.try_get("id")?;

    let category = match row.try_get::<Option<String>, _>("joinedCategoryId")? {
        Some(category_id) => Some(PostCategory {
            id: category_id,
            name: row.try_get::<Option<String>, _>("categoryName")?.unwrap_or_default(),
            slug: row.try_get::<Option<String>, _>("categorySlug")?.unwrap_or_default(),
        }),
        None => None,
    };
    let location = match row.try_get::<Option<String>, _>("joinedLocationId")? {
        Some(location_id) => Some(PostLocation {
            id: location_id,
            city: row.try_get::<Option<String>, _>("city")?.unwrap_or_default(),
            country: row.try_get("country")?,
        }),
        None => None,
    };
    let zone = match row.try_get::<Option<String>, _>("joinedZoneId")? {
        Some(zone_id) => Some(PostZone {
            id: zone_id,
            name: row.try_get::<Option<String>, _>("zoneName")?.unwrap_or_default(),
        }),
        None => None,
    };

    let status = parse_status(row.try_get::<Option<&str>, _>("status")?, &id);

    let created_at: NaiveDateTime = row.try_get("createdAt")?;
    let updated_at: NaiveDateTime = row.try_get("updatedAt")?;

    Ok(Post {
        title: row.try_get("title")?,
        description: row.try_get::<Option<String>, _>("description")?.unwrap_or_default(),
        price: row.try_get::<Option<BigDecimal>, _>("price")?.unwrap_or_default(),
        status,
        view_count: row.try_get::<Option<i32>, _>("viewCount")?.map(i64::from),
        category_id: row.try_get("categoryId")?,
        location_id: row.try_get("locationId")?,
        zone_id: row.try_get("zoneId")?,
        category,
        location,
        zone,
        images: row.try_get::<Option<Vec<String>>, _>("images")?.unwrap_or_default(),
        user_id: row.try_get("userId")?,
        created_at: created_at.and_utc(),
        updated_at: updated_at.and_utc(),
        id,
    })
}

/// Status column to [`PostStatus`]. An absent status stays `None` and is
/// defaulted by the mapper.
fn parse_status(raw: Option<&str>, post_id: &str) -> Option<PostStatus> {
    let raw = raw?;
    match PostStatus::from_str(raw) {
        Ok(status) => Some(status),
        Err(e) => {
            // Keep unknown states out of search results
            warn!(post_id = %post_id, status = %raw, error = %e, "Unknown post status, indexing as hidden");
            Some(PostStatus::Hidden)
        }
    }
}
