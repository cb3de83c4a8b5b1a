//! Catalog tests against a live PostgreSQL holding the marketplace schema.
//!
//! Run with `DATABASE_URL=... cargo test -- --ignored`.

use std::env;

use sqlx::postgres::PgPoolOptions;

use classifieds_search::catalog::{PostSource, PostgresPostSource};
use classifieds_search_shared::SearchDocument;

async fn source() -> PostgresPostSource {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to PostgreSQL");
    PostgresPostSource::new(pool)
}

#[tokio::test]
#[ignore]
async fn test_list_matches_count() {
    let source = source().await;

    let posts = source.list_posts().await.unwrap();
    let count = source.count_posts().await.unwrap();

    assert_eq!(posts.len() as u64, count);
    assert!(posts.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
#[ignore]
async fn test_find_post_round_trips_through_mapper() {
    let source = source().await;
    let posts = source.list_posts().await.unwrap();
    let Some(first) = posts.first() else {
        return;
    };

    let found = source.find_post(&first.id).await.unwrap().unwrap();
    let document = SearchDocument::from(&found);

    assert_eq!(document.id, first.id);
    assert_eq!(document.category_id, SearchDocument::from(first).category_id);
    assert!(source.find_post("no-such-post").await.unwrap().is_none());
}
