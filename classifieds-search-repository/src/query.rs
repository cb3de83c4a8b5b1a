//! Query building and response parsing.
//!
//! Every request body the service sends is built here as engine query DSL,
//! and every response is parsed here. Nothing in this module performs I/O.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use classifieds_search_shared::{
    PostStatus, SearchDocument, SearchHit, SearchParams, SearchResponse, Suggestion,
};

use crate::errors::SearchIndexError;

/// Fields matched by free-text search, with their boosts.
pub const SEARCH_FIELDS: [&str; 3] = ["title^3", "categoryName^2", "description"];

/// Name under which the completion suggester is requested and answered.
pub const SUGGESTER_NAME: &str = "post-suggest";

/// Maximum number of suggestions returned for a prefix.
pub const MAX_SUGGESTIONS: usize = 5;

/// A query matching every document.
pub fn match_all_query() -> Value {
    json!({ "match_all": {} })
}

/// The mandatory filter keeping non-active posts out of every result set.
pub fn active_status_filter() -> Value {
    json!({ "term": { "status": PostStatus::Active.as_str() } })
}

/// Newest first, with the document id as a tie-break so every sort key is
/// unique and `search_after` pagination is stable.
pub fn recency_sort() -> Value {
    json!([
        { "createdAt": { "order": "desc" } },
        { "id": { "order": "desc" } }
    ])
}

/// Build the `must` clause: a fuzzy multi-field match, or match-all when the
/// query is empty.
fn build_must_clause(params: &SearchParams) -> Value {
    match params.query_text() {
        Some(text) => json!({
            "multi_match": {
                "query": text,
                "fields": SEARCH_FIELDS,
                "fuzziness": "AUTO"
            }
        }),
        None => match_all_query(),
    }
}

/// Build the non-scoring filter clauses.
fn build_filter_clauses(params: &SearchParams) -> Vec<Value> {
    let mut filters = vec![active_status_filter()];

    if let Some(ref category_id) = params.category_id {
        filters.push(json!({ "term": { "categoryId": category_id } }));
    }
    if let Some(ref location_id) = params.location_id {
        filters.push(json!({ "term": { "locationId": location_id } }));
    }
    if params.has_price_range() {
        let mut range = Map::new();
        if let Some(min_price) = params.min_price {
            range.insert("gte".to_string(), json!(min_price));
        }
        if let Some(max_price) = params.max_price {
            range.insert("lte".to_string(), json!(max_price));
        }
        filters.push(json!({ "range": { "price": range } }));
    }

    filters
}

/// Build the request body for a post search.
pub fn build_search_body(params: &SearchParams) -> Value {
    let mut body = json!({
        "query": {
            "bool": {
                "must": [build_must_clause(params)],
                "filter": build_filter_clauses(params)
            }
        },
        "sort": recency_sort(),
        "size": params.page_size(),
        "track_total_hits": true
    });

    if let Some(ref cursor) = params.search_after {
        body["search_after"] = json!(cursor);
    }

    body
}

/// Build the request body for a prefix completion lookup.
pub fn build_suggest_body(prefix: &str) -> Value {
    json!({
        "_source": false,
        "suggest": {
            SUGGESTER_NAME: {
                "prefix": prefix,
                "completion": {
                    "field": "suggest",
                    "size": MAX_SUGGESTIONS,
                    "skip_duplicates": true
                }
            }
        }
    })
}

/// Build the request body for active posts in any of `category_ids`, newest first.
pub fn build_category_affinity_body(category_ids: &[String], size: usize) -> Value {
    json!({
        "query": {
            "bool": {
                "filter": [
                    active_status_filter(),
                    { "terms": { "categoryId": category_ids } }
                ]
            }
        },
        "sort": recency_sort(),
        "size": size,
        "track_total_hits": true
    })
}

/// Format a timestamp the way history entries store it.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the request body for a user's history entries since `since`.
pub fn build_history_window_body(user_id: &str, since: DateTime<Utc>, limit: usize) -> Value {
    json!({
        "query": {
            "bool": {
                "filter": [
                    { "term": { "userId": user_id } },
                    { "range": { "timestamp": { "gte": format_timestamp(since) } } }
                ]
            }
        },
        "size": limit
    })
}

/// Build the request body for a user's most recent history entries.
pub fn build_user_history_body(user_id: &str, limit: usize) -> Value {
    json!({
        "query": {
            "bool": {
                "filter": [{ "term": { "userId": user_id } }]
            }
        },
        "sort": [{ "timestamp": { "order": "desc" } }],
        "size": limit
    })
}

/// Read the total hit count, whether the engine reports it as a bare number or
/// as a `{ "value": n }` object.
pub fn parse_total(response: &Value) -> u64 {
    let total = &response["hits"]["total"];
    total
        .as_u64()
        .or_else(|| total["value"].as_u64())
        .unwrap_or(0)
}

fn raw_hits(response: &Value) -> Result<&Vec<Value>, SearchIndexError> {
    response["hits"]["hits"]
        .as_array()
        .ok_or_else(|| SearchIndexError::parse("Search response has no hits array"))
}

/// Parse a post search response into hits carrying their sort cursors.
pub fn parse_search_response(response: &Value) -> Result<SearchResponse, SearchIndexError> {
    let hits = raw_hits(response)?
        .iter()
        .map(|hit| {
            let document: SearchDocument = serde_json::from_value(hit["_source"].clone())
                .map_err(|e| {
                    SearchIndexError::parse(format!(
                        "Invalid document {}: {}",
                        hit["_id"].as_str().unwrap_or("<unknown>"),
                        e
                    ))
                })?;
            let sort = hit["sort"].as_array().cloned().unwrap_or_default();
            Ok(SearchHit::new(document, sort))
        })
        .collect::<Result<Vec<_>, SearchIndexError>>()?;

    Ok(SearchResponse::new(hits, parse_total(response)))
}

/// Deserialize the `_source` of every hit.
pub fn parse_sources<T: DeserializeOwned>(response: &Value) -> Result<Vec<T>, SearchIndexError> {
    raw_hits(response)?
        .iter()
        .map(|hit| {
            serde_json::from_value(hit["_source"].clone())
                .map_err(|e| SearchIndexError::parse(e.to_string()))
        })
        .collect()
}

/// Parse completion options in engine order, dropping repeated texts and
/// keeping at most [`MAX_SUGGESTIONS`].
pub fn parse_suggestions(response: &Value) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = Vec::new();

    let entries = response["suggest"][SUGGESTER_NAME]
        .as_array()
        .cloned()
        .unwrap_or_default();

    for option in entries
        .iter()
        .filter_map(|entry| entry["options"].as_array())
        .flatten()
    {
        let Some(text) = option["text"].as_str() else {
            continue;
        };
        if suggestions.iter().any(|s| s.text == text) {
            continue;
        }
        suggestions.push(Suggestion {
            text: text.to_string(),
            score: option["_score"].as_f64().unwrap_or(0.0),
        });
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    suggestions
}
