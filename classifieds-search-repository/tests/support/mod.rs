//! In-memory search engine used by the integration tests.
//!
//! Interprets the request bodies the query builder emits: match_all, bool
//! must/filter, multi_match (case-insensitive token prefix match, no fuzziness),
//! term, terms, range, sort with search_after, completion suggest and scroll.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use classifieds_search_repository::{
    BatchOperationResult, BatchOperationSummary, IndexConfig, IndexDocumentRequest, IndexInfo,
    RawHit, ScrollPage, SearchIndexError, SearchIndexProvider, SearchService,
    SearchServiceConfig,
};
use classifieds_search_shared::{Post, PostCategory, PostStatus};

#[derive(Default)]
struct Index {
    documents: BTreeMap<String, Value>,
    settings: Value,
}

#[derive(Default)]
struct State {
    indices: BTreeMap<String, Index>,
    scrolls: HashMap<String, (Vec<RawHit>, usize)>,
    next_scroll_id: u64,
    next_auto_id: u64,
    cleared_scrolls: usize,
    search_calls: usize,
    failing_ids: HashSet<String>,
    failing_bulk_requests: usize,
    failing_scroll_continuations: bool,
    unreachable: bool,
}

/// A shared handle to an in-memory engine. Clones see the same state.
#[derive(Clone, Default)]
pub struct InMemoryProvider {
    state: Arc<Mutex<State>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `ping` fail.
    pub async fn set_unreachable(&self) {
        self.state.lock().await.unreachable = true;
    }

    /// Make every write of this document id fail.
    pub async fn fail_document(&self, document_id: &str) {
        self.state
            .lock()
            .await
            .failing_ids
            .insert(document_id.to_string());
    }

    /// Reject the next `requests` bulk requests as a whole.
    pub async fn fail_next_bulk(&self, requests: usize) {
        self.state.lock().await.failing_bulk_requests = requests;
    }

    /// Make every scroll continuation fail. Opening a scroll still works.
    pub async fn fail_scroll_continuations(&self) {
        self.state.lock().await.failing_scroll_continuations = true;
    }

    /// Store a document directly, creating the index if needed.
    pub async fn seed(&self, index: &str, document_id: &str, body: Value) {
        self.state
            .lock()
            .await
            .indices
            .entry(index.to_string())
            .or_default()
            .documents
            .insert(document_id.to_string(), body);
    }

    /// Create an index with arbitrary settings, bypassing the service.
    pub async fn create_index_with(&self, index: &str, settings: Value) {
        self.state.lock().await.indices.insert(
            index.to_string(),
            Index {
                documents: BTreeMap::new(),
                settings,
            },
        );
    }

    pub async fn document(&self, index: &str, document_id: &str) -> Option<Value> {
        self.state
            .lock()
            .await
            .indices
            .get(index)
            .and_then(|i| i.documents.get(document_id).cloned())
    }

    pub async fn document_ids(&self, index: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .indices
            .get(index)
            .map(|i| i.documents.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn documents(&self, index: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .indices
            .get(index)
            .map(|i| i.documents.values().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn has_index(&self, index: &str) -> bool {
        self.state.lock().await.indices.contains_key(index)
    }

    pub async fn index_settings(&self, index: &str) -> Option<Value> {
        self.state
            .lock()
            .await
            .indices
            .get(index)
            .map(|i| i.settings.clone())
    }

    pub async fn search_calls(&self) -> usize {
        self.state.lock().await.search_calls
    }

    pub async fn cleared_scrolls(&self) -> usize {
        self.state.lock().await.cleared_scrolls
    }

    pub async fn open_scrolls(&self) -> usize {
        self.state.lock().await.scrolls.len()
    }
}

fn missing_index(index: &str) -> SearchIndexError {
    SearchIndexError::search(format!("no such index [{}]", index))
}

#[async_trait]
impl SearchIndexProvider for InMemoryProvider {
    async fn ping(&self) -> Result<(), SearchIndexError> {
        if self.state.lock().await.unreachable {
            return Err(SearchIndexError::connection("connection refused"));
        }
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        Ok(self.has_index(index).await)
    }

    async fn create_index(&self, index: &str, settings: &Value) -> Result<(), SearchIndexError> {
        self.state
            .lock()
            .await
            .indices
            .entry(index.to_string())
            .or_insert_with(|| Index {
                documents: BTreeMap::new(),
                settings: settings.clone(),
            });
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        match self.state.lock().await.indices.remove(index) {
            Some(_) => Ok(()),
            None => Err(SearchIndexError::delete(format!("no such index [{}]", index))),
        }
    }

    async fn list_indices(&self, pattern: &str) -> Result<Vec<IndexInfo>, SearchIndexError> {
        let state = self.state.lock().await;
        Ok(state
            .indices
            .iter()
            .filter(|(name, _)| match pattern.strip_suffix('*') {
                Some(prefix) => name.starts_with(prefix),
                None => name.as_str() == pattern,
            })
            .map(|(name, index)| IndexInfo {
                name: name.clone(),
                docs_count: index.documents.len() as u64,
            })
            .collect())
    }

    async fn index_document(
        &self,
        index: &str,
        document_id: Option<&str>,
        body: &Value,
    ) -> Result<(), SearchIndexError> {
        let mut state = self.state.lock().await;
        let document_id = match document_id {
            Some(id) => id.to_string(),
            None => {
                state.next_auto_id += 1;
                format!("auto-{}", state.next_auto_id)
            }
        };
        if state.failing_ids.contains(&document_id) {
            return Err(SearchIndexError::index(format!("rejected {}", document_id)));
        }
        state
            .indices
            .entry(index.to_string())
            .or_default()
            .documents
            .insert(document_id, body.clone());
        Ok(())
    }

    async fn get_document(
        &self,
        index: &str,
        document_id: &str,
    ) -> Result<Option<Value>, SearchIndexError> {
        Ok(self.document(index, document_id).await)
    }

    async fn delete_document(&self, index: &str, document_id: &str) -> Result<(), SearchIndexError> {
        let mut state = self.state.lock().await;
        let removed = state
            .indices
            .get_mut(index)
            .and_then(|i| i.documents.remove(document_id));
        match removed {
            Some(_) => Ok(()),
            None => Err(SearchIndexError::document_not_found(index, document_id)),
        }
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[IndexDocumentRequest],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.failing_bulk_requests > 0 {
            state.failing_bulk_requests -= 1;
            return Err(SearchIndexError::bulk_index("503 Service Unavailable"));
        }
        let failing = state.failing_ids.clone();
        let target = state.indices.entry(index.to_string()).or_default();

        let results = documents
            .iter()
            .map(|document| {
                if failing.contains(&document.document_id) {
                    BatchOperationResult::failed(
                        &document.document_id,
                        SearchIndexError::index("mapper_parsing_exception"),
                    )
                } else {
                    target
                        .documents
                        .insert(document.document_id.clone(), document.body.clone());
                    BatchOperationResult::succeeded(&document.document_id)
                }
            })
            .collect();

        Ok(BatchOperationSummary::from_results(results))
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchIndexError> {
        let mut state = self.state.lock().await;
        state.search_calls += 1;
        let target = state.indices.get(index).ok_or_else(|| missing_index(index))?;

        if let Some(suggest) = body.get("suggest") {
            return Ok(suggest_response(target, suggest));
        }

        let query = body.get("query").cloned().unwrap_or(json!({ "match_all": {} }));
        let sort = body.get("sort").and_then(Value::as_array).cloned().unwrap_or_default();
        let size = body["size"].as_u64().unwrap_or(10) as usize;

        let mut matched: Vec<(String, Value, Vec<Value>)> = target
            .documents
            .iter()
            .filter(|(_, document)| matches(&query, document))
            .map(|(id, document)| (id.clone(), document.clone(), sort_key(&sort, document)))
            .collect();
        let total = matched.len();

        matched.sort_by(|a, b| compare_keys(&sort, &a.2, &b.2));

        if let Some(cursor) = body.get("search_after").and_then(Value::as_array) {
            matched.retain(|(_, _, key)| compare_keys(&sort, key, cursor) == Ordering::Greater);
        }

        let hits: Vec<Value> = matched
            .into_iter()
            .take(size)
            .map(|(id, document, key)| json!({ "_id": id, "_source": document, "sort": key }))
            .collect();

        Ok(json!({
            "hits": {
                "total": { "value": total, "relation": "eq" },
                "hits": hits
            }
        }))
    }

    async fn count(&self, index: &str) -> Result<u64, SearchIndexError> {
        let state = self.state.lock().await;
        let target = state.indices.get(index).ok_or_else(|| missing_index(index))?;
        Ok(target.documents.len() as u64)
    }

    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<u64, SearchIndexError> {
        let mut state = self.state.lock().await;
        let target = state
            .indices
            .get_mut(index)
            .ok_or_else(|| missing_index(index))?;
        let before = target.documents.len();
        target.documents.retain(|_, document| !matches(query, document));
        Ok((before - target.documents.len()) as u64)
    }

    async fn refresh(&self, index: &str) -> Result<(), SearchIndexError> {
        if !self.has_index(index).await {
            return Err(missing_index(index));
        }
        Ok(())
    }

    async fn open_scroll(
        &self,
        index: &str,
        body: &Value,
        _keep_alive: &str,
    ) -> Result<ScrollPage, SearchIndexError> {
        let mut state = self.state.lock().await;
        let target = state.indices.get(index).ok_or_else(|| missing_index(index))?;
        let query = body.get("query").cloned().unwrap_or(json!({ "match_all": {} }));
        let batch_size = body["size"].as_u64().unwrap_or(10) as usize;

        let mut remaining: Vec<RawHit> = target
            .documents
            .iter()
            .filter(|(_, document)| matches(&query, document))
            .map(|(id, document)| RawHit {
                document_id: id.clone(),
                source: document.clone(),
            })
            .collect();
        let rest = remaining.split_off(batch_size.min(remaining.len()));

        state.next_scroll_id += 1;
        let scroll_id = format!("scroll-{}", state.next_scroll_id);
        state.scrolls.insert(scroll_id.clone(), (rest, batch_size));

        Ok(ScrollPage {
            scroll_id: Some(scroll_id),
            hits: remaining,
        })
    }

    async fn continue_scroll(
        &self,
        scroll_id: &str,
        _keep_alive: &str,
    ) -> Result<ScrollPage, SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.failing_scroll_continuations {
            return Err(SearchIndexError::search("search_context_missing_exception"));
        }
        let (remaining, batch_size) = state
            .scrolls
            .get_mut(scroll_id)
            .ok_or_else(|| SearchIndexError::search(format!("no scroll [{}]", scroll_id)))?;

        let take = (*batch_size).min(remaining.len());
        let hits: Vec<RawHit> = remaining.drain(..take).collect();

        Ok(ScrollPage {
            scroll_id: Some(scroll_id.to_string()),
            hits,
        })
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<(), SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.scrolls.remove(scroll_id).is_some() {
            state.cleared_scrolls += 1;
        }
        Ok(())
    }
}

fn matches(query: &Value, document: &Value) -> bool {
    let Some((kind, clause)) = query.as_object().and_then(|o| o.iter().next()) else {
        return true;
    };

    match kind.as_str() {
        "match_all" => true,
        "bool" => ["must", "filter"].iter().all(|occur| match &clause[*occur] {
            Value::Array(clauses) => clauses.iter().all(|c| matches(c, document)),
            Value::Null => true,
            single => matches(single, document),
        }),
        "multi_match" => multi_match(clause, document),
        "term" => field_clause(clause).is_some_and(|(field, expected)| {
            let expected = expected.get("value").unwrap_or(expected);
            &document[field] == expected
        }),
        "terms" => field_clause(clause).is_some_and(|(field, expected)| {
            expected
                .as_array()
                .is_some_and(|values| values.contains(&document[field]))
        }),
        "range" => field_clause(clause).is_some_and(|(field, bounds)| {
            let value = &document[field];
            if value.is_null() {
                return false;
            }
            let lower = bounds
                .get("gte")
                .map_or(true, |b| compare_values(value, b) != Ordering::Less);
            let upper = bounds
                .get("lte")
                .map_or(true, |b| compare_values(value, b) != Ordering::Greater);
            lower && upper
        }),
        _ => false,
    }
}

fn field_clause(clause: &Value) -> Option<(&str, &Value)> {
    clause
        .as_object()
        .and_then(|o| o.iter().next())
        .map(|(field, value)| (field.as_str(), value))
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn multi_match(clause: &Value, document: &Value) -> bool {
    let wanted = tokens(clause["query"].as_str().unwrap_or_default());
    let fields: Vec<&str> = clause["fields"]
        .as_array()
        .map(|f| {
            f.iter()
                .filter_map(Value::as_str)
                .map(|f| f.split('^').next().unwrap_or(f))
                .collect()
        })
        .unwrap_or_default();

    let indexed: Vec<String> = fields
        .iter()
        .filter_map(|field| document[*field].as_str())
        .flat_map(tokens)
        .collect();

    wanted
        .iter()
        .any(|w| indexed.iter().any(|token| token.starts_with(w.as_str())))
}

fn as_instant(value: &Value) -> Option<i64> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.timestamp_millis())
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    if let (Some(a), Some(b)) = (as_instant(a), as_instant(b)) {
        return a.cmp(&b);
    }
    a.as_str().unwrap_or_default().cmp(b.as_str().unwrap_or_default())
}

fn sort_specs(sort: &[Value]) -> Vec<(String, bool)> {
    sort.iter()
        .filter_map(|spec| match spec {
            Value::String(field) => Some((field.clone(), false)),
            Value::Object(o) => o
                .iter()
                .next()
                .map(|(field, options)| (field.clone(), options["order"] == "desc")),
            _ => None,
        })
        .collect()
}

/// Sort values as the engine reports them: dates as epoch millis.
fn sort_key(sort: &[Value], document: &Value) -> Vec<Value> {
    sort_specs(sort)
        .into_iter()
        .filter(|(field, _)| field != "_doc")
        .map(|(field, _)| {
            let value = &document[field.as_str()];
            as_instant(value).map(|millis| json!(millis)).unwrap_or_else(|| value.clone())
        })
        .collect()
}

fn compare_keys(sort: &[Value], a: &[Value], b: &[Value]) -> Ordering {
    let specs: Vec<(String, bool)> = sort_specs(sort)
        .into_iter()
        .filter(|(field, _)| field != "_doc")
        .collect();

    for (position, (_, descending)) in specs.iter().enumerate() {
        let (Some(x), Some(y)) = (a.get(position), b.get(position)) else {
            break;
        };
        let ordering = compare_values(x, y);
        let ordering = if *descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn suggest_response(index: &Index, suggest: &Value) -> Value {
    let Some((name, request)) = suggest.as_object().and_then(|o| o.iter().next()) else {
        return json!({ "suggest": {} });
    };
    let prefix = request["prefix"].as_str().unwrap_or_default().to_lowercase();
    let field = request["completion"]["field"].as_str().unwrap_or("suggest");
    let size = request["completion"]["size"].as_u64().unwrap_or(5) as usize;
    let skip_duplicates = request["completion"]["skip_duplicates"].as_bool().unwrap_or(false);

    let mut candidates: Vec<(String, u64)> = index
        .documents
        .values()
        .filter_map(|document| document[field].as_array())
        .flatten()
        .filter_map(|entry| {
            let input = entry["input"].as_str()?;
            input
                .to_lowercase()
                .starts_with(&prefix)
                .then(|| (input.to_string(), entry["weight"].as_u64().unwrap_or(1)))
        })
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    let mut options: Vec<Value> = Vec::new();
    for (text, weight) in candidates {
        if skip_duplicates && options.iter().any(|o| o["text"] == text.as_str()) {
            continue;
        }
        options.push(json!({ "text": text, "_score": weight as f64 }));
        if options.len() == size {
            break;
        }
    }

    json!({
        "suggest": {
            name.as_str(): [{ "text": prefix, "offset": 0, "options": options }]
        }
    })
}

/// A service over `provider` with default index names and small batches so
/// chunking and scrolling paths are exercised.
pub fn service_over(provider: &InMemoryProvider) -> SearchService {
    SearchService::with_config(
        Box::new(provider.clone()),
        IndexConfig::default(),
        SearchServiceConfig::default()
            .with_bulk_chunk_size(2)
            .with_scroll_batch_size(2),
    )
}

/// A fixed instant `minutes` after a base time.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).single().unwrap_or_default()
        + chrono::Duration::minutes(minutes)
}

pub fn category(id: &str, name: &str) -> PostCategory {
    PostCategory {
        id: id.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase(),
    }
}

pub fn post(id: &str, title: &str, price: i64, created_at: DateTime<Utc>) -> Post {
    Post {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        price: BigDecimal::from(price),
        status: Some(PostStatus::Active),
        view_count: Some(0),
        category_id: None,
        location_id: None,
        zone_id: None,
        category: None,
        location: None,
        zone: None,
        images: Vec::new(),
        user_id: "seller-1".to_string(),
        created_at,
        updated_at: created_at,
    }
}

pub fn in_category(mut post: Post, category: PostCategory) -> Post {
    post.category_id = Some(category.id.clone());
    post.category = Some(category);
    post
}

pub fn with_status(mut post: Post, status: PostStatus) -> Post {
    post.status = Some(status);
    post
}
