//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate. Every call used here speaks the same REST
//! protocol as Elasticsearch 7, so the provider works against either engine.

use async_trait::async_trait;
use opensearch::{
    cat::CatIndicesParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesRefreshParts},
    params::Conflicts,
    BulkParts, ClearScrollParts, CountParts, DeleteByQueryParts, DeleteParts, GetParts, IndexParts,
    OpenSearch, ScrollParts, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{
    BatchOperationResult, BatchOperationSummary, IndexDocumentRequest, IndexInfo, RawHit,
    ScrollPage,
};

/// Error type the engine reports when creating an index that already exists.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// OpenSearch provider implementation.
///
/// # Example
///
/// ```ignore
/// let provider = OpenSearchProvider::new("http://localhost:9200").await?;
/// provider.ping().await?;
/// provider.index_document("posts", Some("post-1"), &json!({ "title": "Sofa" })).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    url: String,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// No request is sent; call [`SearchIndexProvider::ping`] to check connectivity.
    ///
    /// # Arguments
    ///
    /// * `url` - The engine URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or transport setup fails
    pub async fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// The engine URL this provider talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read a JSON body from a successful response, or turn a failed one into
    /// an error built by `to_error`.
    async fn read_json(
        response: Response,
        operation: &str,
        to_error: fn(String) -> SearchIndexError,
    ) -> Result<Value, SearchIndexError> {
        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, operation, "Request failed");
            return Err(to_error(format!(
                "{} failed with status {}: {}",
                operation, status, error_body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(format!("{} response: {}", operation, e)))
    }

    /// Parse a search or scroll response into a scroll page.
    fn scroll_page(body: &Value) -> ScrollPage {
        let hits = body["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .map(|hit| RawHit {
                        document_id: hit["_id"].as_str().unwrap_or_default().to_string(),
                        source: hit["_source"].clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        ScrollPage {
            scroll_id: body["_scroll_id"].as_str().map(str::to_string),
            hits,
        }
    }

    /// Turn the `items` array of a bulk response into per-document results.
    fn bulk_results(documents: &[IndexDocumentRequest], body: &Value) -> Vec<BatchOperationResult> {
        let items = body["items"].as_array().cloned().unwrap_or_default();

        documents
            .iter()
            .enumerate()
            .map(|(position, document)| {
                let item = items.get(position).map(|item| &item["index"]);
                match item {
                    Some(item) if item.get("error").is_none() => {
                        BatchOperationResult::succeeded(&document.document_id)
                    }
                    Some(item) => BatchOperationResult::failed(
                        &document.document_id,
                        SearchIndexError::index(item["error"].to_string()),
                    ),
                    None => BatchOperationResult::failed(
                        &document.document_id,
                        SearchIndexError::parse("Bulk response is missing this item"),
                    ),
                }
            })
            .collect()
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping to {} returned status {}",
                self.url, status
            )));
        }

        debug!(url = %self.url, "Ping succeeded");
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::unknown(format!(
                "Index exists check for {} returned status {}",
                index, status
            ))),
        }
    }

    async fn create_index(&self, index: &str, settings: &Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(settings)
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // Another process created it between our exists check and now
            if error_body.contains(ALREADY_EXISTS_ERROR) {
                debug!(index = %index, "Index already exists");
                return Ok(());
            }
            error!(status = %status, body = %error_body, "Create index request failed");
            return Err(SearchIndexError::index_creation(format!(
                "Creating index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index created");
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        Self::read_json(response, "Delete index", SearchIndexError::DeleteError).await?;

        info!(index = %index, "Index deleted");
        Ok(())
    }

    async fn list_indices(&self, pattern: &str) -> Result<Vec<IndexInfo>, SearchIndexError> {
        let response = self
            .client
            .cat()
            .indices(CatIndicesParts::Index(&[pattern]))
            .format("json")
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        if response.status_code().as_u16() == 404 {
            return Ok(Vec::new());
        }

        let body = Self::read_json(response, "List indices", SearchIndexError::SearchError).await?;

        Ok(body
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| {
                        let name = row["index"].as_str()?.to_string();
                        // The cat API reports counts as strings
                        let docs_count = row["docs.count"]
                            .as_str()
                            .and_then(|c| c.parse().ok())
                            .or_else(|| row["docs.count"].as_u64())
                            .unwrap_or(0);
                        Some(IndexInfo { name, docs_count })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn index_document(
        &self,
        index: &str,
        document_id: Option<&str>,
        body: &Value,
    ) -> Result<(), SearchIndexError> {
        let parts = match document_id {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };

        let response = self
            .client
            .index(parts)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        Self::read_json(response, "Index document", SearchIndexError::IndexError).await?;

        debug!(index = %index, doc_id = ?document_id, "Document indexed");
        Ok(())
    }

    async fn get_document(
        &self,
        index: &str,
        document_id: &str,
    ) -> Result<Option<Value>, SearchIndexError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, document_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        if response.status_code().as_u16() == 404 {
            return Ok(None);
        }

        let body = Self::read_json(response, "Get document", SearchIndexError::SearchError).await?;
        Ok(body.get("_source").cloned())
    }

    async fn delete_document(
        &self,
        index: &str,
        document_id: &str,
    ) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, document_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        if response.status_code().as_u16() == 404 {
            return Err(SearchIndexError::document_not_found(index, document_id));
        }

        Self::read_json(response, "Delete document", SearchIndexError::DeleteError).await?;

        debug!(index = %index, doc_id = %document_id, "Document deleted");
        Ok(())
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[IndexDocumentRequest],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            body.push(json!({ "index": { "_id": document.document_id } }).into());
            body.push(document.body.clone().into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_index(e.to_string()))?;

        let response_body =
            Self::read_json(response, "Bulk index", SearchIndexError::BulkIndexError).await?;

        let summary =
            BatchOperationSummary::from_results(Self::bulk_results(documents, &response_body));

        debug!(
            index = %index,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );
        Ok(summary)
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        Self::read_json(response, "Search", SearchIndexError::SearchError).await
    }

    async fn count(&self, index: &str) -> Result<u64, SearchIndexError> {
        let response = self
            .client
            .count(CountParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        let body = Self::read_json(response, "Count", SearchIndexError::SearchError).await?;
        body["count"]
            .as_u64()
            .ok_or_else(|| SearchIndexError::parse("Count response has no count"))
    }

    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<u64, SearchIndexError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[index]))
            .conflicts(Conflicts::Proceed)
            .refresh(true)
            .body(json!({ "query": query }))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let body = Self::read_json(response, "Delete by query", SearchIndexError::DeleteError).await?;
        let deleted = body["deleted"].as_u64().unwrap_or(0);

        info!(index = %index, deleted, "Deleted documents by query");
        Ok(deleted)
    }

    async fn refresh(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        Self::read_json(response, "Refresh", SearchIndexError::IndexError).await?;
        Ok(())
    }

    async fn open_scroll(
        &self,
        index: &str,
        body: &Value,
        keep_alive: &str,
    ) -> Result<ScrollPage, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .scroll(keep_alive)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        let body = Self::read_json(response, "Open scroll", SearchIndexError::SearchError).await?;
        Ok(Self::scroll_page(&body))
    }

    async fn continue_scroll(
        &self,
        scroll_id: &str,
        keep_alive: &str,
    ) -> Result<ScrollPage, SearchIndexError> {
        let response = self
            .client
            .scroll(ScrollParts::None)
            .body(json!({ "scroll": keep_alive, "scroll_id": scroll_id }))
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        let body = Self::read_json(response, "Scroll", SearchIndexError::SearchError).await?;
        Ok(Self::scroll_page(&body))
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .clear_scroll(ClearScrollParts::None)
            .body(json!({ "scroll_id": [scroll_id] }))
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        Self::read_json(response, "Clear scroll", SearchIndexError::SearchError).await?;
        Ok(())
    }
}
