//! Client for the external vector-indexing service.
//!
//! The service owns embedding, storage, and ranking; this crate only posts
//! formatted records to it and forwards search queries. Callers depend on the
//! [`VectorIndex`] trait so the sync and search endpoints can be exercised
//! without a running service.
//!
//! # Endpoints consumed
//!
//! | Method | Path | Used by |
//! |--------|------|---------|
//! | `POST` | `/store-nodes` | [`VectorIndex::store_records`] |
//! | `GET`  | `/search` | [`VectorIndex::search`] |
//! | `GET`  | `/health` | [`VectorIndex::health`] |
//!
//! Every call is a single request with the configured timeout. Transport
//! failures and non-success statuses are logged and surface as
//! [`ServiceError::Transport`]; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::VectorServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::formatter::VectorRecord;
use crate::models::NodeSummary;

/// Search response body exactly as the service returned it.
///
/// Only `drupal_node` is ever added to a hit; every other field, including
/// ones this crate does not know about, is serialized back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResponse {
    body: Value,
}

impl SearchResponse {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    pub fn as_value(&self) -> &Value {
        &self.body
    }

    pub fn into_value(self) -> Value {
        self.body
    }

    /// The `results` array, or an empty slice when the body has none.
    pub fn hits(&self) -> &[Value] {
        self.body
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn hits_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.body.get_mut("results").and_then(Value::as_array_mut)
    }
}

/// The id of a hit, when it is a string (the article uuid).
pub fn hit_id(hit: &Value) -> Option<&str> {
    hit.get("id").and_then(Value::as_str)
}

/// Attach a local article summary to a hit object. Non-object hits are left alone.
pub fn attach_node(hit: &mut Value, node: &NodeSummary) -> ServiceResult<()> {
    if let Some(obj) = hit.as_object_mut() {
        let value = serde_json::to_value(node).map_err(|e| {
            ServiceError::Internal(format!("failed to encode article summary: {}", e))
        })?;
        obj.insert("drupal_node".to_string(), value);
    }
    Ok(())
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Post a batch of records. The service's response body is returned as-is.
    async fn store_records(&self, records: &[VectorRecord]) -> ServiceResult<Value>;

    /// Run a similarity search.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        include_metadata: bool,
    ) -> ServiceResult<SearchResponse>;

    /// Ask the service whether it is up.
    async fn health(&self) -> ServiceResult<Value>;
}

/// Result returned by [`VectorIndex::store_records`] for an empty batch.
pub fn empty_store_result() -> Value {
    serde_json::json!({ "message": "No nodes provided", "count": 0 })
}

/// [`VectorIndex`] over HTTP, using one pooled `reqwest::Client`.
pub struct HttpVectorIndex {
    http: reqwest::Client,
    base_url: String,
}

impl HttpVectorIndex {
    pub fn new(config: &VectorServiceConfig) -> ServiceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Check the status and decode the body, logging every failure.
async fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    sent: Result<reqwest::Response, reqwest::Error>,
) -> ServiceResult<T> {
    let response = sent.map_err(|e| {
        tracing::error!(operation, error = %e, "vector service request failed");
        ServiceError::from(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            operation,
            %status,
            body = %body,
            "vector service returned an error status"
        );
        return Err(ServiceError::Transport(format!(
            "vector service error {}: {}",
            status, body
        )));
    }

    response.json::<T>().await.map_err(|e| {
        tracing::error!(operation, error = %e, "vector service response could not be decoded");
        ServiceError::from(e)
    })
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn store_records(&self, records: &[VectorRecord]) -> ServiceResult<Value> {
        if records.is_empty() {
            return Ok(empty_store_result());
        }

        let sent = self
            .http
            .post(self.endpoint("store-nodes"))
            .json(records)
            .send()
            .await;
        let result: Value = read_json("store-nodes", sent).await?;

        tracing::info!(count = records.len(), "records sent to vector service");
        Ok(result)
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        include_metadata: bool,
    ) -> ServiceResult<SearchResponse> {
        if query.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }

        let top_k = top_k.to_string();
        let include_metadata = if include_metadata { "true" } else { "false" };
        let sent = self
            .http
            .get(self.endpoint("search"))
            .query(&[
                ("query", query),
                ("top_k", top_k.as_str()),
                ("include_metadata", include_metadata),
            ])
            .send()
            .await;

        read_json("search", sent).await
    }

    async fn health(&self) -> ServiceResult<Value> {
        let sent = self.http.get(self.endpoint("health")).send().await;
        read_json("health", sent).await
    }
}
