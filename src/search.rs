//! Search over the vector index, with local article enrichment.
//!
//! Queries are forwarded to the vector service unchanged; this module only
//! validates the query, clamps `top_k`, and (when metadata is requested)
//! attaches a summary of the matching local article to each hit. Hits whose
//! id has no published local article pass through untouched.
//!
//! The HTTP layer reads parameters from the query string for `GET` and from
//! a JSON body for `POST`. The two paths are disjoint: [`SearchQueryParams`]
//! and [`SearchBody`] each produce a [`SearchRequest`] on their own.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::db;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Article, NodeSummary};
use crate::store::{ArticleStore, SqliteStore};
use crate::vector_client::{attach_node, hit_id, HttpVectorIndex, SearchResponse, VectorIndex};

pub const DEFAULT_TOP_K: usize = 10;
pub const MAX_TOP_K: usize = 100;

/// Out-of-range or missing values fall back to [`DEFAULT_TOP_K`] rather than
/// being rejected.
pub fn clamp_top_k(top_k: Option<i64>) -> usize {
    match top_k {
        Some(k) if (1..=MAX_TOP_K as i64).contains(&k) => k as usize,
        _ => DEFAULT_TOP_K,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub include_metadata: bool,
}

impl SearchRequest {
    pub fn new(
        query: impl Into<String>,
        top_k: Option<i64>,
        include_metadata: Option<bool>,
    ) -> Self {
        Self {
            query: query.into(),
            top_k: clamp_top_k(top_k),
            include_metadata: include_metadata.unwrap_or(true),
        }
    }
}

/// `GET /api/pinecone/search` query-string parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQueryParams {
    pub query: Option<String>,
    pub top_k: Option<String>,
    pub include_metadata: Option<String>,
}

impl SearchQueryParams {
    pub fn into_request(self) -> SearchRequest {
        SearchRequest::new(
            self.query.unwrap_or_default(),
            self.top_k.and_then(|k| k.trim().parse().ok()),
            self.include_metadata.as_deref().and_then(parse_bool),
        )
    }
}

/// `POST /api/pinecone/search` JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    pub query: Option<String>,
    pub top_k: Option<Value>,
    pub include_metadata: Option<Value>,
}

impl SearchBody {
    pub fn into_request(self) -> SearchRequest {
        let top_k = self.top_k.as_ref().and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        let include_metadata = self.include_metadata.as_ref().and_then(|v| match v {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            Value::String(s) => parse_bool(s),
            _ => None,
        });
        SearchRequest::new(self.query.unwrap_or_default(), top_k, include_metadata)
    }
}

/// Loose boolean parsing for query-string flags.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Run a search and, when requested, enrich hits with local article summaries.
///
/// `public_url` is the base used for each summary's canonical URL.
pub async fn search_nodes(
    store: &dyn ArticleStore,
    index: &dyn VectorIndex,
    public_url: &str,
    request: &SearchRequest,
) -> ServiceResult<SearchResponse> {
    if request.query.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Search query is required".to_string(),
        ));
    }

    let mut response = index
        .search(&request.query, request.top_k, request.include_metadata)
        .await?;

    if request.include_metadata {
        if let Some(hits) = response.hits_mut() {
            for hit in hits.iter_mut() {
                let Some(id) = hit_id(hit).map(str::to_string) else {
                    continue;
                };
                let article = store.find_by_uuid(&id).await.map_err(|e| {
                    tracing::error!(id = %id, error = %e, "failed to resolve search hit");
                    ServiceError::internal(e)
                })?;
                if let Some(article) = article.filter(Article::is_viewable) {
                    attach_node(hit, &NodeSummary::from_article(&article, public_url))?;
                }
            }
        }
    }

    tracing::info!(
        query = %request.query,
        top_k = request.top_k,
        results = response.hits().len(),
        "search completed"
    );
    Ok(response)
}

/// CLI entry point for `wikisync search`.
///
/// A blank query is reported on stderr and exits non-zero without contacting
/// the vector service.
pub async fn run_search(config: &Config, request: SearchRequest) -> Result<()> {
    let index = HttpVectorIndex::new(&config.vector_service)?;
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    let outcome = search_nodes(&store, &index, &config.server.public_url, &request).await;
    store.close().await;
    let response = match outcome {
        Ok(response) => response,
        Err(ServiceError::Validation(msg)) => {
            eprintln!("Error: {}", msg);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    if response.hits().is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in response.hits().iter().enumerate() {
        let node = hit.get("drupal_node");
        let title = node
            .and_then(|n| n.get("title"))
            .or_else(|| hit.get("metadata").and_then(|m| m.get("title")))
            .and_then(Value::as_str)
            .unwrap_or("(untitled)");
        let score = hit
            .get("score")
            .and_then(Value::as_f64)
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "-".to_string());

        println!("{}. [{}] {}", i + 1, score, title);
        if let Some(node) = node {
            println!("    nid: {}", node["id"]);
            println!("    url: {}", node["url"].as_str().unwrap_or_default());
            println!("    changed: {}", node["changed"].as_str().unwrap_or_default());
        }
        match hit.get("id") {
            Some(Value::String(id)) => println!("    id: {}", id),
            Some(other) => println!("    id: {}", other),
            None => {}
        }
        println!();
    }

    Ok(())
}
