//! Article → vector index synchronization.
//!
//! Selects published articles (by type, optional id list, optional limit,
//! newest `changed` first), formats them as [`VectorRecord`]s, and posts
//! the whole batch to the vector service in one call. Used by
//! `POST /api/pinecone/sync-nodes` and `wikisync sync`.

use anyhow::Result;
use serde_json::Value;

use crate::config::Config;
use crate::db;
use crate::error::{ServiceError, ServiceResult};
use crate::formatter::{format_article, VectorRecord};
use crate::models::ArticleQuery;
use crate::store::{ArticleStore, SqliteStore};
use crate::vector_client::{HttpVectorIndex, VectorIndex};

pub const DEFAULT_NODE_TYPE: &str = "article";

/// Parameters of one sync run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRequest {
    pub node_type: String,
    pub limit: Option<u32>,
    pub node_ids: Option<Vec<i64>>,
}

impl Default for SyncRequest {
    fn default() -> Self {
        Self {
            node_type: DEFAULT_NODE_TYPE.to_string(),
            limit: None,
            node_ids: None,
        }
    }
}

impl SyncRequest {
    /// Parse a `{node_type?, limit?, node_ids?}` request body.
    ///
    /// `null` is treated as an empty object. `node_ids` must be an array whose
    /// elements are integers or numeric strings; an empty array means no id
    /// filter. A `limit` of zero or less
    /// means no cap.
    pub fn from_json(body: &Value) -> ServiceResult<Self> {
        let obj = match body {
            Value::Null => return Ok(Self::default()),
            Value::Object(obj) => obj,
            _ => {
                return Err(ServiceError::Validation(
                    "request body must be a JSON object".to_string(),
                ))
            }
        };

        let node_type = match obj.get("node_type") {
            None | Some(Value::Null) => DEFAULT_NODE_TYPE.to_string(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::String(_)) => DEFAULT_NODE_TYPE.to_string(),
            Some(_) => {
                return Err(ServiceError::Validation(
                    "node_type must be a string".to_string(),
                ))
            }
        };

        let limit = match obj.get("limit") {
            None | Some(Value::Null) => None,
            Some(v) => {
                let n = parse_integer(v).ok_or_else(|| {
                    ServiceError::Validation("limit must be an integer".to_string())
                })?;
                positive_limit(n)
            }
        };

        let node_ids = match obj.get("node_ids") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let ids = items
                    .iter()
                    .map(|item| {
                        parse_integer(item).ok_or_else(|| {
                            ServiceError::Validation(format!("invalid node id: {}", item))
                        })
                    })
                    .collect::<ServiceResult<Vec<i64>>>()?;
                if ids.is_empty() {
                    None
                } else {
                    Some(ids)
                }
            }
            Some(_) => {
                return Err(ServiceError::Validation(
                    "node_ids must be an array".to_string(),
                ))
            }
        };

        Ok(Self {
            node_type,
            limit,
            node_ids,
        })
    }

    fn to_query(&self) -> ArticleQuery {
        ArticleQuery {
            node_type: self.node_type.clone(),
            published_only: true,
            ids: self.node_ids.clone(),
            limit: self.limit,
        }
    }
}

/// Accepts JSON integers and strings holding an integer (ids arrive as strings).
fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn positive_limit(n: i64) -> Option<u32> {
    if n <= 0 {
        None
    } else {
        Some(u32::try_from(n).unwrap_or(u32::MAX))
    }
}

/// Result of a sync run.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// No article matched; the vector service was not called.
    Empty,
    /// `processed` articles were posted; `result` is the service's response body.
    Synced { processed: usize, result: Value },
}

pub async fn sync_nodes(
    store: &dyn ArticleStore,
    index: &dyn VectorIndex,
    request: &SyncRequest,
) -> ServiceResult<SyncOutcome> {
    let articles = store
        .query_articles(&request.to_query())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to load articles for sync");
            ServiceError::internal(e)
        })?;

    if articles.is_empty() {
        tracing::info!(node_type = %request.node_type, "no articles to sync");
        return Ok(SyncOutcome::Empty);
    }

    let records: Vec<VectorRecord> = articles.iter().map(format_article).collect();
    let result = index.store_records(&records).await?;

    tracing::info!(
        node_type = %request.node_type,
        processed = records.len(),
        "synced articles to vector service"
    );

    Ok(SyncOutcome::Synced {
        processed: records.len(),
        result,
    })
}

/// CLI entry point for `wikisync sync`.
pub async fn run_sync(config: &Config, request: SyncRequest) -> Result<()> {
    let index = HttpVectorIndex::new(&config.vector_service)?;
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    let outcome = sync_nodes(&store, &index, &request).await;
    store.close().await;

    println!("sync {}", request.node_type);
    match outcome? {
        SyncOutcome::Empty => {
            println!("  articles processed: 0");
            println!("  nothing to sync");
        }
        SyncOutcome::Synced { processed, result } => {
            println!("  articles processed: {}", processed);
            println!("  service result: {}", result);
        }
    }
    println!("ok");

    Ok(())
}
