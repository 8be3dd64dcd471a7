//! Local stand-ins for Wikipedia and the vector service, served by axum on
//! an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const AI_TITLE: &str = "人工知能";
pub const AI_URL: &str = "https://ja.wikipedia.org/wiki/%E4%BA%BA%E5%B7%A5%E7%9F%A5%E8%83%BD";
pub const AI_EXTRACT: &str = "人工知能（じんこうちのう、英: artificial intelligence）とは…";

/// Serve `router` on 127.0.0.1 and return its base URL.
pub async fn spawn_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

// ─── Wikipedia ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeWikipedia {
    pub requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl FakeWikipedia {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn wikipedia_query(
    State(fake): State<FakeWikipedia>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let title = params.get("titles").cloned().unwrap_or_default();
    fake.requests.lock().unwrap().push(params);

    let page = if title == AI_TITLE {
        json!({
            "pageid": 2158,
            "ns": 0,
            "title": AI_TITLE,
            "extract": AI_EXTRACT,
            "fullurl": AI_URL,
        })
    } else {
        json!({ "ns": 0, "title": title, "missing": "" })
    };
    let key = if title == AI_TITLE { "2158" } else { "-1" };

    Json(json!({ "batchcomplete": "", "query": { "pages": { key: page } } }))
}

/// Start a fake MediaWiki API; returns the `api.php` URL and the recorder.
pub async fn spawn_wikipedia() -> (String, FakeWikipedia) {
    let fake = FakeWikipedia::default();
    let router = Router::new()
        .route("/w/api.php", get(wikipedia_query))
        .with_state(fake.clone());
    let base = spawn_router(router).await;
    (format!("{}/w/api.php", base), fake)
}

// ─── Vector service ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeVectorService {
    pub store_batches: Arc<Mutex<Vec<Value>>>,
    pub searches: Arc<Mutex<Vec<HashMap<String, String>>>>,
    /// Hits returned by `/search`.
    pub hits: Arc<Mutex<Vec<Value>>>,
    pub fail: bool,
}

impl FakeVectorService {
    pub fn store_calls(&self) -> usize {
        self.store_batches.lock().unwrap().len()
    }

    pub fn search_calls(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn set_hits(&self, hits: Vec<Value>) {
        *self.hits.lock().unwrap() = hits;
    }
}

async fn store_nodes(
    State(fake): State<FakeVectorService>,
    Json(batch): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let count = batch.as_array().map(|a| a.len()).unwrap_or(0);
    fake.store_batches.lock().unwrap().push(batch);
    if fake.fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Error storing in Pinecone: index not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "message": "Nodes successfully stored in Pinecone",
            "nodes_count": count,
            "result": { "success": true, "upserted_count": count },
        })),
    )
}

async fn search(
    State(fake): State<FakeVectorService>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let query = params.get("query").cloned().unwrap_or_default();
    fake.searches.lock().unwrap().push(params);
    if fake.fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Error searching Pinecone" })),
        );
    }
    let hits = fake.hits.lock().unwrap().clone();
    (
        StatusCode::OK,
        Json(json!({
            "query": query,
            "total_results": hits.len(),
            "results": hits,
        })),
    )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "drupal-pinecone-api" }))
}

async fn spawn_vector_service_with(fake: FakeVectorService) -> (String, FakeVectorService) {
    let router = Router::new()
        .route("/store-nodes", post(store_nodes))
        .route("/search", get(search))
        .route("/health", get(health))
        .with_state(fake.clone());
    (spawn_router(router).await, fake)
}

/// Start a fake vector service; returns its base URL and the recorder.
pub async fn spawn_vector_service() -> (String, FakeVectorService) {
    spawn_vector_service_with(FakeVectorService::default()).await
}

/// Like [`spawn_vector_service`] but every store/search answers 500.
pub async fn spawn_failing_vector_service() -> (String, FakeVectorService) {
    spawn_vector_service_with(FakeVectorService {
        fail: true,
        ..Default::default()
    })
    .await
}
