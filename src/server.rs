//! HTTP API for syncing articles to the vector index and searching it.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/pinecone/sync-nodes` | Push published articles to the vector service |
//! | `GET`  | `/api/pinecone/search` | Search, parameters in the query string |
//! | `POST` | `/api/pinecone/search` | Search, parameters in a JSON body |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "success": false, "message": "Search query is required", "error": "bad_request" }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `service_unavailable` (500, the vector service could not be reached or
//! answered with an error), `internal` (500, local failure).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db;
use crate::error::ServiceError;
use crate::migrate;
use crate::search::{search_nodes, SearchBody, SearchQueryParams, SearchRequest};
use crate::store::{ArticleStore, SqliteStore};
use crate::sync::{sync_nodes, SyncOutcome, SyncRequest};
use crate::vector_client::{HttpVectorIndex, VectorIndex};

/// Shared state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ArticleStore>,
    pub index: Arc<dyn VectorIndex>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ArticleStore>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            index,
        }
    }
}

/// Builds the router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/pinecone/sync-nodes", post(handle_sync_nodes))
        .route(
            "/api/pinecone/search",
            get(handle_search_get).post(handle_search_post),
        )
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the API on an already-bound listener until the process stops.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Starts the server for `wikisync serve`.
///
/// Opens (and migrates) the SQLite store, builds the HTTP vector client, and
/// binds to `[server].bind`.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    migrate::run_migrations(config).await?;
    let pool = db::connect(config).await?;
    let store: Arc<dyn ArticleStore> = Arc::new(SqliteStore::new(pool));
    let index: Arc<dyn VectorIndex> = Arc::new(HttpVectorIndex::new(&config.vector_service)?);

    let bind_addr = config.server.bind.clone();
    let state = AppState::new(config.clone(), store, index);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        bind = %bind_addr,
        vector_service = %config.vector_service.base_url,
        "server listening"
    );
    println!("wikisync server listening on http://{}", bind_addr);

    serve(listener, state).await
}

// ============ Error response ============

/// JSON error body shared by every endpoint.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    error: &'static str,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.message,
            error: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

/// Maps a [`ServiceError`] onto a response, logging it first.
///
/// `action` names the failed operation in the message (e.g. `"sync nodes"`).
fn service_error(action: &str, err: ServiceError) -> AppError {
    let code = err.code();
    match err {
        ServiceError::Validation(msg) => {
            tracing::warn!(action, message = %msg, "rejected request");
            bad_request(msg)
        }
        ServiceError::NotFound(msg) => AppError {
            status: StatusCode::NOT_FOUND,
            code,
            message: msg,
        },
        ServiceError::Transport(msg) => {
            tracing::error!(action, error = %msg, "vector service unavailable");
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code,
                message: format!("Failed to {}: vector service unavailable ({})", action, msg),
            }
        }
        ServiceError::Internal(msg) => {
            tracing::error!(action, error = %msg, "internal error");
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code,
                message: format!("Error while trying to {}: {}", action, msg),
            }
        }
    }
}

/// Parses an optional JSON body; an empty body yields the type's default.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| bad_request(format!("Invalid JSON body: {}", e)))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/pinecone/sync-nodes ============

/// Handler for `POST /api/pinecone/sync-nodes`.
///
/// Body: `{node_type?, limit?, node_ids?}`; an empty body uses all defaults.
async fn handle_sync_nodes(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let raw: Value = parse_body(&body)?;
    let request = SyncRequest::from_json(&raw).map_err(|e| service_error("sync nodes", e))?;

    let outcome = sync_nodes(state.store.as_ref(), state.index.as_ref(), &request)
        .await
        .map_err(|e| service_error("sync nodes", e))?;

    let body = match outcome {
        SyncOutcome::Empty => json!({
            "success": true,
            "message": "No nodes found to sync",
            "count": 0,
        }),
        SyncOutcome::Synced { processed, result } => json!({
            "success": true,
            "message": format!("Successfully synced {} nodes to Pinecone", processed),
            "drupal_nodes_processed": processed,
            "pinecone_result": result,
        }),
    };

    Ok(Json(body))
}

// ============ GET|POST /api/pinecone/search ============

/// Handler for `GET /api/pinecone/search?query=&top_k=&include_metadata=`.
async fn handle_search_get(
    State(state): State<AppState>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<Value>, AppError> {
    run_search_request(&state, params.into_request()).await
}

/// Handler for `POST /api/pinecone/search` with a `{query, top_k?, include_metadata?}` body.
async fn handle_search_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let body: SearchBody = parse_body(&body)?;
    run_search_request(&state, body.into_request()).await
}

async fn run_search_request(
    state: &AppState,
    request: SearchRequest,
) -> Result<Json<Value>, AppError> {
    let response = search_nodes(
        state.store.as_ref(),
        state.index.as_ref(),
        &state.config.server.public_url,
        &request,
    )
    .await
    .map_err(|e| service_error("search", e))?;

    Ok(Json(json!({
        "success": true,
        "search_query": request.query,
        "search_results": response,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_internal_are_distinct() {
        let t = service_error("search", ServiceError::Transport("refused".into()));
        let i = service_error("search", ServiceError::Internal("boom".into()));
        assert_eq!(t.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(i.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(t.code, i.code);
        assert!(t.message.contains("vector service unavailable"));
    }

    #[test]
    fn test_validation_is_bad_request() {
        let e = service_error(
            "search",
            ServiceError::Validation("Search query is required".into()),
        );
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.message, "Search query is required");
    }

    #[test]
    fn test_parse_body_empty_is_default() {
        let v: Value = parse_body(&Bytes::from_static(b"  \n")).unwrap();
        assert_eq!(v, Value::Null);
        let err = parse_body::<Value>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
