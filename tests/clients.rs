//! Outbound clients against local fakes: the Wikipedia fetcher and the
//! HTTP vector index.

mod common;

use serde_json::json;

use wikisync::config::{ImportConfig, VectorServiceConfig, WikipediaConfig};
use wikisync::error::ServiceError;
use wikisync::formatter::{VectorAttributes, VectorRecord};
use wikisync::importer;
use wikisync::models::ArticleBody;
use wikisync::store::InMemoryStore;
use wikisync::vector_client::{HttpVectorIndex, VectorIndex};
use wikisync::wikipedia::WikipediaClient;

use common::*;

fn wikipedia_config(api_url: String) -> WikipediaConfig {
    WikipediaConfig {
        api_url,
        timeout_secs: 5,
        ..Default::default()
    }
}

fn vector_config(base_url: String) -> VectorServiceConfig {
    VectorServiceConfig {
        base_url,
        timeout_secs: 5,
    }
}

fn record(id: &str) -> VectorRecord {
    VectorRecord {
        id: id.to_string(),
        record_type: "node--article".to_string(),
        attributes: VectorAttributes {
            title: format!("Title {}", id),
            body: ArticleBody {
                value: "body".to_string(),
                format: "basic_html".to_string(),
            },
            created: "2024-01-01T00:00:00Z".to_string(),
            changed: "2024-01-02T00:00:00Z".to_string(),
            status: true,
        },
    }
}

// ─── Wikipedia ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_existing_article() {
    let (api_url, fake) = spawn_wikipedia().await;
    let client = WikipediaClient::new(&wikipedia_config(api_url)).unwrap();

    let data = client.fetch(AI_TITLE).await.unwrap().expect("page should exist");
    assert_eq!(data.title, AI_TITLE);
    assert_eq!(data.extract, AI_EXTRACT);
    assert_eq!(data.url, AI_URL);

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let params = &requests[0];
    assert_eq!(params["action"], "query");
    assert_eq!(params["format"], "json");
    assert_eq!(params["titles"], AI_TITLE);
    assert_eq!(params["prop"], "extracts|info");
    assert_eq!(params["explaintext"], "true");
    assert_eq!(params["inprop"], "url");
}

#[tokio::test]
async fn test_fetch_missing_article() {
    let (api_url, _fake) = spawn_wikipedia().await;
    let client = WikipediaClient::new(&wikipedia_config(api_url)).unwrap();

    let data = client.fetch("存在しない記事タイトル").await.unwrap();
    assert!(data.is_none());
}

#[tokio::test]
async fn test_fetch_unreachable_is_transport_error() {
    let client = WikipediaClient::new(&wikipedia_config(format!(
        "{}/w/api.php",
        unreachable_url()
    )))
    .unwrap();

    let err = client.fetch(AI_TITLE).await.unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_import_title_stores_article() {
    let (api_url, _fake) = spawn_wikipedia().await;
    let client = WikipediaClient::new(&wikipedia_config(api_url)).unwrap();
    let store = InMemoryStore::new();

    let article = importer::import_title(&store, &client, AI_TITLE, &ImportConfig::default())
        .await
        .unwrap();

    assert_eq!(article.title, AI_TITLE);
    assert!(article.status);
    assert_eq!(article.source_url.as_deref(), Some(AI_URL));
    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn test_import_missing_title_is_not_found() {
    let (api_url, _fake) = spawn_wikipedia().await;
    let client = WikipediaClient::new(&wikipedia_config(api_url)).unwrap();
    let store = InMemoryStore::new();

    let err = importer::import_title(&store, &client, "存在しない", &ImportConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)), "got {:?}", err);
    assert!(store.is_empty().unwrap());
}

// ─── Vector service ─────────────────────────────────────────────────

#[tokio::test]
async fn test_store_posts_full_batch() {
    let (base, fake) = spawn_vector_service().await;
    let index = HttpVectorIndex::new(&vector_config(base)).unwrap();

    let result = index
        .store_records(&[record("a"), record("b"), record("c")])
        .await
        .unwrap();

    assert_eq!(result["nodes_count"], 3);
    assert_eq!(fake.store_calls(), 1);
    let batches = fake.store_batches.lock().unwrap();
    let batch = batches[0].as_array().unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0]["id"], "a");
    assert_eq!(batch[0]["type"], "node--article");
    assert_eq!(batch[0]["attributes"]["body"]["format"], "basic_html");
}

#[tokio::test]
async fn test_store_empty_batch_makes_no_request() {
    let (base, fake) = spawn_vector_service().await;
    let index = HttpVectorIndex::new(&vector_config(base)).unwrap();

    let result = index.store_records(&[]).await.unwrap();

    assert_eq!(result["count"], 0);
    assert_eq!(fake.store_calls(), 0);
}

#[tokio::test]
async fn test_store_error_status_is_transport_error() {
    let (base, _fake) = spawn_failing_vector_service().await;
    let index = HttpVectorIndex::new(&vector_config(base)).unwrap();

    let err = index.store_records(&[record("a")]).await.unwrap_err();
    match err {
        ServiceError::Transport(msg) => assert!(msg.contains("500"), "got {}", msg),
        other => panic!("expected Transport, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_unreachable_is_transport_error() {
    let index = HttpVectorIndex::new(&vector_config(unreachable_url())).unwrap();
    let err = index.store_records(&[record("a")]).await.unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)));
}

#[tokio::test]
async fn test_search_forwards_parameters() {
    let (base, fake) = spawn_vector_service().await;
    fake.set_hits(vec![json!({
        "id": "u-1",
        "score": 0.87,
        "metadata": { "title": AI_TITLE, "drupal_id": "u-1", "type": "article" }
    })]);
    let index = HttpVectorIndex::new(&vector_config(base)).unwrap();

    let response = index.search("機械学習", 5, false).await.unwrap();

    let body = response.as_value();
    assert_eq!(body["query"], "機械学習");
    assert_eq!(body["total_results"], 1);
    assert_eq!(response.hits()[0]["id"], "u-1");
    assert_eq!(response.hits()[0]["score"], 0.87);

    let searches = fake.searches.lock().unwrap();
    assert_eq!(searches[0]["query"], "機械学習");
    assert_eq!(searches[0]["top_k"], "5");
    assert_eq!(searches[0]["include_metadata"], "false");
}

#[tokio::test]
async fn test_search_blank_query_makes_no_request() {
    let (base, fake) = spawn_vector_service().await;
    let index = HttpVectorIndex::new(&vector_config(base)).unwrap();

    let err = index.search("", 10, true).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(fake.search_calls(), 0);
}

#[tokio::test]
async fn test_health() {
    let (base, _fake) = spawn_vector_service().await;
    let index = HttpVectorIndex::new(&vector_config(base)).unwrap();
    let body = index.health().await.unwrap();
    assert_eq!(body["status"], "healthy");
}
