//! Wikipedia article import.
//!
//! `wikisync import <title>` fetches one page and stores it as a published
//! article. The command is fire-and-forget: a missing page or a failed
//! request is reported and nothing is written.

use anyhow::Result;

use crate::config::{Config, ImportConfig};
use crate::db;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Article, ArticleBody, ArticleData, NewArticle};
use crate::store::{ArticleStore, SqliteStore};
use crate::wikipedia::WikipediaClient;

/// Persist fetched page data as one published article owned by `import.owner_id`.
pub async fn create_article(
    store: &dyn ArticleStore,
    data: &ArticleData,
    import: &ImportConfig,
) -> ServiceResult<Article> {
    let new_article = NewArticle {
        node_type: import.node_type.clone(),
        title: data.title.clone(),
        body: Some(ArticleBody {
            value: data.extract.clone(),
            format: import.body_format.clone(),
        }),
        source_url: if data.url.is_empty() {
            None
        } else {
            Some(data.url.clone())
        },
        status: true,
        uid: import.owner_id,
    };

    match store.create_article(&new_article).await {
        Ok(article) => {
            tracing::info!(
                nid = article.nid,
                uuid = %article.uuid,
                title = %article.title,
                "created article from Wikipedia"
            );
            Ok(article)
        }
        Err(e) => {
            tracing::error!(title = %data.title, error = %e, "failed to create article");
            Err(ServiceError::internal(e))
        }
    }
}

/// Fetch `title` from Wikipedia and store it.
///
/// A page the API reports as missing is [`ServiceError::NotFound`] and
/// nothing is written.
pub async fn import_title(
    store: &dyn ArticleStore,
    client: &WikipediaClient,
    title: &str,
    import: &ImportConfig,
) -> ServiceResult<Article> {
    let data = match client.fetch(title).await? {
        Some(data) => data,
        None => {
            tracing::warn!(title, "Wikipedia article not found");
            return Err(ServiceError::NotFound(title.to_string()));
        }
    };

    create_article(store, &data, import).await
}

/// CLI entry point for `wikisync import <title>`.
pub async fn run_import(config: &Config, title: &str) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        eprintln!("Error: article title must not be empty");
        std::process::exit(2);
    }

    let client = WikipediaClient::new(&config.wikipedia)?;
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    println!("Fetching Wikipedia article: {}", title);
    let outcome = import_title(&store, &client, title, &config.import).await;
    store.close().await;

    match outcome {
        Ok(article) => {
            println!("Created article {} (nid {})", article.title, article.nid);
            println!("  uuid:       {}", article.uuid);
            if let Some(ref url) = article.source_url {
                println!("  source_url: {}", url);
            }
            println!("ok");
            Ok(())
        }
        Err(ServiceError::NotFound(_)) => {
            eprintln!("Article not found on Wikipedia: {}", title);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error importing '{}': {}", title, e);
            std::process::exit(1);
        }
    }
}
