//! Storage abstraction for articles.
//!
//! The [`ArticleStore`] trait is the narrow contract the importer, sync, and
//! search components need from persistence: insert one article, select
//! articles for indexing, and resolve a single article by its uuid. Two
//! implementations ship with the crate:
//!
//! - [`SqliteStore`]: the sqlx-backed store used by the CLI and server.
//! - [`InMemoryStore`]: a `HashMap` store for tests.
//!
//! Implementations must be `Send + Sync` so they can sit behind an `Arc` in
//! the server state.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Article, ArticleQuery, NewArticle};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Abstract article storage.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create_article`](ArticleStore::create_article) | Persist a new article, assigning ids and timestamps |
/// | [`query_articles`](ArticleStore::query_articles) | Select articles for indexing |
/// | [`find_by_uuid`](ArticleStore::find_by_uuid) | Resolve a search hit to its local article |
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article and return it as stored.
    async fn create_article(&self, article: &NewArticle) -> Result<Article>;

    /// Return articles matching `query`, newest `changed` first (ties by
    /// `nid` descending), capped at `query.limit` when set.
    async fn query_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>>;

    /// Look up one article by its uuid.
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Article>>;
}
