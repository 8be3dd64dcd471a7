//! In-memory [`ArticleStore`] implementation for tests.
//!
//! Articles live in a `HashMap` keyed by `nid` behind a `std::sync::RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Article, ArticleQuery, NewArticle};

use super::ArticleStore;

struct Inner {
    articles: HashMap<i64, Article>,
    next_nid: i64,
}

pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                articles: HashMap::new(),
                next_nid: 1,
            }),
        }
    }

    /// Seed the store with fully-formed articles (explicit ids and timestamps).
    pub fn with_articles(articles: Vec<Article>) -> Self {
        let next_nid = articles.iter().map(|a| a.nid).max().unwrap_or(0) + 1;
        let articles = articles.into_iter().map(|a| (a.nid, a)).collect();
        Self {
            inner: RwLock::new(Inner { articles, next_nid }),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.read().map_err(poisoned)?.articles.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let now = chrono::Utc::now().timestamp();
        let stored = Article {
            nid: inner.next_nid,
            uuid: Uuid::new_v4().to_string(),
            node_type: article.node_type.clone(),
            title: article.title.clone(),
            body: article.body.clone(),
            source_url: article.source_url.clone(),
            status: article.status,
            uid: article.uid,
            created: now,
            changed: now,
        };
        inner.next_nid += 1;
        inner.articles.insert(stored.nid, stored.clone());
        Ok(stored)
    }

    async fn query_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut selected: Vec<Article> = inner
            .articles
            .values()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.changed.cmp(&a.changed).then(b.nid.cmp(&a.nid)));
        if let Some(limit) = query.limit {
            selected.truncate(limit as usize);
        }
        Ok(selected)
    }

    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Article>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.articles.values().find(|a| a.uuid == uuid).cloned())
    }
}
