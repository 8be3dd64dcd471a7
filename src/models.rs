//! Core data models used throughout wikisync.
//!
//! These types represent the articles that flow from the Wikipedia importer
//! into the local store, and the query shape the sync endpoint uses to read
//! them back out.

use serde::{Deserialize, Serialize};

/// Markup format tag applied to article bodies when none is recorded.
pub const DEFAULT_BODY_FORMAT: &str = "basic_html";

/// Page data extracted from a Wikipedia query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleData {
    pub title: String,
    pub extract: String,
    pub url: String,
}

/// Formatted body text of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleBody {
    pub value: String,
    pub format: String,
}

/// Insert shape handed to the store. Ids and timestamps are assigned there.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub node_type: String,
    pub title: String,
    pub body: Option<ArticleBody>,
    pub source_url: Option<String>,
    pub status: bool,
    pub uid: i64,
}

/// An article as persisted in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Storage-assigned numeric id.
    pub nid: i64,
    /// Globally unique id; this is the id the vector index knows the article by.
    pub uuid: String,
    pub node_type: String,
    pub title: String,
    pub body: Option<ArticleBody>,
    pub source_url: Option<String>,
    /// Publish flag.
    pub status: bool,
    /// Owner id.
    pub uid: i64,
    /// Unix seconds.
    pub created: i64,
    /// Unix seconds.
    pub changed: i64,
}

impl Article {
    /// Articles are viewable exactly when they are published.
    pub fn is_viewable(&self) -> bool {
        self.status
    }
}

/// Selection used by the sync endpoint.
///
/// Results are always ordered by `changed` descending, with `nid` descending
/// as the tiebreak.
#[derive(Debug, Clone)]
pub struct ArticleQuery {
    pub node_type: String,
    pub published_only: bool,
    pub ids: Option<Vec<i64>>,
    pub limit: Option<u32>,
}

impl ArticleQuery {
    pub fn published(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            published_only: true,
            ids: None,
            limit: None,
        }
    }

    /// Whether `article` passes the type, status and id filters (not the limit).
    pub fn matches(&self, article: &Article) -> bool {
        if article.node_type != self.node_type {
            return false;
        }
        if self.published_only && !article.status {
            return false;
        }
        match &self.ids {
            Some(ids) => ids.contains(&article.nid),
            None => true,
        }
    }
}

/// Local article summary attached to a search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: i64,
    pub uuid: String,
    pub title: String,
    /// Canonical absolute URL of the article page.
    pub url: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub status: bool,
    pub created: String,
    pub changed: String,
}

impl NodeSummary {
    pub fn from_article(article: &Article, public_url: &str) -> Self {
        Self {
            id: article.nid,
            uuid: article.uuid.clone(),
            title: article.title.clone(),
            url: format!("{}/node/{}", public_url.trim_end_matches('/'), article.nid),
            node_type: article.node_type.clone(),
            status: article.status,
            created: format_ts_iso(article.created),
            changed: format_ts_iso(article.changed),
        }
    }
}

/// Format a unix timestamp as ISO-8601 UTC.
pub fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
