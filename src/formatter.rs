//! Maps stored articles onto the JSON shape the vector-indexing service accepts.

use serde::{Deserialize, Serialize};

use crate::models::{format_ts_iso, Article, ArticleBody, DEFAULT_BODY_FORMAT};

/// Wire record posted to `{base}/store-nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// The article's uuid.
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub attributes: VectorAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorAttributes {
    pub title: String,
    pub body: ArticleBody,
    pub created: String,
    pub changed: String,
    pub status: bool,
}

pub fn format_article(article: &Article) -> VectorRecord {
    let body = article.body.clone().unwrap_or_else(|| ArticleBody {
        value: String::new(),
        format: DEFAULT_BODY_FORMAT.to_string(),
    });

    VectorRecord {
        id: article.uuid.clone(),
        record_type: format!("node--{}", article.node_type),
        attributes: VectorAttributes {
            title: article.title.clone(),
            body,
            created: format_ts_iso(article.created),
            changed: format_ts_iso(article.changed),
            status: article.status,
        },
    }
}
