//! SQLite-backed [`ArticleStore`] implementation.
//!
//! Maps each store operation onto the `articles` table created by
//! [`run_migrations`](crate::migrate::run_migrations).

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{Article, ArticleBody, ArticleQuery, NewArticle, DEFAULT_BODY_FORMAT};

use super::ArticleStore;

const ARTICLE_COLUMNS: &str = "nid, uuid, node_type, title, body_value, body_format, \
    source_url, status, uid, created, changed";

/// SQLite implementation of the [`ArticleStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_article(row: &SqliteRow) -> Article {
    let body_value: Option<String> = row.get("body_value");
    let body_format: Option<String> = row.get("body_format");
    let status: i64 = row.get("status");

    Article {
        nid: row.get("nid"),
        uuid: row.get("uuid"),
        node_type: row.get("node_type"),
        title: row.get("title"),
        body: body_value.map(|value| ArticleBody {
            value,
            format: body_format.unwrap_or_else(|| DEFAULT_BODY_FORMAT.to_string()),
        }),
        source_url: row.get("source_url"),
        status: status != 0,
        uid: row.get("uid"),
        created: row.get("created"),
        changed: row.get("changed"),
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        let uuid = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO articles (uuid, node_type, title, body_value, body_format,
                                  source_url, status, uid, created, changed)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&uuid)
        .bind(&article.node_type)
        .bind(&article.title)
        .bind(article.body.as_ref().map(|b| b.value.as_str()))
        .bind(article.body.as_ref().map(|b| b.format.as_str()))
        .bind(&article.source_url)
        .bind(article.status as i64)
        .bind(article.uid)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert article '{}'", article.title))?;

        Ok(Article {
            nid: result.last_insert_rowid(),
            uuid,
            node_type: article.node_type.clone(),
            title: article.title.clone(),
            body: article.body.clone(),
            source_url: article.source_url.clone(),
            status: article.status,
            uid: article.uid,
            created: now,
            changed: now,
        })
    }

    async fn query_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        if matches!(&query.ids, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM articles WHERE node_type = ",
            ARTICLE_COLUMNS
        ));
        qb.push_bind(&query.node_type);

        if query.published_only {
            qb.push(" AND status = 1");
        }

        if let Some(ids) = &query.ids {
            qb.push(" AND nid IN (");
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }

        qb.push(" ORDER BY changed DESC, nid DESC");

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit as i64);
        }

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query articles")?;

        Ok(rows.iter().map(row_to_article).collect())
    }

    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE uuid = ?",
            ARTICLE_COLUMNS
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to load article {}", uuid))?;

        Ok(row.as_ref().map(row_to_article))
    }
}
