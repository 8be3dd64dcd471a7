use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Articles (one row per imported page)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            nid INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            node_type TEXT NOT NULL DEFAULT 'article',
            title TEXT NOT NULL,
            body_value TEXT,
            body_format TEXT,
            source_url TEXT,
            status INTEGER NOT NULL DEFAULT 1,
            uid INTEGER NOT NULL,
            created INTEGER NOT NULL,
            changed INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Sync selects by type + status, newest changed first
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_articles_type_status ON articles(node_type, status)",
    )
    .execute(&pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_changed ON articles(changed DESC)")
        .execute(&pool)
        .await?;

    pool.close().await;
    tracing::info!(path = %config.db.path.display(), "database schema up to date");
    Ok(())
}
