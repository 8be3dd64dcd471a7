//! # wikisync CLI
//!
//! The `wikisync` binary imports Wikipedia articles, pushes published
//! articles to the vector service, searches the index, and runs the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! wikisync --config ./config/wikisync.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wikisync init` | Create the SQLite database and run schema migrations |
//! | `wikisync import "<title>"` | Fetch a Wikipedia article and store it as a published article |
//! | `wikisync sync` | Send published articles to the vector service |
//! | `wikisync search "<query>"` | Search the vector index |
//! | `wikisync status` | Check that the vector service answers |
//! | `wikisync serve` | Start the HTTP API |
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wikisync::search::SearchRequest;
use wikisync::sync::{SyncRequest, DEFAULT_NODE_TYPE};
use wikisync::{config, importer, migrate, search, server, status, sync};

/// wikisync: import Wikipedia articles and keep a vector index in sync.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/wikisync.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "wikisync",
    about = "Import Wikipedia articles and sync them to a vector search service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/wikisync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the articles table. Running it
    /// more than once is safe.
    Init,

    /// Import a Wikipedia article by title.
    ///
    /// Fetches the page's plaintext extract and canonical URL and stores it
    /// as a published article. Nothing is written if the page does not exist.
    Import {
        /// Article title, e.g. `人工知能`.
        title: String,
    },

    /// Send published articles to the vector service.
    Sync {
        /// Article type to select.
        #[arg(long, default_value = DEFAULT_NODE_TYPE)]
        node_type: String,

        /// Maximum number of articles (newest changed first).
        #[arg(long)]
        limit: Option<u32>,

        /// Restrict to these article ids (repeatable).
        #[arg(long = "id")]
        ids: Vec<i64>,
    },

    /// Search the vector index.
    Search {
        /// The search query string.
        query: String,

        /// Number of results (1-100; anything else falls back to 10).
        #[arg(long)]
        top_k: Option<i64>,

        /// Skip metadata and local article enrichment.
        #[arg(long)]
        no_metadata: bool,
    },

    /// Check the vector service health endpoint.
    Status,

    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind` and serves `/api/pinecone/sync-nodes`,
    /// `/api/pinecone/search`, and `/health`.
    Serve,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { title } => {
            importer::run_import(&cfg, &title).await?;
        }
        Commands::Sync {
            node_type,
            limit,
            ids,
        } => {
            let request = SyncRequest {
                node_type,
                limit: limit.filter(|l| *l > 0),
                node_ids: if ids.is_empty() { None } else { Some(ids) },
            };
            sync::run_sync(&cfg, request).await?;
        }
        Commands::Search {
            query,
            top_k,
            no_metadata,
        } => {
            search::run_search(&cfg, SearchRequest::new(query, top_k, Some(!no_metadata))).await?;
        }
        Commands::Status => {
            status::run_status(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
