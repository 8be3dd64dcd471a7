use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
    #[serde(default)]
    pub vector_service: VectorServiceConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WikipediaConfig {
    #[serde(default = "default_wikipedia_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: default_wikipedia_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_wikipedia_api_url() -> String {
    "https://ja.wikipedia.org/w/api.php".to_string()
}
fn default_user_agent() -> String {
    format!("wikisync/{}", env!("CARGO_PKG_VERSION"))
}

/// Connection settings for the external vector-indexing service.
#[derive(Debug, Deserialize, Clone)]
pub struct VectorServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VectorServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    #[serde(default = "default_owner_id")]
    pub owner_id: i64,
    #[serde(default = "default_node_type")]
    pub node_type: String,
    #[serde(default = "default_body_format")]
    pub body_format: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            owner_id: default_owner_id(),
            node_type: default_node_type(),
            body_format: default_body_format(),
        }
    }
}

fn default_owner_id() -> i64 {
    1
}
fn default_node_type() -> String {
    "article".to_string()
}
fn default_body_format() -> String {
    crate::models::DEFAULT_BODY_FORMAT.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Base URL used to build canonical article links in search results.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: default_public_url(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_public_url() -> String {
    "http://localhost".to_string()
}

impl Config {
    /// A config with every section at its default and the database under `./data`.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/wikisync.sqlite"),
            },
            wikipedia: WikipediaConfig::default(),
            vector_service: VectorServiceConfig::default(),
            import: ImportConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate vector service
    let base_url = config.vector_service.base_url.trim();
    if base_url.is_empty() {
        anyhow::bail!("vector_service.base_url must not be empty");
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        anyhow::bail!(
            "vector_service.base_url must be an http(s) URL, got '{}'",
            base_url
        );
    }
    if config.vector_service.timeout_secs == 0 {
        anyhow::bail!("vector_service.timeout_secs must be > 0");
    }

    // Validate wikipedia
    if config.wikipedia.api_url.trim().is_empty() {
        anyhow::bail!("wikipedia.api_url must not be empty");
    }
    if config.wikipedia.timeout_secs == 0 {
        anyhow::bail!("wikipedia.timeout_secs must be > 0");
    }

    // Validate import
    if config.import.node_type.trim().is_empty() {
        anyhow::bail!("import.node_type must not be empty");
    }

    Ok(())
}
