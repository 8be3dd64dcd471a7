use anyhow::Result;

use crate::config::Config;
use crate::vector_client::{HttpVectorIndex, VectorIndex};

/// Print the configured external endpoints and whether the vector service answers.
pub async fn run_status(config: &Config) -> Result<()> {
    let index = HttpVectorIndex::new(&config.vector_service)?;

    let (status, healthy) = match index.health().await {
        Ok(body) => {
            let reported = body
                .get("status")
                .and_then(|s| s.as_str())
                .unwrap_or("ok")
                .to_string();
            (reported, true)
        }
        Err(e) => (e.to_string(), false),
    };

    println!("{:<16} {:<40} HEALTHY", "SERVICE", "URL");
    println!("{:<16} {:<40} {}", "vector", index.base_url(), healthy);
    println!("{:<16} {:<40} -", "wikipedia", config.wikipedia.api_url);
    println!();
    println!("vector service: {}", status);

    Ok(())
}
