//! Wikipedia page fetcher.
//!
//! Issues a single `action=query` request against the MediaWiki API and
//! extracts the page title, full plaintext extract, and canonical URL.
//! Missing pages are reported as `Ok(None)`; everything else that goes
//! wrong is logged and returned as a [`ServiceError`].

use std::time::Duration;

use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::config::WikipediaConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::ArticleData;

pub struct WikipediaClient {
    http: reqwest::Client,
    api_url: String,
    user_agent: String,
}

impl WikipediaClient {
    pub fn new(config: &WikipediaConfig) -> ServiceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Fetch one page by title. Returns `Ok(None)` when Wikipedia has no such page.
    pub async fn fetch(&self, title: &str) -> ServiceResult<Option<ArticleData>> {
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("titles", title),
            ("prop", "extracts|info"),
            ("explaintext", "true"),
            ("inprop", "url"),
        ];

        let response = self
            .http
            .get(&self.api_url)
            .header(USER_AGENT, &self.user_agent)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(title, error = %e, "wikipedia request failed");
                ServiceError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(title, %status, "wikipedia returned an error status");
            return Err(ServiceError::Transport(format!(
                "Wikipedia API error {}: {}",
                status, body
            )));
        }

        let payload: Value = response.json().await.map_err(|e| {
            tracing::error!(title, error = %e, "wikipedia response was not JSON");
            ServiceError::from(e)
        })?;

        parse_query_response(&payload, title)
    }
}

/// Extract page data from a `query.pages` response.
///
/// Only the first page entry is considered. A page carrying a `missing` key,
/// or an empty `pages` map, yields `Ok(None)`.
pub fn parse_query_response(
    payload: &Value,
    requested_title: &str,
) -> ServiceResult<Option<ArticleData>> {
    let pages = payload
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(Value::as_object)
        .ok_or_else(|| ServiceError::Internal("invalid Wikipedia response shape".to_string()))?;

    let page = match pages.values().next() {
        Some(page) => page,
        None => return Ok(None),
    };

    if page.get("missing").is_some() {
        return Ok(None);
    }

    let title = page
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(requested_title)
        .to_string();
    let extract = page
        .get("extract")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let url = page
        .get("fullurl")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(Some(ArticleData {
        title,
        extract,
        url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_existing_page() {
        let payload = json!({
            "batchcomplete": "",
            "query": {
                "pages": {
                    "2158": {
                        "pageid": 2158,
                        "ns": 0,
                        "title": "人工知能",
                        "extract": "人工知能とは…",
                        "fullurl": "https://ja.wikipedia.org/wiki/%E4%BA%BA%E5%B7%A5%E7%9F%A5%E8%83%BD"
                    }
                }
            }
        });
        let data = parse_query_response(&payload, "人工知能").unwrap().unwrap();
        assert_eq!(data.title, "人工知能");
        assert_eq!(data.extract, "人工知能とは…");
        assert!(data.url.starts_with("https://ja.wikipedia.org/wiki/"));
    }

    #[test]
    fn test_parse_missing_page() {
        let payload = json!({
            "query": {"pages": {"-1": {"ns": 0, "title": "Nope", "missing": ""}}}
        });
        assert_eq!(parse_query_response(&payload, "Nope").unwrap(), None);
    }

    #[test]
    fn test_parse_fallbacks() {
        let payload = json!({"query": {"pages": {"12": {"pageid": 12}}}});
        let data = parse_query_response(&payload, "Requested").unwrap().unwrap();
        assert_eq!(data.title, "Requested");
        assert_eq!(data.extract, "");
        assert_eq!(data.url, "");
    }

    #[test]
    fn test_parse_empty_pages_is_not_found() {
        let payload = json!({"query": {"pages": {}}});
        assert_eq!(parse_query_response(&payload, "x").unwrap(), None);
    }

    #[test]
    fn test_parse_bad_shape_is_internal() {
        let err = parse_query_response(&json!({"error": "nope"}), "x").unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
