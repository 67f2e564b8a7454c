//! Tavily-style web search client.

use crate::clients::{SearchClient, SearchDepth, SearchOptions};
use crate::models::SourceResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the search client.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
}

/// Client for the Tavily search API.
pub struct TavilySearchClient {
    config: SearchConfig,
    http_client: reqwest::Client,
}

impl TavilySearchClient {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl SearchClient for TavilySearchClient {
    async fn search(&self, query: &str, opts: &SearchOptions) -> Result<Vec<SourceResult>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .context("No API key configured for the search client")?;

        let url = format!("{}/search", self.config.base_url);

        let request = SearchRequest {
            api_key,
            query,
            max_results: opts.max_results,
            search_depth: match opts.depth {
                SearchDepth::Basic => "basic",
                SearchDepth::Advanced => "advanced",
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!(
                        "Search request timed out after {}s",
                        self.config.timeout_seconds
                    )
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to search API at {}", self.config.base_url)
                } else {
                    anyhow::anyhow!("Failed to send search request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Search API error {}: {}", status, body));
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .context("Failed to parse search response")?;

        let sources: Vec<SourceResult> = search_response
            .results
            .into_iter()
            .map(|r| SourceResult {
                title: r.title,
                url: r.url,
                snippet: r.content,
                score: r.score,
            })
            .collect();

        debug!(query, results = sources.len(), "web search finished");

        Ok(sources)
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}
