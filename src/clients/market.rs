//! Market quote client.
//!
//! Thin adapter over a JSON quote endpoint; only the market-disconnect
//! detector consumes it.

use crate::clients::MarketDataClient;
use crate::models::PriceSnapshot;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Configuration for the market-data client.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://financialmodelingprep.com/api/v3".to_string(),
            api_key: None,
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    symbol: String,
    price: f64,
    #[serde(default, rename = "changesPercentage")]
    changes_percentage: f64,
}

/// Client for a quote-by-symbol market data API.
pub struct HttpMarketDataClient {
    config: MarketConfig,
    http_client: reqwest::Client,
}

impl HttpMarketDataClient {
    pub fn new(config: MarketConfig) -> Result<Self> {
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
impl MarketDataClient for HttpMarketDataClient {
    async fn quote(&self, symbol: &str) -> Result<PriceSnapshot> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .context("No API key configured for the market-data client")?;

        let url = format!("{}/quote/{}", self.config.base_url, symbol);

        let response = self
            .http_client
            .get(&url)
            .query(&[("apikey", api_key)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!(
                        "Quote request timed out after {}s",
                        self.config.timeout_seconds
                    )
                } else {
                    anyhow::anyhow!("Failed to send quote request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow::anyhow!("Market API error {}", status));
        }

        let quotes: Vec<RawQuote> = response
            .json()
            .await
            .context("Failed to parse quote response")?;

        let raw = quotes
            .into_iter()
            .next()
            .with_context(|| format!("No quote returned for {}", symbol))?;

        debug!(symbol = %raw.symbol, price = raw.price, "fetched market quote");

        Ok(PriceSnapshot {
            symbol: raw.symbol,
            price: raw.price,
            change_percent: raw.changes_percentage,
            as_of: Utc::now(),
        })
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}
