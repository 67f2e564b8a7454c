//! Narrow collaborator interfaces the pipeline consumes.
//!
//! The host application owns the process-wide client lifecycles and injects
//! them here as trait objects. Every client is stateless and safe for
//! concurrent use by multiple in-flight pipeline invocations; the pipeline
//! never embeds a collaborator's wire format in its own data model.

pub mod completion;
pub mod market;
pub mod search;

use crate::models::{Event, PriceSnapshot, SourceResult};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use completion::OpenAiCompletionClient;
pub use market::HttpMarketDataClient;
pub use search::TavilySearchClient;

/// Filter for read-only event fetches from the persistent store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Free-text relevance match against headline and actors.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parsed JSON body of one completion, with observed call latency.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub body: serde_json::Value,
    pub latency_ms: u64,
}

/// Single LLM completion returning structured JSON.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_hint: &str,
    ) -> Result<CompletionResponse>;

    /// Whether the client has what it needs (API key, endpoint) to serve
    /// calls at all. Unconfigured clients fail every call.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Depth knob forwarded to the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

/// Options for one web search call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_results: usize,
    pub depth: SearchDepth,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            depth: SearchDepth::Advanced,
        }
    }
}

/// External full-text source search.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, opts: &SearchOptions) -> Result<Vec<SourceResult>>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Market quote lookup.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<PriceSnapshot>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Read-only access to the persistent event store.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    async fn fetch_event_by_id(&self, id: &str) -> Result<Option<Event>>;
}

/// The full collaborator bundle injected into the pipeline.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn EventStore>,
    pub completion: Arc<dyn CompletionClient>,
    pub search: Arc<dyn SearchClient>,
    pub market: Arc<dyn MarketDataClient>,
}
