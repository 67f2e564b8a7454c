//! OpenAI-compatible JSON completion client.
//!
//! One request per call, JSON response format requested explicitly, and the
//! body parsed into a `serde_json::Value` before it leaves this module.

use crate::clients::{CompletionClient, CompletionResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Configuration for the completion client.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for any OpenAI-compatible chat-completions endpoint.
pub struct OpenAiCompletionClient {
    config: CompletionConfig,
    http_client: reqwest::Client,
}

impl OpenAiCompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self> {
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
impl CompletionClient for OpenAiCompletionClient {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_hint: &str,
    ) -> Result<CompletionResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .context("No API key configured for the completion client")?;

        let url = format!("{}/chat/completions", self.config.base_url);

        // The schema hint rides along in the system prompt; the endpoint's
        // json_object mode guarantees syntax, the hint constrains shape.
        let system = format!(
            "{}\n\nRespond with a single JSON object of this shape:\n{}",
            system_prompt, schema_hint
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let started = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!(
                        "Completion request timed out after {}s",
                        self.config.timeout_seconds
                    )
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to completion API at {}", self.config.base_url)
                } else {
                    anyhow::anyhow!("Failed to send completion request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Completion API error {}: {}", status, body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        let latency_ms = started.elapsed().as_millis() as u64;

        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .context("Completion response had no choices")?;

        let body = parse_json_content(content)
            .context("Completion content was not valid JSON")?;

        debug!(latency_ms, model = %self.config.model, "completion call finished");

        Ok(CompletionResponse { body, latency_ms })
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

/// Parse model content to JSON, tolerating markdown code fences some models
/// still wrap around json_object output.
fn parse_json_content(content: &str) -> Result<serde_json::Value> {
    let trimmed = content.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    serde_json::from_str(stripped).map_err(Into::into)
}
