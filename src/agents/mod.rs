//! LLM-backed synthesis agents.
//!
//! Every agent follows the same shape: build a deterministic prompt from
//! typed input, make exactly one completion call requesting structured JSON,
//! decode defensively, and map to a typed result with explicit defaults for
//! every field. Agents never return an error to the caller; on any upstream
//! failure they produce neutral defaults with confidence 0 and log for
//! operator visibility.

pub mod disconnect;
pub mod enrich;
pub mod explain;
pub mod impact;
pub mod parse;

use crate::clients::CompletionClient;
use serde_json::Value;
use tracing::{debug, warn};

pub use disconnect::detect_market_disconnect;
pub use enrich::enrich_signal;
pub use explain::{explain_alert, explain_signal};
pub use impact::project_impacts;

/// Make the agent's single completion call. Returns the parsed body or
/// `None` if anything upstream failed; the caller substitutes defaults.
pub(crate) async fn call_json_agent(
    completion: &dyn CompletionClient,
    agent_name: &str,
    system_prompt: &str,
    user_prompt: &str,
    schema_hint: &str,
) -> Option<Value> {
    match completion
        .complete_json(system_prompt, user_prompt, schema_hint)
        .await
    {
        Ok(response) => {
            debug!(
                agent = agent_name,
                latency_ms = response.latency_ms,
                "agent completion succeeded"
            );
            Some(response.body)
        }
        Err(e) => {
            warn!(agent = agent_name, error = %e, "agent degraded to defaults");
            None
        }
    }
}

/// Compact one-line digest of events for prompt building.
pub(crate) fn digest_events(events: &[crate::models::Event], max: usize) -> String {
    events
        .iter()
        .take(max)
        .map(|e| {
            format!(
                "- [{}] {} (sectors: {}; confidence {})",
                e.date.format("%Y-%m-%d"),
                e.headline,
                if e.sectors.is_empty() {
                    "none".to_string()
                } else {
                    e.sectors.join(", ")
                },
                e.confidence
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
