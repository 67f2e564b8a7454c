//! Signal enrichment agent.
//!
//! Refines a signal's template-composed title, summary, and why-it-matters
//! text for display. Purely cosmetic: the signal exists and keeps its scores
//! whether or not enrichment succeeds, and on failure the signal's own text
//! is returned unchanged with confidence 0.

use crate::agents::parse::{str_field, ParseOutcome};
use crate::agents::{call_json_agent, digest_events};
use crate::clients::CompletionClient;
use crate::models::{Event, Signal, SignalEnrichment};
use crate::scoring::normalize_score;

const ENRICH_SYSTEM_PROMPT: &str = "You are an intelligence editor. Rewrite a derived \
signal's title, summary, and why-it-matters text so a decision-maker grasps it in one \
read. Preserve the meaning; sharpen the language. Do not change scores or invent events.";

const ENRICH_SCHEMA: &str = r#"{"refined_title": "sharper title", "refined_summary": "sharper summary", "why_it_matters": "one short paragraph", "confidence": 0.0}"#;

/// Enrich one signal's display text. Never fails.
pub async fn enrich_signal(
    completion: &dyn CompletionClient,
    signal: &Signal,
    related_events: &[Event],
) -> SignalEnrichment {
    let user_prompt = format!(
        "Title: {}\nSummary: {}\nWhy it matters: {}\nImpact {} / confidence {}.\n\nUnderlying events:\n{}",
        signal.title,
        signal.summary,
        signal.why_it_matters,
        signal.impact_score,
        signal.confidence_score,
        digest_events(related_events, 10)
    );

    let body = call_json_agent(
        completion,
        "signal_enrichment",
        ENRICH_SYSTEM_PROMPT,
        &user_prompt,
        ENRICH_SCHEMA,
    )
    .await;

    match ParseOutcome::classify(body, &["refined_title", "refined_summary"]) {
        ParseOutcome::Complete(value) | ParseOutcome::Partial { value, .. } => SignalEnrichment {
            refined_title: str_field(&value, "refined_title", &signal.title),
            refined_summary: str_field(&value, "refined_summary", &signal.summary),
            why_it_matters: str_field(&value, "why_it_matters", &signal.why_it_matters),
            confidence: value
                .get("confidence")
                .and_then(serde_json::Value::as_f64)
                .map(normalize_score)
                .unwrap_or(0),
        },
        ParseOutcome::Failed => SignalEnrichment {
            refined_title: signal.title.clone(),
            refined_summary: signal.summary.clone(),
            why_it_matters: signal.why_it_matters.clone(),
            confidence: 0,
        },
    }
}
