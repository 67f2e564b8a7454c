//! Signal and alert explanation agents.

use crate::agents::parse::{str_field, str_list, ParseOutcome};
use crate::agents::{call_json_agent, digest_events};
use crate::clients::CompletionClient;
use crate::models::{Alert, AlertExplanation, Event, Signal, SignalExplanation};
use crate::scoring::normalize_score;
use tracing::warn;

const EXPLAIN_SYSTEM_PROMPT: &str = "You are an intelligence analyst. Explain a derived \
signal for a decision-maker: what pattern the underlying events form, what is driving it, \
and what to watch next. Be concrete and avoid hedging boilerplate.";

const EXPLAIN_SCHEMA: &str = r#"{"headline": "one-line framing", "narrative": "2-3 paragraph explanation", "drivers": ["driver"], "watch_items": ["what to watch"], "confidence": 0.0}"#;

/// Explain one signal against its related events. Never fails; degrades to
/// an empty explanation with confidence 0.
pub async fn explain_signal(
    completion: &dyn CompletionClient,
    signal: &Signal,
    related_events: &[Event],
) -> SignalExplanation {
    let user_prompt = format!(
        "Signal: {}\nSummary: {}\nImpact {} / confidence {} / {} horizon.\n\nUnderlying events:\n{}",
        signal.title,
        signal.summary,
        signal.impact_score,
        signal.confidence_score,
        signal.time_horizon,
        digest_events(related_events, 10)
    );

    let body = call_json_agent(
        completion,
        "signal_explanation",
        EXPLAIN_SYSTEM_PROMPT,
        &user_prompt,
        EXPLAIN_SCHEMA,
    )
    .await;

    let outcome = ParseOutcome::classify(body, &["headline", "narrative"]);
    if let ParseOutcome::Partial { missing, .. } = &outcome {
        warn!(agent = "signal_explanation", ?missing, "defaulting missing fields");
    }

    match outcome {
        ParseOutcome::Complete(value) | ParseOutcome::Partial { value, .. } => {
            SignalExplanation {
                headline: str_field(&value, "headline", &signal.title),
                narrative: str_field(&value, "narrative", ""),
                drivers: str_list(&value, "drivers"),
                watch_items: str_list(&value, "watch_items"),
                confidence: explanation_confidence(&value),
            }
        }
        ParseOutcome::Failed => SignalExplanation::default(),
    }
}

const ALERT_SYSTEM_PROMPT: &str = "You are an intelligence analyst. Explain to an operator \
why an alert fired and what posture to take. Ground the explanation in the triggering \
signal; do not invent facts beyond it.";

const ALERT_SCHEMA: &str = r#"{"explanation": "why this fired and why it matters", "recommended_posture": "what to do now", "confidence": 0.0}"#;

/// Explain one alert, optionally against its triggering signal. Never fails.
pub async fn explain_alert(
    completion: &dyn CompletionClient,
    alert: &Alert,
    signal: Option<&Signal>,
) -> AlertExplanation {
    let signal_context = signal
        .map(|s| format!("Triggering signal: {}\n{}", s.title, s.summary))
        .unwrap_or_else(|| "Triggering signal unavailable.".to_string());

    let user_prompt = format!(
        "Alert severity: {}\nTrigger: {}\nThresholds: {}\n\n{}",
        alert.severity, alert.trigger_reason, alert.threshold_exceeded, signal_context
    );

    let body = call_json_agent(
        completion,
        "alert_explanation",
        ALERT_SYSTEM_PROMPT,
        &user_prompt,
        ALERT_SCHEMA,
    )
    .await;

    match ParseOutcome::classify(body, &["explanation"]) {
        ParseOutcome::Complete(value) | ParseOutcome::Partial { value, .. } => AlertExplanation {
            explanation: str_field(&value, "explanation", ""),
            recommended_posture: str_field(&value, "recommended_posture", ""),
            confidence: explanation_confidence(&value),
        },
        ParseOutcome::Failed => AlertExplanation::default(),
    }
}

fn explanation_confidence(value: &serde_json::Value) -> u8 {
    value
        .get("confidence")
        .and_then(serde_json::Value::as_f64)
        .map(normalize_score)
        .unwrap_or(0)
}
