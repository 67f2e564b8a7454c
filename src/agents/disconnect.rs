//! Market-disconnect detection agent.
//!
//! Compares the derived signal picture for a symbol against its actual
//! price action and asks the model whether the market is ignoring (or has
//! already priced in) what the signals say. The quote fetch and the
//! completion call are both degradable: a missing quote just weakens the
//! prompt, a failed completion yields the neutral default.

use crate::agents::parse::{bool_field, str_field, ParseOutcome};
use crate::agents::call_json_agent;
use crate::clients::{CompletionClient, MarketDataClient};
use crate::models::{MarketDisconnect, Signal};
use crate::scoring::normalize_score;
use tracing::warn;

const DISCONNECT_SYSTEM_PROMPT: &str = "You are a market analyst. Given derived \
intelligence signals about a company or sector and its current price action, judge \
whether price is disconnected from the signal picture. Say so plainly either way.";

const DISCONNECT_SCHEMA: &str = r#"{"disconnect_detected": false, "narrative": "one paragraph judgment", "confidence": 0.0}"#;

/// Detect a price/signal disconnect for one symbol. Never fails.
pub async fn detect_market_disconnect(
    completion: &dyn CompletionClient,
    market: &dyn MarketDataClient,
    symbol: &str,
    signals: &[Signal],
) -> MarketDisconnect {
    let quote = match market.quote(symbol).await {
        Ok(quote) => Some(quote),
        Err(e) => {
            warn!(agent = "market_disconnect", symbol, error = %e, "quote unavailable");
            None
        }
    };

    let price_context = match &quote {
        Some(q) => format!("{} trades at {:.2} ({:+.2}% today).", q.symbol, q.price, q.change_percent),
        None => "No current quote is available.".to_string(),
    };

    let signal_context = signals
        .iter()
        .take(5)
        .map(|s| {
            format!(
                "- {} (impact {}, confidence {}, {} horizon)",
                s.title, s.impact_score, s.confidence_score, s.time_horizon
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let user_prompt = format!(
        "Symbol: {}\n{}\n\nDerived signals:\n{}",
        symbol, price_context, signal_context
    );

    let body = call_json_agent(
        completion,
        "market_disconnect",
        DISCONNECT_SYSTEM_PROMPT,
        &user_prompt,
        DISCONNECT_SCHEMA,
    )
    .await;

    match ParseOutcome::classify(body, &["disconnect_detected", "narrative"]) {
        ParseOutcome::Complete(value) | ParseOutcome::Partial { value, .. } => MarketDisconnect {
            symbol: symbol.to_string(),
            disconnect_detected: bool_field(&value, "disconnect_detected", false),
            narrative: str_field(&value, "narrative", ""),
            quote,
            confidence: value
                .get("confidence")
                .and_then(serde_json::Value::as_f64)
                .map(normalize_score)
                .unwrap_or(0),
        },
        ParseOutcome::Failed => MarketDisconnect {
            symbol: symbol.to_string(),
            quote,
            ..MarketDisconnect::default()
        },
    }
}
