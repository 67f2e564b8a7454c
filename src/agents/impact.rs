//! Impact projection agent.
//!
//! Derives probabilistic future scenarios from signals. Each signal gets one
//! completion call; the calls for a batch run concurrently. Every field the
//! model might omit has an explicit default, and the invalidation-condition
//! invariant is enforced at construction: a constructed `Impact` always
//! carries at least one condition.

use crate::agents::parse::{effect_list, score_field, str_field, str_list, ParseOutcome};
use crate::agents::{call_json_agent, digest_events};
use crate::clients::CompletionClient;
use crate::derive::UserContext;
use crate::models::{EffectPathways, Event, Horizon, Impact, ObjectType, Signal};
use chrono::Utc;
use futures::future::join_all;
use tracing::warn;

const IMPACT_SYSTEM_PROMPT: &str = "You are a scenario analyst. From one derived signal \
and its context events, project a single plausible future impact scenario with explicit \
assumptions, first- and second-order effects, and the conditions under which the scenario \
would be invalidated.";

const IMPACT_SCHEMA: &str = r#"{"risk_headline": "the scenario in one line", "probability": 0, "magnitude": 0, "timeframe": "immediate|short|medium|long", "assumptions": ["assumption"], "pathways": {"first_order": [{"description": "effect", "confidence": 0}], "second_order": [{"description": "effect", "confidence": 0}]}, "invalidation_conditions": ["condition"]}"#;

/// Fallback invalidation condition; an impact with none is malformed.
const DEFAULT_INVALIDATION: &str =
    "Underlying events are corrected, retracted, or fail to develop further";

/// Project one impact scenario per signal. Never fails; a failed call
/// yields a default-filled scenario with confidence 0.
pub async fn project_impacts(
    completion: &dyn CompletionClient,
    signals: &[Signal],
    events: &[Event],
    user_prefs: Option<&UserContext>,
) -> Vec<Impact> {
    let calls = signals
        .iter()
        .map(|signal| project_one(completion, signal, events, user_prefs));

    join_all(calls).await
}

async fn project_one(
    completion: &dyn CompletionClient,
    signal: &Signal,
    events: &[Event],
    user_prefs: Option<&UserContext>,
) -> Impact {
    let audience = user_prefs
        .and_then(|p| p.sector.as_deref())
        .map(|sector| format!("The reader operates in the {} sector.", sector))
        .unwrap_or_default();

    let user_prompt = format!(
        "Signal: {}\nSummary: {}\nImpact {} / confidence {} / {} horizon.\n{}\n\nContext events:\n{}",
        signal.title,
        signal.summary,
        signal.impact_score,
        signal.confidence_score,
        signal.time_horizon,
        audience,
        digest_events(events, 10)
    );

    let body = call_json_agent(
        completion,
        "impact_projection",
        IMPACT_SYSTEM_PROMPT,
        &user_prompt,
        IMPACT_SCHEMA,
    )
    .await;

    let outcome = ParseOutcome::classify(
        body,
        &["risk_headline", "probability", "magnitude", "invalidation_conditions"],
    );
    if let ParseOutcome::Partial { missing, .. } = &outcome {
        warn!(agent = "impact_projection", signal = %signal.id, ?missing, "defaulting missing fields");
    }

    match outcome {
        ParseOutcome::Complete(value) | ParseOutcome::Partial { value, .. } => {
            build_impact(signal, &value, signal.confidence_score)
        }
        ParseOutcome::Failed => fallback_impact(signal),
    }
}

fn build_impact(signal: &Signal, value: &serde_json::Value, confidence: u8) -> Impact {
    let mut invalidation_conditions = str_list(value, "invalidation_conditions");
    if invalidation_conditions.is_empty() {
        invalidation_conditions.push(DEFAULT_INVALIDATION.to_string());
    }

    let timeframe = value
        .get("timeframe")
        .and_then(serde_json::Value::as_str)
        .and_then(Horizon::parse)
        .unwrap_or(signal.time_horizon);

    let pathways_value = value.get("pathways").cloned().unwrap_or_default();

    Impact {
        id: format!("impact-{}", signal.id),
        object_type: ObjectType::Impact,
        scope: signal.scope,
        risk_headline: str_field(value, "risk_headline", &signal.title),
        probability: score_field(value, "probability", 50),
        magnitude: score_field(value, "magnitude", 50),
        timeframe,
        assumptions: str_list(value, "assumptions"),
        pathways: EffectPathways {
            first_order: effect_list(&pathways_value, "first_order"),
            second_order: effect_list(&pathways_value, "second_order"),
        },
        invalidation_conditions,
        confidence,
        source_count: signal.source_count,
        last_updated: Utc::now(),
    }
}

/// Default-filled scenario for a fully failed call. Confidence 0 tells the
/// consumer how little to trust it.
fn fallback_impact(signal: &Signal) -> Impact {
    Impact {
        id: format!("impact-{}", signal.id),
        object_type: ObjectType::Impact,
        scope: signal.scope,
        risk_headline: signal.title.clone(),
        probability: 50,
        magnitude: 50,
        timeframe: signal.time_horizon,
        assumptions: vec![],
        pathways: EffectPathways::default(),
        invalidation_conditions: vec![DEFAULT_INVALIDATION.to_string()],
        confidence: 0,
        source_count: signal.source_count,
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{CompletionClient, CompletionResponse};
    use crate::models::Scope;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedCompletion {
        body: Option<serde_json::Value>,
    }

    #[async_trait]
    impl CompletionClient for CannedCompletion {
        async fn complete_json(
            &self,
            _system: &str,
            _user: &str,
            _schema: &str,
        ) -> Result<CompletionResponse> {
            match &self.body {
                Some(body) => Ok(CompletionResponse {
                    body: body.clone(),
                    latency_ms: 5,
                }),
                None => Err(anyhow::anyhow!("timeout")),
            }
        }
    }

    fn make_signal(id: &str) -> Signal {
        Signal {
            id: id.to_string(),
            object_type: ObjectType::Signal,
            scope: Scope::Sectorial,
            title: "Elevated activity in the Energy sector".to_string(),
            summary: "5 related events".to_string(),
            impact_score: 85,
            confidence_score: 70,
            time_horizon: Horizon::Short,
            related_event_ids: vec![],
            why_it_matters: String::new(),
            source_count: 5,
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_full_projection() {
        let completion = CannedCompletion {
            body: Some(json!({
                "risk_headline": "Sustained energy price spike",
                "probability": 0.65,
                "magnitude": 70,
                "timeframe": "short",
                "assumptions": ["no rapid capacity restart"],
                "pathways": {
                    "first_order": [{"description": "spot prices rise", "confidence": 80}],
                    "second_order": [{"description": "downstream margin squeeze", "confidence": 0.6}]
                },
                "invalidation_conditions": ["capacity restored within two weeks"]
            })),
        };

        let impacts = project_impacts(&completion, &[make_signal("signal-energy")], &[], None).await;
        assert_eq!(impacts.len(), 1);
        let impact = &impacts[0];
        assert_eq!(impact.probability, 65);
        assert_eq!(impact.magnitude, 70);
        assert_eq!(impact.timeframe, Horizon::Short);
        assert_eq!(impact.pathways.first_order[0].confidence, 80);
        assert_eq!(impact.pathways.second_order[0].confidence, 60);
        assert_eq!(impact.invalidation_conditions.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_defaulted() {
        let completion = CannedCompletion {
            body: Some(json!({"risk_headline": "Something"})),
        };

        let impacts = project_impacts(&completion, &[make_signal("s1")], &[], None).await;
        let impact = &impacts[0];
        assert_eq!(impact.probability, 50);
        assert_eq!(impact.magnitude, 50);
        assert!(!impact.invalidation_conditions.is_empty());
    }

    #[tokio::test]
    async fn test_failed_call_yields_fallback_with_invariant() {
        let completion = CannedCompletion { body: None };

        let impacts = project_impacts(&completion, &[make_signal("s1")], &[], None).await;
        let impact = &impacts[0];
        assert_eq!(impact.confidence, 0);
        assert!(!impact.invalidation_conditions.is_empty());
    }

    #[tokio::test]
    async fn test_empty_invalidation_list_backfilled() {
        let completion = CannedCompletion {
            body: Some(json!({
                "risk_headline": "Something",
                "probability": 60,
                "magnitude": 60,
                "invalidation_conditions": []
            })),
        };

        let impacts = project_impacts(&completion, &[make_signal("s1")], &[], None).await;
        assert!(!impacts[0].invalidation_conditions.is_empty());
    }

    #[tokio::test]
    async fn test_one_impact_per_signal() {
        let completion = CannedCompletion { body: None };
        let signals = vec![make_signal("s1"), make_signal("s2"), make_signal("s3")];

        let impacts = project_impacts(&completion, &signals, &[], None).await;
        assert_eq!(impacts.len(), 3);
    }
}
