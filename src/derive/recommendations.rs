//! Recommendation derivation.
//!
//! Converts qualifying signals into action proposals. The invariant here is
//! absolute: no signal, no recommendation. A signal qualifies only when both
//! its impact and confidence clear the qualification floor; unqualified
//! signals are skipped entirely rather than demoted.

use crate::models::{Event, ObjectType, Recommendation, RiskLevel, Scope, Signal};
use crate::scoring::risk_level_for;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Qualification floor: signals below either bound produce nothing.
const MIN_IMPACT: u8 = 60;
const MIN_CONFIDENCE: u8 = 50;

/// Optional caller context used to specialize recommendation text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

/// Derive recommendations from qualifying signals.
///
/// Events are contextual only; they never generate recommendations on their
/// own. Output is sorted descending by impact x confidence.
pub fn derive_recommendations(
    signals: &[Signal],
    _events: &[Event],
    user_context: Option<&UserContext>,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = signals
        .iter()
        .filter(|s| s.impact_score >= MIN_IMPACT && s.confidence_score >= MIN_CONFIDENCE)
        .map(|s| recommendation_from_signal(s, user_context))
        .collect();

    recommendations.sort_by_key(|r| {
        std::cmp::Reverse(u32::from(r.impact) * u32::from(r.confidence))
    });

    debug!(
        signals = signals.len(),
        recommendations = recommendations.len(),
        "derived recommendations from qualifying signals"
    );

    recommendations
}

fn recommendation_from_signal(
    signal: &Signal,
    user_context: Option<&UserContext>,
) -> Recommendation {
    let risk_level = risk_level_for(signal.impact_score, signal.confidence_score);
    let (action, rationale) = compose_text(signal, user_context, risk_level);

    Recommendation {
        id: format!("rec-{}", signal.id),
        object_type: ObjectType::Recommendation,
        scope: signal.scope,
        action,
        rationale,
        risk_level,
        supporting_signal_ids: vec![signal.id.clone()],
        impact: signal.impact_score,
        confidence: signal.confidence_score,
        source_count: signal.source_count,
        last_updated: Utc::now(),
    }
}

/// Action/rationale text branches on scope and is specialized when the
/// caller's sector matches a sectorial signal.
fn compose_text(
    signal: &Signal,
    user_context: Option<&UserContext>,
    risk_level: RiskLevel,
) -> (String, String) {
    let urgency = match risk_level {
        RiskLevel::High => "Review exposure now",
        RiskLevel::Medium => "Schedule a review",
        RiskLevel::Low => "Monitor",
    };

    let sector_match = matches!(
        (signal.scope, user_context.and_then(|c| c.sector.as_deref())),
        (Scope::Sectorial, Some(user_sector)) if signal.title.to_lowercase().contains(&user_sector.to_lowercase())
    );

    let action = match signal.scope {
        Scope::Sectorial if sector_match => format!(
            "{}: this pattern sits in your own sector. {}",
            urgency, signal.title
        ),
        Scope::Sectorial => format!("{} of sector positions affected by: {}", urgency, signal.title),
        Scope::Regional => format!(
            "{} of regional operations and supply lines affected by: {}",
            urgency, signal.title
        ),
        _ => format!("{} of portfolio-wide exposure to: {}", urgency, signal.title),
    };

    let rationale = format!(
        "{} (impact {}, confidence {}, {} horizon, {} supporting events).",
        signal.why_it_matters,
        signal.impact_score,
        signal.confidence_score,
        signal.time_horizon,
        signal.source_count
    );

    (action, rationale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Horizon;
    use chrono::Utc;

    fn make_signal(id: &str, impact: u8, confidence: u8, scope: Scope) -> Signal {
        Signal {
            id: id.to_string(),
            object_type: ObjectType::Signal,
            scope,
            title: format!("Elevated activity in the Energy sector ({})", id),
            summary: String::new(),
            impact_score: impact,
            confidence_score: confidence,
            time_horizon: Horizon::Short,
            related_event_ids: vec!["e1".to_string()],
            why_it_matters: "Clustered reporting suggests a shift.".to_string(),
            source_count: 5,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_no_signal_no_recommendation() {
        let recs = derive_recommendations(&[], &[], None);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_spec_example_high_risk() {
        // impact 85, confidence 70: qualifies and classifies high.
        let signals = vec![make_signal("signal-energy", 85, 70, Scope::Sectorial)];
        let recs = derive_recommendations(&signals, &[], None);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].risk_level, RiskLevel::High);
        assert_eq!(recs[0].supporting_signal_ids, vec!["signal-energy".to_string()]);
    }

    #[test]
    fn test_unqualified_signals_skipped_entirely() {
        let signals = vec![
            make_signal("low-impact", 59, 90, Scope::Sectorial),
            make_signal("low-confidence", 90, 49, Scope::Sectorial),
        ];
        let recs = derive_recommendations(&signals, &[], None);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_no_rec_references_unqualified_signal() {
        let signals = vec![
            make_signal("good", 70, 60, Scope::Sectorial),
            make_signal("bad", 50, 40, Scope::Sectorial),
        ];
        let recs = derive_recommendations(&signals, &[], None);

        for rec in &recs {
            assert!(!rec.supporting_signal_ids.contains(&"bad".to_string()));
        }
    }

    #[test]
    fn test_sector_match_specializes_action() {
        let signals = vec![make_signal("s1", 80, 70, Scope::Sectorial)];
        let context = UserContext {
            sector: Some("energy".to_string()),
            ..UserContext::default()
        };

        let recs = derive_recommendations(&signals, &[], Some(&context));
        assert!(recs[0].action.contains("your own sector"));
    }

    #[test]
    fn test_scope_branches_text() {
        let signals = vec![
            make_signal("s1", 70, 60, Scope::Regional),
            make_signal("s2", 70, 60, Scope::Global),
        ];
        let recs = derive_recommendations(&signals, &[], None);

        assert!(recs.iter().any(|r| r.action.contains("regional operations")));
        assert!(recs.iter().any(|r| r.action.contains("portfolio-wide")));
    }

    #[test]
    fn test_sorted_by_impact_confidence_product() {
        let signals = vec![
            make_signal("weak", 60, 50, Scope::Global),   // 3000
            make_signal("strong", 90, 80, Scope::Global), // 7200
            make_signal("mid", 70, 60, Scope::Global),    // 4200
        ];
        let recs = derive_recommendations(&signals, &[], None);

        assert_eq!(recs[0].supporting_signal_ids[0], "strong");
        assert_eq!(recs[1].supporting_signal_ids[0], "mid");
        assert_eq!(recs[2].supporting_signal_ids[0], "weak");
    }
}
