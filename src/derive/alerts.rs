//! Threshold alert derivation.
//!
//! Scans signals against configured impact/confidence thresholds and emits
//! one alert per triggering signal, with deterministic severity and a
//! severity floor below which alerts are suppressed.

use crate::models::{Alert, ObjectType, Severity, Signal};
use crate::scoring::severity_for;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

/// Thresholds controlling when a signal becomes an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Impact score at or above which the impact threshold fires.
    pub impact_threshold: u8,
    /// Confidence score at or above which the confidence threshold fires.
    pub confidence_threshold: u8,
    /// Alerts classified below this severity are suppressed.
    pub severity_level: Severity,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            impact_threshold: 70,
            confidence_threshold: 60,
            severity_level: Severity::Moderate,
        }
    }
}

/// Derive alerts from signals.
///
/// A signal triggers when its impact or confidence meets the corresponding
/// threshold. Output is sorted critical-first, ties broken by impact score
/// descending. Pure; cannot fail on well-typed input.
pub fn derive_alerts(signals: &[Signal], thresholds: &AlertThresholds) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = signals
        .iter()
        .filter_map(|signal| alert_from_signal(signal, thresholds))
        .collect();

    alerts.sort_by_key(|a| Reverse((a.severity, a.impact)));

    debug!(
        signals = signals.len(),
        alerts = alerts.len(),
        "scanned signals against alert thresholds"
    );

    alerts
}

fn alert_from_signal(signal: &Signal, thresholds: &AlertThresholds) -> Option<Alert> {
    let impact_exceeded = signal.impact_score >= thresholds.impact_threshold;
    let confidence_exceeded = signal.confidence_score >= thresholds.confidence_threshold;

    if !impact_exceeded && !confidence_exceeded {
        return None;
    }

    let severity = severity_for(signal.impact_score, signal.confidence_score);
    if severity < thresholds.severity_level {
        return None;
    }

    Some(Alert {
        id: format!("alert-{}", signal.id),
        object_type: ObjectType::Alert,
        scope: signal.scope,
        severity,
        trigger_reason: format!(
            "Signal \"{}\" scored impact {} / confidence {}",
            signal.title, signal.impact_score, signal.confidence_score
        ),
        threshold_exceeded: threshold_text(
            impact_exceeded,
            confidence_exceeded,
            signal,
            thresholds,
        ),
        related_signal_ids: vec![signal.id.clone()],
        impact: signal.impact_score,
        confidence: signal.confidence_score,
        source_count: signal.source_count,
        last_updated: Utc::now(),
    })
}

/// Name every threshold that fired, with its configured value. When both
/// fired, both are named.
fn threshold_text(
    impact_exceeded: bool,
    confidence_exceeded: bool,
    signal: &Signal,
    thresholds: &AlertThresholds,
) -> String {
    let mut parts = Vec::new();
    if impact_exceeded {
        parts.push(format!(
            "impact {} >= threshold {}",
            signal.impact_score, thresholds.impact_threshold
        ));
    }
    if confidence_exceeded {
        parts.push(format!(
            "confidence {} >= threshold {}",
            signal.confidence_score, thresholds.confidence_threshold
        ));
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Horizon, Scope};
    use chrono::Utc;

    fn make_signal(id: &str, impact: u8, confidence: u8) -> Signal {
        Signal {
            id: id.to_string(),
            object_type: ObjectType::Signal,
            scope: Scope::Sectorial,
            title: format!("Signal {}", id),
            summary: String::new(),
            impact_score: impact,
            confidence_score: confidence,
            time_horizon: Horizon::Short,
            related_event_ids: vec!["e1".to_string()],
            why_it_matters: String::new(),
            source_count: 5,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_spec_example_scenario() {
        // Signal with impact 85 / confidence 70 under default thresholds.
        let signals = vec![make_signal("signal-energy", 85, 70)];
        let alerts = derive_alerts(&signals, &AlertThresholds::default());

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        // Misses the critical conjunction (confidence 70 < 75); impact >= 75.
        assert_eq!(alert.severity, Severity::High);
        assert!(alert.threshold_exceeded.contains("impact 85 >= threshold 70"));
        assert!(alert
            .threshold_exceeded
            .contains("confidence 70 >= threshold 60"));
        assert_eq!(alert.related_signal_ids, vec!["signal-energy".to_string()]);
    }

    #[test]
    fn test_neither_threshold_no_alert() {
        let signals = vec![make_signal("s1", 50, 40)];
        assert!(derive_alerts(&signals, &AlertThresholds::default()).is_empty());
    }

    #[test]
    fn test_single_threshold_named_alone() {
        let signals = vec![make_signal("s1", 80, 40)];
        let alerts = derive_alerts(&signals, &AlertThresholds::default());

        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].threshold_exceeded.contains("impact"));
        assert!(!alerts[0].threshold_exceeded.contains("confidence"));
    }

    #[test]
    fn test_severity_floor_suppresses() {
        let thresholds = AlertThresholds {
            severity_level: Severity::High,
            ..AlertThresholds::default()
        };
        // Triggers thresholds but classifies moderate (74 / 65).
        let signals = vec![make_signal("s1", 74, 65)];
        assert!(derive_alerts(&signals, &thresholds).is_empty());
    }

    #[test]
    fn test_critical_classification() {
        let signals = vec![make_signal("s1", 85, 75)];
        let alerts = derive_alerts(&signals, &AlertThresholds::default());
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    #[test]
    fn test_sorted_critical_first_then_impact() {
        let signals = vec![
            make_signal("high-low", 75, 40),
            make_signal("critical", 90, 80),
            make_signal("high-high", 80, 40),
        ];
        let alerts = derive_alerts(&signals, &AlertThresholds::default());

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[1].impact, 80);
        assert_eq!(alerts[2].impact, 75);
    }
}
