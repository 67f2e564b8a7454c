//! Signal derivation: one interpreted pattern per surviving event group.
//!
//! Titles and summaries are template-composed from the group key and member
//! count. No model call happens here; LLM enrichment is a separate, optional
//! display-layer step and a signal exists without it.

use crate::derive::aggregator::{aggregate_events, EventGroup};
use crate::models::{Event, ObjectType, Scope, Signal};
use crate::scoring::round_score;
use chrono::Utc;
use std::cmp::Reverse;
use tracing::debug;

/// Derive signals from a batch of events.
///
/// Output is sorted by impact score descending; ties break by confidence
/// score, then by member count (more members first).
pub fn derive_signals(events: &[Event]) -> Vec<Signal> {
    let groups = aggregate_events(events);
    debug!(
        events = events.len(),
        groups = groups.len(),
        "aggregated events into signal groups"
    );

    let mut signals: Vec<Signal> = groups.iter().map(signal_from_group).collect();

    signals.sort_by_key(|s| {
        Reverse((s.impact_score, s.confidence_score, s.related_event_ids.len()))
    });

    signals
}

fn signal_from_group(group: &EventGroup) -> Signal {
    let count = group.members.len();
    let impact_score = round_score(group.mean_impact);
    let confidence_score = round_score(group.mean_confidence);

    Signal {
        id: format!("signal-{}", slug(&group.key)),
        object_type: ObjectType::Signal,
        scope: group.scope,
        title: title_for(group),
        summary: summary_for(group, count),
        impact_score,
        confidence_score,
        time_horizon: group.modal_horizon,
        related_event_ids: group.member_ids(),
        why_it_matters: why_it_matters_for(group, impact_score),
        source_count: count,
        last_updated: Utc::now(),
    }
}

fn title_for(group: &EventGroup) -> String {
    match group.scope {
        Scope::Sectorial => format!("Elevated activity in the {} sector", group.key),
        Scope::Regional => format!("Elevated activity across {}", group.key),
        _ => "Elevated cross-cutting activity".to_string(),
    }
}

fn summary_for(group: &EventGroup, count: usize) -> String {
    format!(
        "{} related events point to a developing {} pattern over a {} horizon.",
        count, group.key, group.modal_horizon
    )
}

fn why_it_matters_for(group: &EventGroup, impact_score: u8) -> String {
    let weight = if impact_score >= 75 {
        "a material"
    } else if impact_score >= 50 {
        "a meaningful"
    } else {
        "a limited"
    };
    format!(
        "Clustered reporting around {} suggests {} shift rather than isolated noise.",
        group.key, weight
    )
}

fn slug(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Horizon;
    use chrono::Utc;

    fn make_event(id: &str, sector: &str, impact: u8, confidence: u8) -> Event {
        Event {
            id: id.to_string(),
            object_type: ObjectType::Event,
            scope: None,
            headline: format!("headline {}", id),
            date: Utc::now(),
            location: None,
            actors: vec![],
            sectors: vec![sector.to_string()],
            sources: vec!["wire".to_string()],
            confidence,
            impact: Some(impact),
            horizon: Some(Horizon::Short),
        }
    }

    fn energy_batch() -> Vec<Event> {
        // Spec example 1: mean impact 85, mean confidence 70.
        let impacts = [80, 85, 90, 75, 95];
        let confidences = [70, 65, 80, 60, 75];
        impacts
            .iter()
            .zip(confidences.iter())
            .enumerate()
            .map(|(i, (&imp, &conf))| make_event(&format!("e{}", i), "Energy", imp, conf))
            .collect()
    }

    #[test]
    fn test_single_sector_batch_yields_one_signal() {
        let signals = derive_signals(&energy_batch());

        assert_eq!(signals.len(), 1);
        let signal = &signals[0];
        assert_eq!(signal.impact_score, 85);
        assert_eq!(signal.confidence_score, 70);
        assert_eq!(signal.related_event_ids.len(), 5);
        assert_eq!(signal.scope, Scope::Sectorial);
        assert_eq!(signal.time_horizon, Horizon::Short);
        assert!(signal.title.contains("Energy"));
    }

    #[test]
    fn test_below_floor_yields_no_signal() {
        let events = vec![
            make_event("e1", "Energy", 90, 90),
            make_event("e2", "Energy", 90, 90),
        ];
        assert!(derive_signals(&events).is_empty());
    }

    #[test]
    fn test_related_ids_subset_of_input() {
        let events = energy_batch();
        let input_ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();

        for signal in derive_signals(&events) {
            for id in &signal.related_event_ids {
                assert!(input_ids.contains(&id.as_str()));
            }
        }
    }

    #[test]
    fn test_sort_order() {
        let mut events = Vec::new();
        for i in 0..3 {
            events.push(make_event(&format!("a{}", i), "Agriculture", 60, 50));
        }
        for i in 0..3 {
            events.push(make_event(&format!("b{}", i), "Energy", 90, 80));
        }
        // Same impact as Agriculture but higher confidence.
        for i in 0..3 {
            events.push(make_event(&format!("c{}", i), "Shipping", 60, 70));
        }

        let signals = derive_signals(&events);
        assert_eq!(signals.len(), 3);
        assert!(signals[0].title.contains("Energy"));
        assert!(signals[1].title.contains("Shipping"));
        assert!(signals[2].title.contains("Agriculture"));
    }

    #[test]
    fn test_member_count_breaks_full_ties() {
        let mut events = Vec::new();
        for i in 0..3 {
            events.push(make_event(&format!("a{}", i), "Metals", 70, 60));
        }
        for i in 0..4 {
            events.push(make_event(&format!("b{}", i), "Textiles", 70, 60));
        }

        let signals = derive_signals(&events);
        assert_eq!(signals[0].related_event_ids.len(), 4);
        assert_eq!(signals[1].related_event_ids.len(), 3);
    }

    #[test]
    fn test_slug_ids_are_stable() {
        let signals = derive_signals(&energy_batch());
        assert_eq!(signals[0].id, "signal-energy");
    }
}
