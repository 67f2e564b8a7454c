//! Event aggregation: grouping a batch of events by derivation key.
//!
//! The derivation key is the event's first sector when one is present, else
//! its location (region), else a single global bucket. Groups below the
//! minimum size carry no meaningful pattern and are discarded.

use crate::models::{Event, Horizon, Scope};
use std::collections::HashMap;

/// Groups with fewer members than this are discarded.
pub const MIN_GROUP_SIZE: usize = 3;

/// A surviving group of events sharing one derivation key, with its
/// group-level statistics.
#[derive(Debug, Clone)]
pub struct EventGroup {
    /// The derivation key (sector name, region name, or "global").
    pub key: String,
    /// Scope implied by how the key was chosen.
    pub scope: Scope,
    pub members: Vec<Event>,
    /// Mean impact across members that carry an impact score.
    pub mean_impact: f64,
    /// Mean confidence across all members.
    pub mean_confidence: f64,
    /// Most frequent member horizon; ties break toward first seen.
    pub modal_horizon: Horizon,
}

impl EventGroup {
    /// Ids of every member event, in input order.
    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|e| e.id.clone()).collect()
    }
}

/// Group events by derivation key and compute group statistics.
///
/// Pure and deterministic: group order follows first appearance of each key
/// in the input, and an empty input yields an empty output.
pub fn aggregate_events(events: &[Event]) -> Vec<EventGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, (Scope, Vec<Event>)> = HashMap::new();

    for event in events {
        let (key, scope) = derivation_key(event);
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets
            .entry(key)
            .or_insert_with(|| (scope, Vec::new()))
            .1
            .push(event.clone());
    }

    order
        .into_iter()
        .filter_map(|key| {
            let (scope, members) = buckets.remove(&key)?;
            if members.len() < MIN_GROUP_SIZE {
                return None;
            }

            let mean_impact = mean_of(members.iter().filter_map(|e| e.impact.map(f64::from)));
            let mean_confidence = mean_of(members.iter().map(|e| f64::from(e.confidence)));
            let modal_horizon = modal_horizon(&members);

            Some(EventGroup {
                key,
                scope,
                members,
                mean_impact,
                mean_confidence,
                modal_horizon,
            })
        })
        .collect()
}

/// Pick the derivation key for one event: sector, else region, else global.
fn derivation_key(event: &Event) -> (String, Scope) {
    if let Some(sector) = event.sectors.first() {
        return (sector.clone(), Scope::Sectorial);
    }
    if let Some(location) = event.location.as_deref() {
        if !location.trim().is_empty() {
            return (location.to_string(), Scope::Regional);
        }
    }
    ("global".to_string(), Scope::Global)
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Most frequent horizon among members; ties break toward the horizon seen
/// first. Members without a horizon do not vote; a group with no votes
/// defaults to medium.
fn modal_horizon(members: &[Event]) -> Horizon {
    let mut tally: Vec<(Horizon, usize)> = Vec::new();

    for event in members {
        let Some(horizon) = event.horizon else {
            continue;
        };
        match tally.iter_mut().find(|(h, _)| *h == horizon) {
            Some((_, count)) => *count += 1,
            None => tally.push((horizon, 1)),
        }
    }

    // Strictly-greater comparison keeps the first-seen winner on ties.
    let mut best: Option<(Horizon, usize)> = None;
    for (horizon, count) in tally {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((horizon, count)),
        }
    }
    best.map(|(h, _)| h).unwrap_or(Horizon::Medium)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::ObjectType;

    fn make_event(id: &str, sectors: &[&str], location: Option<&str>) -> Event {
        Event {
            id: id.to_string(),
            object_type: ObjectType::Event,
            scope: None,
            headline: format!("headline {}", id),
            date: Utc::now(),
            location: location.map(String::from),
            actors: vec![],
            sectors: sectors.iter().map(|s| s.to_string()).collect(),
            sources: vec!["wire".to_string()],
            confidence: 70,
            impact: Some(80),
            horizon: Some(Horizon::Short),
        }
    }

    #[test]
    fn test_empty_input_empty_output() {
        assert!(aggregate_events(&[]).is_empty());
    }

    #[test]
    fn test_groups_below_floor_discarded() {
        let events = vec![
            make_event("e1", &["Energy"], None),
            make_event("e2", &["Energy"], None),
        ];
        assert!(aggregate_events(&events).is_empty());
    }

    #[test]
    fn test_sector_preferred_over_region() {
        let mut events = vec![
            make_event("e1", &["Energy"], Some("Europe")),
            make_event("e2", &["Energy"], Some("Asia")),
            make_event("e3", &["Energy"], None),
        ];
        events.push(make_event("e4", &[], Some("Europe")));

        let groups = aggregate_events(&events);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "Energy");
        assert_eq!(groups[0].scope, Scope::Sectorial);
        assert_eq!(groups[0].members.len(), 3);
    }

    #[test]
    fn test_region_then_global_fallback() {
        let regional: Vec<Event> = (0..3)
            .map(|i| make_event(&format!("r{}", i), &[], Some("Europe")))
            .collect();
        let global: Vec<Event> = (0..3)
            .map(|i| make_event(&format!("g{}", i), &[], None))
            .collect();

        let events: Vec<Event> = regional.into_iter().chain(global).collect();
        let groups = aggregate_events(&events);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Europe");
        assert_eq!(groups[0].scope, Scope::Regional);
        assert_eq!(groups[1].key, "global");
        assert_eq!(groups[1].scope, Scope::Global);
    }

    #[test]
    fn test_mean_impact_skips_unscored_members() {
        let mut events: Vec<Event> = vec![
            make_event("e1", &["Energy"], None),
            make_event("e2", &["Energy"], None),
            make_event("e3", &["Energy"], None),
        ];
        events[0].impact = Some(90);
        events[1].impact = Some(60);
        events[2].impact = None;

        let groups = aggregate_events(&events);
        assert_eq!(groups[0].mean_impact, 75.0);
    }

    #[test]
    fn test_modal_horizon_first_seen_tie_break() {
        let mut events: Vec<Event> = (0..4)
            .map(|i| make_event(&format!("e{}", i), &["Energy"], None))
            .collect();
        events[0].horizon = Some(Horizon::Long);
        events[1].horizon = Some(Horizon::Short);
        events[2].horizon = Some(Horizon::Long);
        events[3].horizon = Some(Horizon::Short);

        // Two-way tie; Long was seen first.
        let groups = aggregate_events(&events);
        assert_eq!(groups[0].modal_horizon, Horizon::Long);
    }

    #[test]
    fn test_modal_horizon_defaults_when_unvoted() {
        let mut events: Vec<Event> = (0..3)
            .map(|i| make_event(&format!("e{}", i), &["Energy"], None))
            .collect();
        for e in &mut events {
            e.horizon = None;
        }

        let groups = aggregate_events(&events);
        assert_eq!(groups[0].modal_horizon, Horizon::Medium);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let events: Vec<Event> = (0..5)
            .map(|i| make_event(&format!("e{}", i), &["Energy"], None))
            .collect();

        let first = aggregate_events(&events);
        let second = aggregate_events(&events);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].member_ids(), second[0].member_ids());
    }
}
