//! File-backed event store adapter.
//!
//! The persistent store proper is an external collaborator; this adapter
//! serves the `EventStore` interface from a JSON file of ingested events so
//! the binary can run derivations without a database.

use crate::clients::{EventFilter, EventStore};
use crate::models::Event;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// In-memory event store loaded from a JSON array of events.
pub struct JsonEventStore {
    events: Vec<Event>,
}

impl JsonEventStore {
    /// Load events from a JSON file (an array of event objects).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read events file: {}", path.display()))?;

        let events: Vec<Event> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse events file: {}", path.display()))?;

        info!(count = events.len(), file = %path.display(), "loaded events");

        Ok(Self { events })
    }

    /// Build a store directly from events (used by tests and embedders).
    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn matches(event: &Event, filter: &EventFilter) -> bool {
        if let Some(sector) = &filter.sector {
            if !event
                .sectors
                .iter()
                .any(|s| s.eq_ignore_ascii_case(sector))
            {
                return false;
            }
        }

        if let Some(region) = &filter.region {
            let location_matches = event
                .location
                .as_deref()
                .map(|l| l.eq_ignore_ascii_case(region))
                .unwrap_or(false);
            if !location_matches {
                return false;
            }
        }

        if let Some(query) = &filter.query {
            let needle = query.to_lowercase();
            let terms: Vec<&str> = needle.split_whitespace().collect();
            let haystack = format!(
                "{} {} {}",
                event.headline.to_lowercase(),
                event.actors.join(" ").to_lowercase(),
                event.sectors.join(" ").to_lowercase()
            );
            // Any-term match; the orchestrator wants loosely-related context,
            // not exact phrase hits.
            if !terms.iter().any(|t| haystack.contains(t)) {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl EventStore for JsonEventStore {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut matched: Vec<Event> = self
            .events
            .iter()
            .filter(|e| Self::matches(e, filter))
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }

    async fn fetch_event_by_id(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }
}
