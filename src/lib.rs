//! intelpipe - derive intelligence from ingested news events.
//!
//! The pipeline turns atomic events into layered intelligence objects:
//! deterministic aggregation produces signals, threshold checks produce
//! alerts, qualifying signals produce recommendations, and LLM agents add
//! explanations, enrichment, impact scenarios, and deep-research analyses
//! on top. The deterministic layer is pure and runs without any
//! collaborator; everything LLM-backed degrades gracefully.

pub mod agents;
pub mod cli;
pub mod clients;
pub mod config;
pub mod derive;
pub mod error;
pub mod models;
pub mod report;
pub mod research;
pub mod scoring;
pub mod store;

use crate::clients::{Collaborators, EventFilter};
use crate::derive::{AlertThresholds, UserContext};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{
    Alert, AlertExplanation, Event, Impact, MarketDisconnect, Recommendation, ResearchOutcome,
    Signal, SignalEnrichment, SignalExplanation,
};
use crate::research::{CancelSignal, DeepResearchOrchestrator, ResearchOptions};
use std::time::Duration;

/// The pipeline facade. Owns the collaborator bundle and the alert
/// thresholds; every public operation is a method here.
pub struct Pipeline {
    collaborators: Collaborators,
    thresholds: AlertThresholds,
    subtask_timeout: Duration,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators, thresholds: AlertThresholds) -> Self {
        Self {
            collaborators,
            thresholds,
            subtask_timeout: Duration::from_secs(45),
        }
    }

    pub fn with_subtask_timeout(mut self, timeout: Duration) -> Self {
        self.subtask_timeout = timeout;
        self
    }

    /// Fetch events from the store.
    pub async fn fetch_events(&self, filter: &EventFilter) -> PipelineResult<Vec<Event>> {
        self.collaborators
            .store
            .fetch_events(filter)
            .await
            .map_err(|e| PipelineError::Store(e.to_string()))
    }

    /// Derive signals from events. Pure; same input, same output.
    pub fn derive_signals(&self, events: &[Event]) -> Vec<Signal> {
        derive::derive_signals(events)
    }

    /// Derive alerts from signals against the configured thresholds.
    pub fn derive_alerts(&self, signals: &[Signal]) -> Vec<Alert> {
        derive::derive_alerts(signals, &self.thresholds)
    }

    /// Derive recommendations from qualifying signals.
    pub fn derive_recommendations(
        &self,
        signals: &[Signal],
        events: &[Event],
        user_context: Option<&UserContext>,
    ) -> Vec<Recommendation> {
        derive::derive_recommendations(signals, events, user_context)
    }

    /// Explain one signal against its related events. Never fails.
    pub async fn explain_signal(
        &self,
        signal: &Signal,
        related_events: &[Event],
    ) -> SignalExplanation {
        agents::explain_signal(self.collaborators.completion.as_ref(), signal, related_events).await
    }

    /// Explain one alert, optionally against its triggering signal.
    pub async fn explain_alert(&self, alert: &Alert, signal: Option<&Signal>) -> AlertExplanation {
        agents::explain_alert(self.collaborators.completion.as_ref(), alert, signal).await
    }

    /// Refine one signal's display text. Never fails.
    pub async fn enrich_signal(
        &self,
        signal: &Signal,
        related_events: &[Event],
    ) -> SignalEnrichment {
        agents::enrich_signal(self.collaborators.completion.as_ref(), signal, related_events).await
    }

    /// Project one impact scenario per signal. Never fails.
    pub async fn project_impacts(
        &self,
        signals: &[Signal],
        events: &[Event],
        user_context: Option<&UserContext>,
    ) -> Vec<Impact> {
        agents::project_impacts(
            self.collaborators.completion.as_ref(),
            signals,
            events,
            user_context,
        )
        .await
    }

    /// Check one symbol for a price/signal disconnect. Never fails.
    pub async fn detect_market_disconnect(
        &self,
        symbol: &str,
        signals: &[Signal],
    ) -> MarketDisconnect {
        agents::detect_market_disconnect(
            self.collaborators.completion.as_ref(),
            self.collaborators.market.as_ref(),
            symbol,
            signals,
        )
        .await
    }

    /// Run one deep-research query end to end.
    pub async fn run_deep_research(
        &self,
        query: &str,
        opts: &ResearchOptions,
        cancel: CancelSignal,
    ) -> PipelineResult<ResearchOutcome> {
        let orchestrator =
            DeepResearchOrchestrator::new(self.collaborators.clone(), self.subtask_timeout);
        orchestrator.run(query, opts, cancel).await
    }
}
