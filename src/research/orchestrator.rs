//! Deep-research orchestrator.
//!
//! A fixed state machine over one free-text query: validate, fan out three
//! collection subtasks, fan out three analysis subtasks over the collected
//! material, then drive a single synthesis call. Collection and analysis
//! subtasks degrade independently to documented defaults; only the final
//! synthesis is fatal, because no partial analysis is meaningful without it.

use crate::agents::parse::{str_field, str_list};
use crate::clients::{Collaborators, EventFilter, SearchOptions};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{Analysis, Event, Horizon, ObjectType, ResearchOutcome, Scope, SourceResult};
use crate::research::tasks::{run_subtask, CancelSignal};
use chrono::Utc;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Caller-tunable options for one research query.
#[derive(Debug, Clone)]
pub struct ResearchOptions {
    pub focus_areas: Vec<String>,
    pub time_horizon: Option<Horizon>,
    pub max_sources: usize,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            focus_areas: Vec::new(),
            time_horizon: None,
            max_sources: 5,
        }
    }
}

/// The orchestrator. Holds the injected collaborator bundle; all state for
/// one query lives on the stack of `run`.
pub struct DeepResearchOrchestrator {
    collaborators: Collaborators,
    subtask_timeout: Duration,
}

impl DeepResearchOrchestrator {
    pub fn new(collaborators: Collaborators, subtask_timeout: Duration) -> Self {
        Self {
            collaborators,
            subtask_timeout,
        }
    }

    /// Run one deep-research query end to end.
    pub async fn run(
        &self,
        query: &str,
        opts: &ResearchOptions,
        cancel: CancelSignal,
    ) -> PipelineResult<ResearchOutcome> {
        let started = Instant::now();

        // Stage 1: validate. Fast-fail before any work starts.
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::InvalidInput("empty research query".into()));
        }
        if !self.collaborators.completion.is_configured() {
            // Synthesis cannot degrade, so a missing completion client
            // fails the whole query up front.
            return Err(PipelineError::InvalidInput(
                "completion client is not configured".into(),
            ));
        }

        info!(query, "deep research started");
        let mut agents_used: Vec<String> = Vec::new();

        // Stage 2: parallel collection. Independently fallible.
        let (sources, related_events, historical_context) = tokio::join!(
            run_subtask(
                "source_search",
                self.subtask_timeout,
                &cancel,
                Vec::new(),
                self.search_sources(query, opts),
            ),
            run_subtask(
                "related_events",
                self.subtask_timeout,
                &cancel,
                Vec::new(),
                self.lookup_related_events(query),
            ),
            run_subtask(
                "historical_context",
                self.subtask_timeout,
                &cancel,
                String::new(),
                self.summarize_historical_context(query),
            ),
        );

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        for outcome in [
            (sources.label, sources.succeeded),
            (related_events.label, related_events.succeeded),
            (historical_context.label, historical_context.succeeded),
        ] {
            if outcome.1 {
                agents_used.push(outcome.0.to_string());
            }
        }

        let sources = sources.value;
        let related_events = related_events.value;
        let historical_context = historical_context.value;

        let source_digest = digest_sources(&sources);

        // Stage 3: parallel analysis over the collected material.
        let (extracted_events, trends, implications) = tokio::join!(
            run_subtask(
                "event_extraction",
                self.subtask_timeout,
                &cancel,
                Vec::new(),
                self.extract_events(query, &source_digest),
            ),
            run_subtask(
                "trend_identification",
                self.subtask_timeout,
                &cancel,
                Vec::new(),
                self.identify_trends(query, &source_digest, &related_events),
            ),
            run_subtask(
                "impact_assessment",
                self.subtask_timeout,
                &cancel,
                Vec::new(),
                self.assess_implications(query, opts, &source_digest),
            ),
        );

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        for outcome in [
            (extracted_events.label, extracted_events.succeeded),
            (trends.label, trends.succeeded),
            (implications.label, implications.succeeded),
        ] {
            if outcome.1 {
                agents_used.push(outcome.0.to_string());
            }
        }

        // Stage 4: synthesis. The one fatal call.
        let analysis = self
            .synthesize(
                query,
                &historical_context,
                &trends.value,
                &implications.value,
                &extracted_events.value,
                &related_events,
                &source_digest,
                sources.len(),
            )
            .await?;
        agents_used.push("synthesis".to_string());

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(query, elapsed_ms, sources = sources.len(), "deep research finished");

        Ok(ResearchOutcome {
            analysis,
            sources,
            elapsed_ms,
            agents_used,
        })
    }

    async fn search_sources(
        &self,
        query: &str,
        opts: &ResearchOptions,
    ) -> anyhow::Result<Vec<SourceResult>> {
        let search_query = if opts.focus_areas.is_empty() {
            query.to_string()
        } else {
            format!("{} ({})", query, opts.focus_areas.join(", "))
        };

        self.collaborators
            .search
            .search(
                &search_query,
                &SearchOptions {
                    max_results: opts.max_sources,
                    ..SearchOptions::default()
                },
            )
            .await
    }

    async fn lookup_related_events(&self, query: &str) -> anyhow::Result<Vec<Event>> {
        self.collaborators
            .store
            .fetch_events(&EventFilter {
                query: Some(query.to_string()),
                limit: Some(10),
                ..EventFilter::default()
            })
            .await
    }

    async fn summarize_historical_context(&self, query: &str) -> anyhow::Result<String> {
        let body = self
            .complete(
                "You are a research historian. Summarize the relevant historical background \
                 for the query in one tight paragraph. If you know nothing relevant, say so.",
                &format!("Query: {}", query),
                r#"{"historical_context": "one paragraph"}"#,
            )
            .await?;

        Ok(str_field(&body, "historical_context", ""))
    }

    async fn extract_events(
        &self,
        query: &str,
        source_digest: &str,
    ) -> anyhow::Result<Vec<String>> {
        if source_digest.is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .complete(
                "You are an event extractor. From the source excerpts, list the discrete \
                 factual events relevant to the query, one short statement each.",
                &format!("Query: {}\n\nSources:\n{}", query, source_digest),
                r#"{"events": ["event statement"]}"#,
            )
            .await?;

        Ok(str_list(&body, "events"))
    }

    async fn identify_trends(
        &self,
        query: &str,
        source_digest: &str,
        related_events: &[Event],
    ) -> anyhow::Result<Vec<String>> {
        let event_digest = crate::agents::digest_events(related_events, 10);

        let body = self
            .complete(
                "You are a trend analyst. Identify the significant trends relevant to the \
                 query, grounded in the provided material.",
                &format!(
                    "Query: {}\n\nSources:\n{}\n\nKnown events:\n{}",
                    query, source_digest, event_digest
                ),
                r#"{"trends": ["trend"]}"#,
            )
            .await?;

        Ok(str_list(&body, "trends"))
    }

    async fn assess_implications(
        &self,
        query: &str,
        opts: &ResearchOptions,
        source_digest: &str,
    ) -> anyhow::Result<Vec<String>> {
        let horizon_note = opts
            .time_horizon
            .map(|h| format!("Assess over a {} horizon.", h))
            .unwrap_or_default();

        let body = self
            .complete(
                "You are an impact analyst. Assess the concrete implications of the \
                 situation described by the query and sources.",
                &format!("Query: {}\n{}\n\nSources:\n{}", query, horizon_note, source_digest),
                r#"{"implications": ["implication"]}"#,
            )
            .await?;

        Ok(str_list(&body, "implications"))
    }

    #[allow(clippy::too_many_arguments)]
    async fn synthesize(
        &self,
        query: &str,
        historical_context: &str,
        trends: &[String],
        implications: &[String],
        extracted_events: &[String],
        related_events: &[Event],
        source_digest: &str,
        source_count: usize,
    ) -> PipelineResult<Analysis> {
        let user_prompt = format!(
            "Query: {}\n\nHistorical context:\n{}\n\nTrends:\n{}\n\nImplications:\n{}\n\n\
             Extracted events:\n{}\n\nKnown related events:\n{}\n\nRaw sources:\n{}",
            query,
            if historical_context.is_empty() { "(none)" } else { historical_context },
            bullet_list(trends),
            bullet_list(implications),
            bullet_list(extracted_events),
            crate::agents::digest_events(related_events, 10),
            if source_digest.is_empty() { "(none)" } else { source_digest },
        );

        let body = self
            .complete(
                "You are a senior intelligence analyst. Synthesize all the material into \
                 one coherent analysis: an executive summary, the key trends, and the \
                 implications. Stay within the material; do not speculate beyond it.",
                &user_prompt,
                r#"{"executive_summary": "2-3 paragraphs", "key_trends": ["trend"], "implications": ["implication"]}"#,
            )
            .await
            .map_err(|e| PipelineError::Synthesis(e.to_string()))?;

        let executive_summary = str_field(&body, "executive_summary", "");
        if executive_summary.is_empty() {
            warn!(query, "synthesis returned no executive summary");
            return Err(PipelineError::Synthesis(
                "model returned no executive summary".into(),
            ));
        }

        // Confidence is computed from input volume, never asked of the model.
        let confidence = analysis_confidence(source_count, related_events.len());

        Ok(Analysis {
            id: format!("analysis-{}", slug(query)),
            object_type: ObjectType::Analysis,
            scope: Scope::Global,
            executive_summary,
            key_trends: str_list(&body, "key_trends"),
            implications: str_list(&body, "implications"),
            referenced_event_ids: related_events.iter().map(|e| e.id.clone()).collect(),
            confidence,
            source_count,
            last_updated: Utc::now(),
        })
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_hint: &str,
    ) -> anyhow::Result<Value> {
        let response = self
            .collaborators
            .completion
            .complete_json(system_prompt, user_prompt, schema_hint)
            .await?;
        Ok(response.body)
    }
}

/// Deterministic analysis confidence from input volume.
pub fn analysis_confidence(source_count: usize, event_count: usize) -> u8 {
    let raw = source_count * 10 + event_count * 15;
    raw.min(100) as u8
}

fn digest_sources(sources: &[SourceResult]) -> String {
    sources
        .iter()
        .map(|s| format!("- {} ({})\n  {}", s.title, s.url, truncate(&s.snippet, 400)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

fn slug(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .take(5)
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}
