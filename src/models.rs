//! Data model for the intelligence derivation pipeline.
//!
//! Every derived object shares the same base contract (id, type, scope,
//! confidence, impact, horizon, source count, last-updated timestamp) and
//! carries only the fields its consuming surface expects. Relationships are
//! unidirectional id references; consumers resolve them against the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator for every intelligence object, set at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Event,
    Signal,
    Recommendation,
    Alert,
    Analysis,
    Impact,
    Metric,
}

impl ObjectType {
    fn event() -> Self {
        ObjectType::Event
    }
}

/// Geographic/structural scope of an object.
///
/// `None` scope only ever appears on freshly-ingested events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Regional,
    Sectorial,
    Asset,
    Actor,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Regional => write!(f, "regional"),
            Scope::Sectorial => write!(f, "sectorial"),
            Scope::Asset => write!(f, "asset"),
            Scope::Actor => write!(f, "actor"),
        }
    }
}

/// Time horizon over which an object is expected to matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Immediate,
    Short,
    Medium,
    Long,
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::Immediate => write!(f, "immediate"),
            Horizon::Short => write!(f, "short"),
            Horizon::Medium => write!(f, "medium"),
            Horizon::Long => write!(f, "long"),
        }
    }
}

impl Horizon {
    /// Parse a horizon from loosely-typed model output.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "immediate" | "now" => Some(Horizon::Immediate),
            "short" | "short-term" | "short_term" => Some(Horizon::Short),
            "medium" | "medium-term" | "medium_term" => Some(Horizon::Medium),
            "long" | "long-term" | "long_term" => Some(Horizon::Long),
            _ => None,
        }
    }
}

/// Severity of a threshold alert (moderate < high < critical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Moderate,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Moderate => write!(f, "moderate"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Moderate => "🟡",
            Severity::High => "🟠",
            Severity::Critical => "🔴",
        }
    }
}

/// Risk level attached to a recommendation (low < medium < high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// An atomic ingested fact. Created by ingestion, read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type", default = "ObjectType::event")]
    pub object_type: ObjectType,
    /// Null for freshly-ingested events; set once derivation scopes them.
    #[serde(default)]
    pub scope: Option<Scope>,
    pub headline: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    /// Source/data quality, 0-100. Not importance.
    pub confidence: u8,
    /// Null before any deriver has scored the event.
    #[serde(default)]
    pub impact: Option<u8>,
    #[serde(default)]
    pub horizon: Option<Horizon>,
}

/// An interpreted pattern derived from a qualifying group of events.
///
/// Computed on query, never persisted as canonical truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub scope: Scope,
    pub title: String,
    pub summary: String,
    pub impact_score: u8,
    pub confidence_score: u8,
    pub time_horizon: Horizon,
    pub related_event_ids: Vec<String>,
    pub why_it_matters: String,
    pub source_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// A threshold-triggered notification derived from exactly one signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub scope: Scope,
    pub severity: Severity,
    pub trigger_reason: String,
    /// Names every threshold that fired and its configured value.
    pub threshold_exceeded: String,
    pub related_signal_ids: Vec<String>,
    pub impact: u8,
    pub confidence: u8,
    pub source_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// An action proposal derived from exactly one qualifying signal.
///
/// The recommendation set is always a function of the signal set; none is
/// ever fabricated independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub scope: Scope,
    pub action: String,
    pub rationale: String,
    pub risk_level: RiskLevel,
    pub supporting_signal_ids: Vec<String>,
    pub impact: u8,
    pub confidence: u8,
    pub source_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// A synthesized narrative, from a thematic event cluster or a research query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub scope: Scope,
    pub executive_summary: String,
    pub key_trends: Vec<String>,
    pub implications: Vec<String>,
    pub referenced_event_ids: Vec<String>,
    pub confidence: u8,
    pub source_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// One projected effect inside an impact pathway, with its own confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedEffect {
    pub description: String,
    pub confidence: u8,
}

/// First- and second-order effect chains of an impact scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectPathways {
    pub first_order: Vec<ProjectedEffect>,
    pub second_order: Vec<ProjectedEffect>,
}

/// A probabilistic future scenario derived from one or more signals.
///
/// Invariant: `invalidation_conditions` is never empty. Construction
/// default-fills a generic condition when the model omits one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Impact {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub scope: Scope,
    pub risk_headline: String,
    /// Probability the scenario materializes, 0-100.
    pub probability: u8,
    /// Magnitude if it does, 0-100.
    pub magnitude: u8,
    pub timeframe: Horizon,
    pub assumptions: Vec<String>,
    pub pathways: EffectPathways,
    pub invalidation_conditions: Vec<String>,
    pub confidence: u8,
    pub source_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// Display-layer explanation of a signal. Optional enrichment; a signal
/// exists without it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalExplanation {
    pub headline: String,
    pub narrative: String,
    pub drivers: Vec<String>,
    pub watch_items: Vec<String>,
    pub confidence: u8,
}

/// LLM-refined title/summary/why-it-matters for a signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalEnrichment {
    pub refined_title: String,
    pub refined_summary: String,
    pub why_it_matters: String,
    pub confidence: u8,
}

/// Result of the market-disconnect detector: does price action disagree
/// with the derived signal picture for a symbol?
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketDisconnect {
    pub symbol: String,
    pub disconnect_detected: bool,
    pub narrative: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<PriceSnapshot>,
    pub confidence: u8,
}

/// Operator-facing explanation of why an alert fired and what to do about it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertExplanation {
    pub explanation: String,
    pub recommended_posture: String,
    pub confidence: u8,
}

/// Point-in-time market quote from the market-data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub price: f64,
    pub change_percent: f64,
    pub as_of: DateTime<Utc>,
}

/// One document returned by the web-search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub score: f64,
}

/// Everything a deep-research query returns: the analysis itself plus the
/// observability envelope (sources consulted, wall-clock time, sub-agents
/// that actually ran).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOutcome {
    pub analysis: Analysis,
    pub sources: Vec<SourceResult>,
    pub elapsed_ms: u64,
    pub agents_used: Vec<String>,
}
