//! Markdown briefing generation.
//!
//! This module renders a full derivation run (signals, alerts,
//! recommendations, impact scenarios, and an optional research analysis)
//! into a Markdown briefing or pretty-printed JSON.

use crate::models::{Alert, Impact, Recommendation, ResearchOutcome, Signal};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Run metadata rendered at the top of every briefing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingMetadata {
    pub generated_at: DateTime<Utc>,
    pub model_used: String,
    pub events_considered: usize,
    pub duration_seconds: f64,
}

/// Everything one derivation run produced, bundled for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub metadata: BriefingMetadata,
    pub signals: Vec<Signal>,
    pub alerts: Vec<Alert>,
    pub recommendations: Vec<Recommendation>,
    pub impacts: Vec<Impact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research: Option<ResearchOutcome>,
}

/// Generate a complete Markdown briefing.
pub fn generate_markdown_briefing(briefing: &Briefing) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Intelligence Briefing\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&briefing.metadata));

    // Alerts lead the briefing; they are the time-sensitive part.
    output.push_str(&generate_alerts_section(&briefing.alerts));

    // Signals
    output.push_str(&generate_signals_section(&briefing.signals));

    // Recommendations
    output.push_str(&generate_recommendations_section(&briefing.recommendations));

    // Impact scenarios
    output.push_str(&generate_impacts_section(&briefing.impacts));

    // Research analysis, when a query was run
    if let Some(ref research) = briefing.research {
        output.push_str(&generate_research_section(research));
    }

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &BriefingMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Events Considered:** {}\n",
        metadata.events_considered
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the alerts section.
fn generate_alerts_section(alerts: &[Alert]) -> String {
    let mut section = String::new();

    section.push_str("## Alerts\n\n");

    if alerts.is_empty() {
        section.push_str("No alerts fired on this run.\n\n");
        return section;
    }

    for alert in alerts {
        section.push_str(&format!(
            "### {} {} - {}\n\n",
            alert.severity.emoji(),
            alert.severity.to_string().to_uppercase(),
            alert.trigger_reason
        ));
        section.push_str(&format!(
            "*Scope: {} | Impact: {} | Confidence: {} | Sources: {}*\n\n",
            alert.scope, alert.impact, alert.confidence, alert.source_count
        ));
        section.push_str(&format!("**Thresholds:** {}\n\n", alert.threshold_exceeded));
    }

    section
}

/// Generate the signals section.
fn generate_signals_section(signals: &[Signal]) -> String {
    let mut section = String::new();

    section.push_str("## Signals\n\n");

    if signals.is_empty() {
        section.push_str("No event group met the minimum size for a signal.\n\n");
        return section;
    }

    section.push_str("| Signal | Scope | Impact | Confidence | Horizon | Events |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");
    for signal in signals {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            signal.title,
            signal.scope,
            signal.impact_score,
            signal.confidence_score,
            signal.time_horizon,
            signal.related_event_ids.len()
        ));
    }
    section.push('\n');

    for signal in signals {
        section.push_str(&format!("### {}\n\n", signal.title));
        section.push_str(&format!("{}\n\n", signal.summary));
        if !signal.why_it_matters.is_empty() {
            section.push_str(&format!("> 💡 {}\n\n", signal.why_it_matters));
        }
    }

    section
}

/// Generate the recommendations section.
fn generate_recommendations_section(recommendations: &[Recommendation]) -> String {
    let mut section = String::new();

    section.push_str("## Recommendations\n\n");

    if recommendations.is_empty() {
        section.push_str("No signal qualified for a recommendation.\n\n");
        return section;
    }

    for (i, rec) in recommendations.iter().enumerate() {
        section.push_str(&format!("{}. **{}**\n", i + 1, rec.action));
        section.push_str(&format!(
            "   *Risk: {} | Impact: {} | Confidence: {}*\n",
            rec.risk_level, rec.impact, rec.confidence
        ));
        section.push_str(&format!("   {}\n\n", rec.rationale));
    }

    section
}

/// Generate the impact scenarios section.
fn generate_impacts_section(impacts: &[Impact]) -> String {
    if impacts.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Impact Scenarios\n\n");

    for impact in impacts {
        section.push_str(&format!("### {}\n\n", impact.risk_headline));
        section.push_str(&format!(
            "*Probability: {} | Magnitude: {} | Timeframe: {}*\n\n",
            impact.probability, impact.magnitude, impact.timeframe
        ));

        if !impact.assumptions.is_empty() {
            section.push_str("**Assumptions:**\n\n");
            for assumption in &impact.assumptions {
                section.push_str(&format!("- {}\n", assumption));
            }
            section.push('\n');
        }

        if !impact.pathways.first_order.is_empty() {
            section.push_str("**First-order effects:**\n\n");
            for effect in &impact.pathways.first_order {
                section.push_str(&format!(
                    "- {} (confidence {})\n",
                    effect.description, effect.confidence
                ));
            }
            section.push('\n');
        }

        if !impact.pathways.second_order.is_empty() {
            section.push_str("**Second-order effects:**\n\n");
            for effect in &impact.pathways.second_order {
                section.push_str(&format!(
                    "- {} (confidence {})\n",
                    effect.description, effect.confidence
                ));
            }
            section.push('\n');
        }

        section.push_str("**Invalidated if:**\n\n");
        for condition in &impact.invalidation_conditions {
            section.push_str(&format!("- {}\n", condition));
        }
        section.push('\n');
    }

    section
}

/// Generate the research analysis section.
fn generate_research_section(research: &ResearchOutcome) -> String {
    let mut section = String::new();

    section.push_str("## Research Analysis\n\n");
    section.push_str(&format!("{}\n\n", research.analysis.executive_summary));

    if !research.analysis.key_trends.is_empty() {
        section.push_str("### Key Trends\n\n");
        for trend in &research.analysis.key_trends {
            section.push_str(&format!("- {}\n", trend));
        }
        section.push('\n');
    }

    if !research.analysis.implications.is_empty() {
        section.push_str("### Implications\n\n");
        for implication in &research.analysis.implications {
            section.push_str(&format!("- {}\n", implication));
        }
        section.push('\n');
    }

    if !research.sources.is_empty() {
        section.push_str("### Sources\n\n");
        for source in &research.sources {
            section.push_str(&format!("- [{}]({})\n", source.title, source.url));
        }
        section.push('\n');
    }

    section.push_str(&format!(
        "*Confidence: {} | Agents: {} | Elapsed: {:.1}s*\n\n",
        research.analysis.confidence,
        research.agents_used.join(", "),
        research.elapsed_ms as f64 / 1000.0
    ));

    section
}

/// Generate the briefing footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Briefing generated by intelpipe*\n");

    footer
}

/// Generate a JSON briefing.
pub fn generate_json_briefing(briefing: &Briefing) -> Result<String> {
    serde_json::to_string_pretty(briefing).map_err(Into::into)
}

/// Write a Markdown briefing to a file.
pub fn write_briefing(briefing: &Briefing, path: &Path) -> Result<()> {
    let content = generate_markdown_briefing(briefing);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
