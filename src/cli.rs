//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{Horizon, Severity};
use clap::Parser;
use std::path::PathBuf;

/// intelpipe - derive intelligence signals, alerts, and recommendations from events
///
/// Reads ingested news events from a JSON file, runs the deterministic
/// derivation chain, optionally enriches the output with LLM agents, and
/// writes a Markdown or JSON briefing.
///
/// Examples:
///   intelpipe --events events.json
///   intelpipe --events events.json --sector Energy --format json
///   intelpipe --events events.json --research "semiconductor supply risk"
///   intelpipe --events events.json --dry-run
///   intelpipe --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the events JSON file
    ///
    /// An array of event objects as produced by ingestion.
    /// Not required when using --init-config.
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub events: Option<PathBuf>,

    /// Run a deep research query in addition to derivation
    #[arg(short, long, value_name = "QUERY")]
    pub research: Option<String>,

    /// Model to use for the LLM agents
    ///
    /// Can also be set via INTELPIPE_MODEL env var or .intelpipe.toml config.
    #[arg(short, long, default_value = "gpt-4o-mini", env = "INTELPIPE_MODEL")]
    pub model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, default_value = "https://api.openai.com/v1", env = "OPENAI_API_URL")]
    pub api_url: String,

    /// Output file path for the briefing
    #[arg(short, long, default_value = "briefing.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .intelpipe.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Reader's sector, for tailored recommendations
    #[arg(long, value_name = "SECTOR")]
    pub sector: Option<String>,

    /// Reader's role, for tailored recommendations
    #[arg(long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Reader's company, for tailored recommendations
    #[arg(long, value_name = "COMPANY")]
    pub company: Option<String>,

    /// Minimum signal impact for an alert (0-100)
    #[arg(long, value_name = "SCORE")]
    pub impact_threshold: Option<u8>,

    /// Minimum signal confidence for an alert (0-100)
    #[arg(long, value_name = "SCORE")]
    pub confidence_threshold: Option<u8>,

    /// Suppress alerts below this severity
    ///
    /// Values: moderate, high, critical
    #[arg(long, value_name = "LEVEL")]
    pub severity_floor: Option<SeverityLevel>,

    /// Maximum web sources a research query consults
    #[arg(long, value_name = "COUNT")]
    pub max_sources: Option<usize>,

    /// Focus areas for the research query (comma-separated)
    ///
    /// Example: --focus "supply chains,pricing"
    #[arg(long, value_name = "AREAS", value_delimiter = ',')]
    pub focus: Option<Vec<String>>,

    /// Time horizon for the research query
    ///
    /// Values: immediate, short, medium, long
    #[arg(long, value_name = "HORIZON")]
    pub horizon: Option<HorizonLevel>,

    /// Check a ticker for a price/signal disconnect
    #[arg(long, value_name = "SYMBOL")]
    pub symbol: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long, default_value = "0.2")]
    pub temperature: f32,

    /// Dry run: derive signals, alerts, and recommendations without
    /// calling any LLM agent
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .intelpipe.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the briefing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Severity level for --severity-floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SeverityLevel {
    Moderate,
    High,
    Critical,
}

impl From<SeverityLevel> for Severity {
    fn from(level: SeverityLevel) -> Self {
        match level {
            SeverityLevel::Moderate => Severity::Moderate,
            SeverityLevel::High => Severity::High,
            SeverityLevel::Critical => Severity::Critical,
        }
    }
}

/// Horizon value for --horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HorizonLevel {
    Immediate,
    Short,
    Medium,
    Long,
}

impl From<HorizonLevel> for Horizon {
    fn from(level: HorizonLevel) -> Self {
        match level {
            HorizonLevel::Immediate => Horizon::Immediate,
            HorizonLevel::Short => Horizon::Short,
            HorizonLevel::Medium => Horizon::Medium,
            HorizonLevel::Long => Horizon::Long,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate events file if provided
        if let Some(ref events_path) = self.events {
            if !events_path.exists() {
                return Err(format!(
                    "Events file does not exist: {}",
                    events_path.display()
                ));
            }
        }

        // Validate API URL format (not needed for dry-run)
        if !self.dry_run
            && !self.api_url.starts_with("http://")
            && !self.api_url.starts_with("https://")
        {
            return Err("API URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Validate threshold ranges
        if let Some(impact) = self.impact_threshold {
            if impact > 100 {
                return Err("Impact threshold must be between 0 and 100".to_string());
            }
        }
        if let Some(confidence) = self.confidence_threshold {
            if confidence > 100 {
                return Err("Confidence threshold must be between 0 and 100".to_string());
            }
        }

        // Validate research query
        if let Some(ref query) = self.research {
            if query.trim().is_empty() {
                return Err("Research query cannot be empty".to_string());
            }
        }

        if let Some(max_sources) = self.max_sources {
            if max_sources == 0 {
                return Err("Max sources must be at least 1".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }
        if self.dry_run && self.research.is_some() {
            return Err("Cannot use --research with --dry-run".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            events: None,
            research: None,
            model: "test".to_string(),
            api_url: "https://api.openai.com/v1".to_string(),
            output: PathBuf::from("briefing.md"),
            format: OutputFormat::Markdown,
            config: None,
            verbose: false,
            quiet: false,
            sector: None,
            role: None,
            company: None,
            impact_threshold: None,
            confidence_threshold: None,
            severity_floor: None,
            max_sources: None,
            focus: None,
            horizon: None,
            symbol: None,
            temperature: 0.2,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_invalid_api_url() {
        let mut args = make_args();
        args.api_url = "ftp://somewhere".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_empty_research_query() {
        let mut args = make_args();
        args.research = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_threshold_range() {
        let mut args = make_args();
        args.impact_threshold = Some(120);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_severity_level_conversion() {
        assert_eq!(Severity::from(SeverityLevel::High), Severity::High);
        assert_eq!(Horizon::from(HorizonLevel::Short), Horizon::Short);
    }
}
