//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.intelpipe.toml` files.

use crate::models::Severity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Alert and recommendation thresholds.
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Deep research settings.
    #[serde(default)]
    pub research: ResearchConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "briefing.md".to_string()
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// OpenAI-compatible API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout() -> u64 {
    60
}

/// Alert and recommendation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum signal impact for an alert.
    #[serde(default = "default_impact_threshold")]
    pub impact: u8,

    /// Minimum signal confidence for an alert.
    #[serde(default = "default_confidence_threshold")]
    pub confidence: u8,

    /// Alerts below this severity are suppressed.
    #[serde(default = "default_severity_floor")]
    pub severity_floor: Severity,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            impact: default_impact_threshold(),
            confidence: default_confidence_threshold(),
            severity_floor: default_severity_floor(),
        }
    }
}

fn default_impact_threshold() -> u8 {
    70
}

fn default_confidence_threshold() -> u8 {
    60
}

fn default_severity_floor() -> Severity {
    Severity::Moderate
}

/// Deep research settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Maximum web sources one query consults.
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    /// Per-subtask timeout in seconds.
    #[serde(default = "default_subtask_timeout")]
    pub subtask_timeout_seconds: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_sources: default_max_sources(),
            subtask_timeout_seconds: default_subtask_timeout(),
        }
    }
}

fn default_max_sources() -> usize {
    5
}

fn default_subtask_timeout() -> u64 {
    45
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".intelpipe.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - always override since they have defaults in CLI
        self.model.name = args.model.clone();
        self.model.api_url = args.api_url.clone();
        self.model.temperature = args.temperature;

        // Thresholds - only override if explicitly provided via CLI
        if let Some(impact) = args.impact_threshold {
            self.thresholds.impact = impact;
        }
        if let Some(confidence) = args.confidence_threshold {
            self.thresholds.confidence = confidence;
        }
        if let Some(floor) = args.severity_floor {
            self.thresholds.severity_floor = floor.into();
        }

        // Research settings
        if let Some(max_sources) = args.max_sources {
            self.research.max_sources = max_sources;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.thresholds.impact, 70);
        assert_eq!(config.thresholds.confidence, 60);
        assert_eq!(config.thresholds.severity_floor, Severity::Moderate);
        assert_eq!(config.research.max_sources, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_briefing.md"
verbose = true

[model]
name = "gpt-4o"
temperature = 0.1

[thresholds]
impact = 80
severity_floor = "high"

[research]
max_sources = 8
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_briefing.md");
        assert!(config.general.verbose);
        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.model.temperature, 0.1);
        assert_eq!(config.thresholds.impact, 80);
        assert_eq!(config.thresholds.confidence, 60);
        assert_eq!(config.thresholds.severity_floor, Severity::High);
        assert_eq!(config.research.max_sources, 8);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[thresholds]"));
        assert!(toml_str.contains("[research]"));
    }
}
