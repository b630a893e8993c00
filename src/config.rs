//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sentiscope.toml` files.

use crate::analysis::{DayBoundary, ThresholdPreset, ThresholdTable};
use crate::cli::OutputFormat;
use crate::error::EngineError;
use crate::report::RenderOptions;
use crate::source::RedditConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".sentiscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Content source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Classification thresholds.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Lexicon scorer settings.
    #[serde(default)]
    pub scorer: ScorerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output path. Printed to stdout when unset.
    #[serde(default)]
    pub output: Option<String>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where items come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Default subreddit.
    #[serde(default = "default_subreddit")]
    pub subreddit: String,

    /// Posts (and comments) fetched per search.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Include recent comments that mention the keyword.
    #[serde(default = "default_true")]
    pub include_comments: bool,

    /// Reddit base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent to Reddit.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            subreddit: default_subreddit(),
            limit: default_limit(),
            include_comments: true,
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_subreddit() -> String {
    "all".to_string()
}

fn default_limit() -> usize {
    25
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    RedditConfig::default().base_url
}

fn default_user_agent() -> String {
    RedditConfig::default().user_agent
}

fn default_timeout() -> u64 {
    30
}

impl SourceConfig {
    /// Reddit connection settings.
    pub fn reddit(&self, show_progress: bool) -> RedditConfig {
        RedditConfig {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout_seconds: self.timeout_seconds,
            show_progress,
        }
    }
}

/// Threshold preset plus optional per-cut-point overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Base preset (`compound` or `polarity`).
    #[serde(default)]
    pub preset: ThresholdPreset,

    #[serde(default)]
    pub very_positive: Option<f64>,
    #[serde(default)]
    pub positive: Option<f64>,
    #[serde(default)]
    pub slightly_positive: Option<f64>,
    #[serde(default)]
    pub slightly_negative: Option<f64>,
    #[serde(default)]
    pub negative: Option<f64>,
    #[serde(default)]
    pub very_negative: Option<f64>,
}

impl ClassifierConfig {
    /// The preset's table with overrides applied, validated.
    pub fn thresholds(&self) -> Result<ThresholdTable, EngineError> {
        let mut table = ThresholdTable::from_preset(self.preset);

        let overrides = [
            (self.very_positive, &mut table.very_positive),
            (self.positive, &mut table.positive),
            (self.slightly_positive, &mut table.slightly_positive),
            (self.slightly_negative, &mut table.slightly_negative),
            (self.negative, &mut table.negative),
            (self.very_negative, &mut table.very_negative),
        ];
        for (value, slot) in overrides {
            if let Some(v) = value {
                *slot = v;
            }
        }

        table.validate()?;
        Ok(table)
    }

    /// Label for report metadata, e.g. `compound` or `compound (custom)`.
    pub fn describe(&self) -> String {
        let customized = [
            self.very_positive,
            self.positive,
            self.slightly_positive,
            self.slightly_negative,
            self.negative,
            self.very_negative,
        ]
        .iter()
        .any(Option::is_some);

        if customized {
            format!("{} (custom)", self.preset)
        } else {
            self.preset.to_string()
        }
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Time zone for per-day buckets (`local` or `utc`).
    #[serde(default)]
    pub day_boundary: DayBoundary,
}

/// Lexicon scorer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Extra word valences in [-4, 4], e.g. `bullish = 2.0`.
    #[serde(default)]
    pub words: HashMap<String, f64>,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Characters of each item shown in listings.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Include the items-by-label section.
    #[serde(default = "default_true")]
    pub include_items: bool,

    /// Width of breakdown bars.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            include_items: true,
            bar_width: default_bar_width(),
        }
    }
}

fn default_preview_chars() -> usize {
    300
}

fn default_bar_width() -> usize {
    30
}

impl ReportConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            preview_chars: self.preview_chars,
            include_items: self.include_items,
            bar_width: self.bar_width,
        }
    }
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
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.sentiscope.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref subreddit) = args.subreddit {
            self.source.subreddit = subreddit.clone();
        }
        if let Some(limit) = args.limit {
            self.source.limit = limit;
        }
        if args.no_comments {
            self.source.include_comments = false;
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }
        if let Some(ref user_agent) = args.user_agent {
            self.source.user_agent = user_agent.clone();
        }

        if let Some(preset) = args.thresholds {
            self.classifier.preset = preset.into();
        }
        if let Some(boundary) = args.day_boundary {
            self.analysis.day_boundary = boundary.into();
        }

        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(preview_chars) = args.preview_chars {
            self.report.preview_chars = preview_chars;
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
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.subreddit, "all");
        assert_eq!(config.source.limit, 25);
        assert!(config.source.include_comments);
        assert_eq!(config.classifier.preset, ThresholdPreset::Compound);
        assert_eq!(config.analysis.day_boundary, DayBoundary::Local);
        assert_eq!(config.report.preview_chars, 300);
        assert_eq!(config.general.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "vibes.md"
format = "json"

[source]
subreddit = "rust"
limit = 50
include_comments = false

[classifier]
preset = "polarity"
very_positive = 0.3

[analysis]
day_boundary = "utc"

[scorer.words]
bullish = 2.0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output.as_deref(), Some("vibes.md"));
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.source.subreddit, "rust");
        assert_eq!(config.source.limit, 50);
        assert!(!config.source.include_comments);
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.analysis.day_boundary, DayBoundary::Utc);
        assert_eq!(config.scorer.words.get("bullish"), Some(&2.0));

        let table = config.classifier.thresholds().unwrap();
        assert_eq!(table.very_positive, 0.3);
        assert_eq!(table.positive, 0.1);
        assert_eq!(config.classifier.describe(), "polarity (custom)");
    }

    #[test]
    fn test_invalid_threshold_override() {
        let config = ClassifierConfig {
            positive: Some(0.9),
            ..ClassifierConfig::default()
        };
        assert!(matches!(
            config.thresholds(),
            Err(EngineError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_override_equal_to_neighbour_is_rejected() {
        let config: Config = toml::from_str("[classifier]\npositive = 0.5\n").unwrap();
        assert!(matches!(
            config.classifier.thresholds(),
            Err(EngineError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_verbose_from_file() {
        let config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        assert!(config.general.verbose);
        assert!(!Config::default().general.verbose);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        file.write_all(b"[source]\nsubreddit = \"programming\"\n").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.source.subreddit, "programming");
        assert_eq!(config.source.limit, 25);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[classifier]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.source.limit, 25);
    }
}
