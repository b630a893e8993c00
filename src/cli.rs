//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::{DayBoundary, ThresholdPreset};
use crate::models::SentimentLabel;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// sentiscope - sentiment breakdown of Reddit discussions
///
/// Searches a subreddit for a keyword, scores every matching post and
/// comment, and reports how opinion splits across seven sentiment labels
/// and how it moves day by day.
///
/// Examples:
///   sentiscope --query "borrow checker" --subreddit rust
///   sentiscope -q rust -l 100 --format json -o rust.json
///   sentiscope -q tokio --input saved_items.jsonl --browse very-negative
///   sentiscope --interactive
///   sentiscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Search keyword
    #[arg(
        short,
        long,
        value_name = "KEYWORD",
        required_unless_present_any = ["init_config", "interactive"]
    )]
    pub query: Option<String>,

    /// Subreddit to search (without r/), or "all"
    #[arg(short, long, value_name = "NAME")]
    pub subreddit: Option<String>,

    /// Maximum number of posts, and of comments, to analyze
    #[arg(short, long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Read items from a JSON (array) or JSON Lines file instead of Reddit
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Only analyze posts, skip comments
    #[arg(long)]
    pub no_comments: bool,

    /// Threshold preset matching the scorer's scale
    #[arg(long, value_name = "PRESET")]
    pub thresholds: Option<ThresholdArg>,

    /// Time zone used to group items by day
    #[arg(long, value_name = "ZONE")]
    pub day_boundary: Option<DayBoundaryArg>,

    /// Output format (markdown, json, text)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write only the items classified under this label (to --output or stdout)
    #[arg(long, value_name = "LABEL")]
    pub browse: Option<LabelArg>,

    /// Characters of each item shown in listings
    #[arg(long, value_name = "CHARS")]
    pub preview_chars: Option<usize>,

    /// Start an interactive session (prompts for searches, browse by label)
    #[arg(short, long)]
    pub interactive: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// User agent sent to Reddit
    #[arg(long, value_name = "UA", env = "SENTISCOPE_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sentiscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(long)]
    pub quiet: bool,

    /// Generate a default .sentiscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Plain text, one block per item
    Text,
}

/// Threshold preset for --thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ThresholdArg {
    Compound,
    Polarity,
}

impl From<ThresholdArg> for ThresholdPreset {
    fn from(arg: ThresholdArg) -> Self {
        match arg {
            ThresholdArg::Compound => ThresholdPreset::Compound,
            ThresholdArg::Polarity => ThresholdPreset::Polarity,
        }
    }
}

/// Day boundary for --day-boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DayBoundaryArg {
    Local,
    Utc,
}

impl From<DayBoundaryArg> for DayBoundary {
    fn from(arg: DayBoundaryArg) -> Self {
        match arg {
            DayBoundaryArg::Local => DayBoundary::Local,
            DayBoundaryArg::Utc => DayBoundary::Utc,
        }
    }
}

/// Sentiment label for --browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LabelArg {
    VeryPositive,
    Positive,
    SlightlyPositive,
    Neutral,
    SlightlyNegative,
    Negative,
    VeryNegative,
}

impl From<LabelArg> for SentimentLabel {
    fn from(arg: LabelArg) -> Self {
        match arg {
            LabelArg::VeryPositive => SentimentLabel::VeryPositive,
            LabelArg::Positive => SentimentLabel::Positive,
            LabelArg::SlightlyPositive => SentimentLabel::SlightlyPositive,
            LabelArg::Neutral => SentimentLabel::Neutral,
            LabelArg::SlightlyNegative => SentimentLabel::SlightlyNegative,
            LabelArg::Negative => SentimentLabel::Negative,
            LabelArg::VeryNegative => SentimentLabel::VeryNegative,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The search keyword, empty if not given (validated beforehand).
    pub fn keyword(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if !self.interactive && self.keyword().trim().is_empty() {
            return Err("Search keyword must not be empty".to_string());
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        if self.preview_chars == Some(0) {
            return Err("Preview length must be at least 1 character".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.interactive && self.browse.is_some() {
            return Err("--browse is not available in interactive mode".to_string());
        }

        if self.browse.is_some() && self.format.is_some() {
            return Err("--browse prints a plain listing and cannot be combined with --format".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_by_default` comes from the config file; `--quiet` overrides it.
    pub fn log_level(&self, verbose_by_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_by_default {
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
            query: Some("rust".to_string()),
            subreddit: None,
            limit: None,
            input: None,
            no_comments: false,
            thresholds: None,
            day_boundary: None,
            format: None,
            output: None,
            browse: None,
            preview_chars: None,
            interactive: false,
            timeout: None,
            user_agent: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "sentiscope",
            "-q",
            "borrow checker",
            "-s",
            "rust",
            "--thresholds",
            "polarity",
            "--browse",
            "very-negative",
            "--format",
            "text",
        ])
        .unwrap();

        assert_eq!(args.keyword(), "borrow checker");
        assert_eq!(args.subreddit.as_deref(), Some("rust"));
        assert_eq!(args.thresholds, Some(ThresholdArg::Polarity));
        assert_eq!(args.browse.map(SentimentLabel::from), Some(SentimentLabel::VeryNegative));
        assert_eq!(args.format, Some(OutputFormat::Text));
    }

    #[test]
    fn test_query_required_unless_interactive() {
        assert!(Args::try_parse_from(["sentiscope"]).is_err());
        assert!(Args::try_parse_from(["sentiscope", "--interactive"]).is_ok());
        assert!(Args::try_parse_from(["sentiscope", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut args = make_args();
        assert!(args.validate().is_ok());

        args.limit = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.query = Some("   ".to_string());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.input = Some(PathBuf::from("/no/such/items.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.interactive = true;
        args.browse = Some(LabelArg::Neutral);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.browse = Some(LabelArg::Negative);
        args.format = Some(OutputFormat::Json);
        assert!(args.validate().is_err());

        // The listing can still go to a file
        args.format = None;
        args.output = Some(PathBuf::from("negative.txt"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
