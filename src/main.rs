//! sentiscope - sentiment breakdown of Reddit discussions
//!
//! A CLI tool that searches a subreddit for a keyword, classifies every
//! matching post and comment into seven sentiment labels, and reports the
//! label frequencies, the items per label and the average sentiment per day.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, invalid input file, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scorer;
mod session;
mod source;

use analysis::{Classifier, Pipeline};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::{BatchReport, ReportMetadata, SearchQuery, SentimentLabel};
use scorer::LexiconScorer;
use session::console::Console;
use source::{ContentProvider, JsonFileProvider, RedditProvider, Source};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Read configuration before logging starts so its `verbose` setting applies
    let loaded = load_config(&args);
    let verbose_by_default = matches!(loaded, Ok((ref config, _)) if config.general.verbose);

    // Initialize logging
    init_logging(args.log_level(verbose_by_default));

    info!("sentiscope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = match loaded {
        Ok((mut config, origin)) => {
            origin.log();
            config.merge_with_args(&args);
            if args.interactive {
                run_interactive(args, config).await
            } else {
                run_analysis(args, config).await
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Handle --init-config: generate a default .sentiscope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the subreddit, thresholds, lexicon and report.");
    Ok(())
}

/// Initialize logging at `level`.
///
/// Logs go to stderr so reports printed to stdout stay clean. `RUST_LOG`
/// takes precedence over the verbosity settings.
fn init_logging(level: tracing::Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Everything a run needs once configuration is resolved.
struct Engine {
    config: Config,
    scorer: LexiconScorer,
    classifier: Classifier,
    source: Source,
}

impl Engine {
    fn new(args: &Args, config: Config) -> Result<Self> {
        let scorer = LexiconScorer::with_overrides(&config.scorer.words);
        debug!("Lexicon holds {} words", scorer.lexicon_size());

        let thresholds = config
            .classifier
            .thresholds()
            .context("Invalid [classifier] settings")?;
        let classifier = Classifier::new(thresholds)?;

        let source = match args.input {
            Some(ref path) => {
                info!("Reading items from {}", path.display());
                Source::File(JsonFileProvider::new(path.clone()))
            }
            None => Source::Reddit(RedditProvider::new(config.source.reddit(!args.quiet))?),
        };

        Ok(Self {
            config,
            scorer,
            classifier,
            source,
        })
    }

    fn query(&self, keyword: &str) -> SearchQuery {
        SearchQuery {
            subreddit: self.config.source.subreddit.clone(),
            keyword: keyword.trim().to_string(),
            limit: self.config.source.limit,
            include_comments: self.config.source.include_comments,
        }
    }

    fn pipeline(&self) -> Pipeline<'_, LexiconScorer> {
        Pipeline::new(
            &self.scorer,
            self.classifier,
            self.config.analysis.day_boundary,
        )
    }
}

/// Run one search, then render and write the report.
async fn run_analysis(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();
    let engine = Engine::new(&args, config)?;
    let config = &engine.config;
    let query = engine.query(args.keyword());

    if !args.quiet {
        eprintln!(
            "🔎 Searching {} for \"{}\" (limit {}{})",
            engine.source.describe(),
            query.keyword,
            query.limit,
            if query.include_comments { ", with comments" } else { "" }
        );
        eprintln!("   Thresholds: {}", config.classifier.describe());
        eprintln!("   Day boundary: {}", config.analysis.day_boundary);
    }

    let outcome = engine.pipeline().run(&engine.source, &query).await?;
    if outcome.classified == 0 {
        warn!("No items matched \"{}\" in r/{}", query.keyword, query.subreddit);
    }

    let metadata = ReportMetadata {
        subreddit: query.subreddit.clone(),
        query: query.keyword.clone(),
        source: engine.source.describe(),
        generated_at: Utc::now(),
        thresholds: config.classifier.describe(),
        day_boundary: config.analysis.day_boundary.to_string(),
        items_analyzed: 0,
        posts: 0,
        comments: 0,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = BatchReport::from_outcome(metadata, outcome);
    let options = config.report.render_options();

    // --browse: write one label's items instead of the report
    if let Some(label) = args.browse {
        let label: SentimentLabel = label.into();
        info!(
            "{} of {} items labelled {}",
            report.frequencies.count(label),
            report.frequencies.total(),
            label
        );
        let listing =
            report::generate_label_listing(&report.items_by_label, label, options.preview_chars);
        write_output(config.general.output.as_deref(), &listing)?;
        return Ok(());
    }

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &options),
        OutputFormat::Text => report::generate_text_report(&report, &options),
    };

    write_output(config.general.output.as_deref(), &output)?;

    if let (Some(path), false) = (&config.general.output, args.quiet) {
        println!();
        print!(
            "{}",
            report::generate_summary(&report.frequencies, options.bar_width)
        );
        println!("   Duration: {:.1}s", report.metadata.duration_seconds);
        println!("\n✅ Report saved to: {}", path);
    }

    Ok(())
}

/// Write `content` to `path`, or to stdout when no path is set.
fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path)),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

/// Run the interactive session on stdin/stdout.
async fn run_interactive(args: Args, config: Config) -> Result<()> {
    let engine = Engine::new(&args, config)?;
    let defaults = engine.query(args.keyword());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let console = Console::new(
        engine.pipeline(),
        &engine.source,
        defaults,
        engine.config.report.render_options(),
        stdin.lock(),
        stdout.lock(),
    );
    console.run().await
}

/// Where the configuration came from. Logged once logging is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    WorkingDir,
    Defaults,
    Fallback(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::WorkingDir => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::WorkingDir)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Fallback(e))),
    }
}
