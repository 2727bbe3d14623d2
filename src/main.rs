//! Command-line front end for the arena engine
//!
//! Reads ratings, articles and source records as JSON, runs them through
//! the [`RatingEngine`] facade and prints JSON results on stdout. Logs go
//! to stderr so the output stays machine readable.

use anyhow::{Context, Result};
use arena_engine::config::{validate_config, EngineConfig};
use arena_engine::metrics::EngineMetrics;
use arena_engine::{
    ContentSet, MatchResult, RatingEngine, RatingState, SourceId, SourceRecord,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Arena Engine - Glicko-2 ratings and Shapley quality attribution
#[derive(Parser)]
#[command(
    name = "arena-engine",
    version,
    about = "Rate knowledge sources from pairwise votes and rank their articles",
    long_about = "Arena Engine updates Glicko-2 ratings from head-to-head votes between \
                 knowledge sources, scores article quality, attributes blended quality with \
                 Shapley values and ranks sources by expected value. All input and output is JSON."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        global = true,
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without running a command")]
    dry_run: bool,

    /// Print metrics after the command
    #[arg(
        long,
        global = true,
        help = "Print Prometheus metrics to stderr after the command completes"
    )]
    print_metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Update both ratings after a vote
    Update {
        /// Rating of source A as JSON, defaults to the initial rating
        #[arg(long, value_name = "JSON")]
        a: Option<String>,
        /// Rating of source B as JSON, defaults to the initial rating
        #[arg(long, value_name = "JSON")]
        b: Option<String>,
        /// Vote result
        #[arg(long, value_enum)]
        result: ResultArg,
    },
    /// Probability that source A beats source B
    Predict {
        #[arg(long, value_name = "JSON")]
        a: String,
        #[arg(long, value_name = "JSON")]
        b: String,
    },
    /// Confidence band around a rating
    Interval {
        #[arg(long, value_name = "JSON")]
        rating: String,
    },
    /// Score one article (read from FILE or stdin)
    Score {
        /// Declared source of the article
        #[arg(long)]
        source: String,
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Score, attribute and rank a set of articles
    Rank {
        /// JSON object mapping source id to article text
        #[arg(long, value_name = "FILE")]
        contents: PathBuf,
        /// JSON array of persisted source records
        #[arg(long, value_name = "FILE")]
        records: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResultArg {
    WinA,
    WinB,
    Tie,
}

impl From<ResultArg> for MatchResult {
    fn from(arg: ResultArg) -> Self {
        match arg {
            ResultArg::WinA => MatchResult::WinA,
            ResultArg::WinB => MatchResult::WinB,
            ResultArg::Tie => MatchResult::Tie,
        }
    }
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file, environment and CLI arguments
fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = if let Some(config_path) = &args.config {
        EngineConfig::from_file(config_path)?
    } else {
        EngineConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    validate_config(&config).context("Invalid command line override")?;

    Ok(config)
}

/// Display configuration summary
fn display_config(config: &EngineConfig) {
    info!("Arena Engine {}", arena_engine::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Glicko-2: tau {} / epsilon {} / max {} iterations",
        config.rating.tau, config.rating.convergence_epsilon, config.rating.max_iterations
    );
    info!(
        "   Attribution: {:?} blend, max {} sources",
        config.attribution.blend, config.attribution.max_sources
    );
    info!(
        "   Rating range: {} - {}",
        config.ranking.rating_floor, config.ranking.rating_ceiling
    );
}

fn parse_json<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("Invalid {} JSON", what))
}

fn read_json_file<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))?;
    parse_json(&raw, what)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(engine: &RatingEngine, command: Command) -> Result<()> {
    match command {
        Command::Update { a, b, result } => {
            let rating_a = match a {
                Some(raw) => parse_json(&raw, "rating a")?,
                None => engine.initial_rating(),
            };
            let rating_b = match b {
                Some(raw) => parse_json(&raw, "rating b")?,
                None => engine.initial_rating(),
            };
            let pair = engine.update(&rating_a, &rating_b, result.into())?;
            print_json(&pair)
        }
        Command::Predict { a, b } => {
            let rating_a: RatingState = parse_json(&a, "rating a")?;
            let rating_b: RatingState = parse_json(&b, "rating b")?;
            let probability = engine.predict_outcome(&rating_a, &rating_b)?;
            print_json(&serde_json::json!({ "probability_a": probability }))
        }
        Command::Interval { rating } => {
            let rating: RatingState = parse_json(&rating, "rating")?;
            print_json(&engine.rating_interval(&rating)?)
        }
        Command::Score { source, file } => {
            let content = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read article {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("Failed to read article from stdin")?;
                    buffer
                }
            };
            let metrics = engine.score(&content, &source);
            print_json(&serde_json::json!({
                "source_id": source,
                "metrics": metrics,
                "overall_score": engine.overall_score(&metrics),
            }))
        }
        Command::Rank { contents, records } => {
            let contents: ContentSet = read_json_file(&contents, "contents")?;
            let records: BTreeMap<SourceId, SourceRecord> = match records {
                Some(path) => read_json_file::<Vec<SourceRecord>>(&path, "records")?
                    .into_iter()
                    .map(|record| (record.source_id.clone(), record))
                    .collect(),
                None => BTreeMap::new(),
            };
            debug!(
                sources = contents.len(),
                records = records.len(),
                "Ranking content set"
            );
            print_json(&engine.rank(&contents, &records)?)
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_config(&config);
        return Ok(());
    }

    let Some(command) = args.command else {
        display_config(&config);
        info!("No command given, see --help");
        return Ok(());
    };

    let metrics = Arc::new(EngineMetrics::new()?);
    let engine = RatingEngine::new(config)
        .context("Failed to initialize engine")?
        .with_metrics(metrics.clone());

    if let Err(e) = run(&engine, command) {
        error!("{:#}", e);
        if args.print_metrics {
            eprint!("{}", metrics.render()?);
        }
        std::process::exit(1);
    }

    if args.print_metrics {
        eprint!("{}", metrics.render()?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_log_level_is_validated() {
        let args = Args::parse_from(["arena-engine", "--log-level", "loud", "--dry-run"]);
        let err = load_config(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid log level"));

        let args = Args::parse_from(["arena-engine", "--log-level", "warn", "--dry-run"]);
        assert_eq!(load_config(&args).unwrap().service.log_level, "warn");
    }

    #[test]
    fn test_debug_flag_overrides_log_level() {
        let args = Args::parse_from(["arena-engine", "--log-level", "loud", "--debug", "--dry-run"]);
        assert_eq!(load_config(&args).unwrap().service.log_level, "debug");
    }
}
