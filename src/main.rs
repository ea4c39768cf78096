use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use droptag::Config;
use droptag::config::default_cache_path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// droptag - classify bookmarks with a language model and tag them
#[derive(Parser, Debug)]
#[command(name = "droptag")]
#[command(about = "Classify Raindrop.io bookmarks with a completion model and write the label back as a tag")]
#[command(version)]
struct Cli {
    /// API key for the completion API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    completion_api_key: String,

    /// API token for the bookmarking service
    #[arg(long, env = "RAINDROP_KEY", hide_env_values = true)]
    bookmark_api_key: String,

    /// Collection to scan
    #[arg(long, env = "RAINDROP_COLLECTION_ID", allow_negative_numbers = true)]
    collection_id: i64,

    /// Number of items per classification request
    #[arg(long, env = "DROPTAG_BATCH_SIZE", default_value = "15")]
    batch_size: NonZeroUsize,

    /// Cache snapshot to resume from (default: a new timestamped file)
    #[arg(long = "cache-file", env = "DROPTAG_CACHE_FILE", value_name = "PATH")]
    cache_file_path: Option<PathBuf>,

    /// Seconds to wait between tag updates
    #[arg(long = "tag-push-delay", env = "DROPTAG_TAG_PUSH_DELAY", default_value = "0.5", value_name = "SECONDS", allow_negative_numbers = true)]
    tag_push_delay_seconds: f64,

    /// Completion model name
    #[arg(long = "model", env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    completion_model: String,

    /// Base URL of the completion API
    #[arg(long, env = "OPENAI_BASE_URL", hide = true)]
    completion_base_url: Option<String>,

    /// Base URL of the bookmarking service API
    #[arg(long, env = "RAINDROP_BASE_URL", hide = true)]
    bookmark_base_url: Option<String>,
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("droptag=info")),
        )
        .init();

    let config = match build_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("Error: {e:#}");
        std::process::exit(2);
    }
}

/// Exit status for an argument parsing outcome.
///
/// `--help` and `--version` succeed; every other parse failure is a
/// configuration error.
fn parse_exit_code(error: &clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Turns parsed arguments into a run configuration.
///
/// Fills in the timestamped cache path when none was given.
fn build_config(cli: Cli) -> Result<Config> {
    if !cli.tag_push_delay_seconds.is_finite() || cli.tag_push_delay_seconds < 0.0 {
        anyhow::bail!(
            "Tag push delay must be a non-negative number of seconds, got {}",
            cli.tag_push_delay_seconds
        );
    }

    let cache_file_path = match cli.cache_file_path {
        Some(path) => path,
        None => default_cache_path()?,
    };

    Ok(Config {
        completion_api_key: cli.completion_api_key,
        bookmark_api_key: cli.bookmark_api_key,
        collection_id: cli.collection_id,
        batch_size: cli.batch_size,
        cache_file_path,
        tag_push_delay_seconds: cli.tag_push_delay_seconds,
        completion_model: cli.completion_model,
        completion_base_url: cli.completion_base_url,
        bookmark_base_url: cli.bookmark_base_url,
    })
}

fn run(config: Config) -> Result<()> {
    info!(
        collection_id = config.collection_id,
        batch_size = config.batch_size.get(),
        cache_file = %config.cache_file_path.display(),
        model = %config.completion_model,
        "starting run"
    );

    let pipeline = config.into_pipeline().context("Failed to set up pipeline")?;
    let summary = pipeline.run()?;

    info!(
        items = summary.items,
        batches = summary.batches,
        classifier_calls = summary.classifier_calls,
        already_labeled = summary.already_labeled,
        labels_applied = summary.labels_applied,
        unmatched = summary.unmatched.len(),
        tags_pushed = summary.tags_pushed,
        model = %pipeline.classifier().model(),
        cache_file = %pipeline.store().path().display(),
        "run complete"
    );
    Ok(())
}
