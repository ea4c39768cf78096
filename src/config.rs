//! Run configuration.
//!
//! The binary fills a [`Config`] from command-line flags and environment
//! variables; the library only sees the typed result.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::cache::CacheStore;
use crate::classifier::Classifier;
use crate::openai::OpenAiClientBuilder;
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::raindrop::RaindropClientBuilder;
use crate::reconciler::RateLimit;

/// Everything a run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub completion_api_key: String,
    pub bookmark_api_key: String,
    pub collection_id: i64,
    pub batch_size: NonZeroUsize,
    pub cache_file_path: PathBuf,
    pub tag_push_delay_seconds: f64,
    pub completion_model: String,
    /// Overrides the completion API base URL.
    pub completion_base_url: Option<String>,
    /// Overrides the bookmarking service base URL.
    pub bookmark_base_url: Option<String>,
}

impl Config {
    /// Returns the batching and write-back settings for this run.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            collection_id: self.collection_id,
            batch_size: self.batch_size,
            rate_limit: RateLimit::from_secs_f64(self.tag_push_delay_seconds),
        }
    }

    /// Builds the HTTP clients and assembles a [`Pipeline`].
    pub fn into_pipeline(self) -> Result<Pipeline> {
        let settings = self.pipeline_settings();

        let mut bookmarks = RaindropClientBuilder::new().api_key(self.bookmark_api_key);
        if let Some(url) = self.bookmark_base_url {
            bookmarks = bookmarks.base_url(url);
        }
        let bookmarks = bookmarks
            .build()
            .context("Failed to create bookmarking service client")?;

        let mut completion = OpenAiClientBuilder::new().api_key(self.completion_api_key);
        if let Some(url) = self.completion_base_url {
            completion = completion.base_url(url);
        }
        let completion = completion
            .build()
            .context("Failed to create completion API client")?;

        let classifier = Classifier::new(Arc::new(completion), self.completion_model);
        let store = CacheStore::new(self.cache_file_path);

        Ok(Pipeline::new(Arc::new(bookmarks), classifier, store, settings))
    }
}

/// Returns the snapshot file name for a run started at `started_at`.
///
/// # Examples
///
/// ```
/// use droptag::config::cache_file_name;
/// use time::macros::datetime;
///
/// assert_eq!(cache_file_name(datetime!(2023-04-05 06:07:08 UTC)), "tags-20230405060708.db");
/// ```
pub fn cache_file_name(started_at: OffsetDateTime) -> String {
    let format = format_description!("[year][month][day][hour][minute][second]");
    let stamp = started_at
        .format(format)
        .unwrap_or_else(|_| started_at.unix_timestamp().to_string());
    format!("tags-{stamp}.db")
}

/// Returns a new timestamped snapshot path under `dir`.
pub fn timestamped_cache_path(dir: &Path, started_at: OffsetDateTime) -> PathBuf {
    dir.join(cache_file_name(started_at))
}

/// Returns a new timestamped snapshot path in the platform data directory.
///
/// The path is `{data_dir}/droptag/tags-YYYYMMDDHHMMSS.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
pub fn default_cache_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(timestamped_cache_path(
        &data_dir.join("droptag"),
        OffsetDateTime::now_utc(),
    ))
}
