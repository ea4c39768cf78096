//! Batcher and pipeline driver.
//!
//! One run fetches every bookmark in the collection, skips articles the cache
//! already has a label for, classifies the rest in fixed-size batches, and
//! finally pushes every cached label back to the bookmarking service.
//!
//! The cache is persisted after each batch, so an aborted run loses at most
//! the batch that was in flight. Articles whose classification was lost still
//! have an empty label and are picked up again by the next run.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cache::{CacheLoad, CacheStore, FingerprintCache};
use crate::classifier::Classifier;
use crate::models::{BookmarkItem, CacheRecord};
use crate::raindrop::BookmarkService;
use crate::reconciler::{self, RateLimit};
use crate::source;

/// Default number of articles per classification request.
pub const DEFAULT_BATCH_SIZE: usize = 15;

/// Knobs for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    /// Collection to scan.
    pub collection_id: i64,
    /// Number of items per classification request.
    pub batch_size: NonZeroUsize,
    /// Pause policy for tag write-back.
    pub rate_limit: RateLimit,
}

impl PipelineSettings {
    /// Settings for `collection_id` with the default batch size and rate limit.
    pub fn new(collection_id: i64) -> Self {
        Self {
            collection_id,
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            rate_limit: RateLimit::default(),
        }
    }
}

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct items fetched from the collection.
    pub items: usize,
    /// Batches the items were partitioned into.
    pub batches: usize,
    /// Batches sent to the classifier.
    pub classifier_calls: usize,
    /// Items skipped because the cache already had a label for them.
    pub already_labeled: usize,
    /// Labels written into the cache.
    pub labels_applied: usize,
    /// Articles returned by the classifier that were never submitted.
    pub unmatched: Vec<String>,
    /// Bookmarks whose tags were pushed.
    pub tags_pushed: usize,
}

/// Splits the item set into consecutive groups of at most `batch_size` items.
///
/// The order is the set's order, so the same items always produce the same
/// batches.
pub fn partition(items: &BTreeSet<BookmarkItem>, batch_size: NonZeroUsize) -> Vec<Vec<BookmarkItem>> {
    let items: Vec<BookmarkItem> = items.iter().cloned().collect();
    items
        .chunks(batch_size.get())
        .map(<[BookmarkItem]>::to_vec)
        .collect()
}

/// Registers a batch in the cache and returns the texts that need a label.
///
/// Items whose fingerprint already maps to a labeled record are skipped.
/// Every other item gets a fresh unlabeled record (replacing any earlier
/// unlabeled one, so the last identifier seen for a text wins) and its text is
/// returned for classification. The result has one entry per item marked, so
/// two items sharing a text are both counted and both submitted.
pub fn select_unlabeled(cache: &mut FingerprintCache, batch: &[BookmarkItem]) -> Vec<String> {
    let mut pending = Vec::new();

    for item in batch {
        let fingerprint = item.fingerprint();
        if cache.is_labeled(&fingerprint) {
            debug!(article = %item.text(), "skipping, already processed");
            continue;
        }

        cache.insert(fingerprint, CacheRecord::unlabeled(item.id(), item.text()));
        pending.push(item.text().to_string());
    }

    pending
}

/// Drives a full run against a bookmarking service and a classifier.
pub struct Pipeline {
    bookmarks: Arc<dyn BookmarkService>,
    classifier: Classifier,
    store: CacheStore,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Creates a pipeline.
    pub fn new(
        bookmarks: Arc<dyn BookmarkService>,
        classifier: Classifier,
        store: CacheStore,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            bookmarks,
            classifier,
            store,
            settings,
        }
    }

    /// Returns the classifier batches are sent to.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Returns the cache store this pipeline persists to.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Runs fetch, classification and tag write-back.
    ///
    /// # Errors
    ///
    /// Fails if fetching bookmarks, calling the classifier, persisting the
    /// cache or pushing a tag fails. Work completed before the failure is
    /// already persisted.
    pub fn run(&self) -> Result<RunSummary> {
        let items = source::fetch_all(self.bookmarks.as_ref(), self.settings.collection_id)
            .with_context(|| {
                format!(
                    "Failed to fetch bookmarks from collection {}",
                    self.settings.collection_id
                )
            })?;
        info!(items = items.len(), "fetched bookmarks");

        let cache = self.load_cache();
        let (cache, mut summary) = self.classify(&items, cache)?;

        summary.tags_pushed =
            reconciler::write_back(&cache, self.bookmarks.as_ref(), self.settings.rate_limit)
                .context("Failed to push tags")?;

        Ok(summary)
    }

    /// Loads the cache snapshot, falling back to an empty cache.
    pub fn load_cache(&self) -> FingerprintCache {
        match self.store.load() {
            CacheLoad::Restored(cache) => {
                info!(records = cache.len(), path = %self.store.path().display(), "loaded cache");
                cache
            }
            CacheLoad::Fresh { reason } => {
                warn!(%reason, "starting with an empty cache");
                FingerprintCache::new()
            }
        }
    }

    /// Classifies every unlabeled item, batch by batch.
    ///
    /// Takes the cache by value and hands it back with the new records and
    /// labels. The cache is persisted after every batch that touched it,
    /// including one whose classifier call failed.
    pub fn classify(
        &self,
        items: &BTreeSet<BookmarkItem>,
        mut cache: FingerprintCache,
    ) -> Result<(FingerprintCache, RunSummary)> {
        let batches = partition(items, self.settings.batch_size);
        let mut summary = RunSummary {
            items: items.len(),
            batches: batches.len(),
            ..RunSummary::default()
        };

        for (index, batch) in batches.iter().enumerate() {
            summary.already_labeled += batch
                .iter()
                .filter(|item| cache.is_labeled(&item.fingerprint()))
                .count();
            let pending = select_unlabeled(&mut cache, batch);

            if pending.len() <= 1 {
                info!(batch = index, pending = pending.len(), "no new items to process, skipping batch");
                if !pending.is_empty() {
                    self.persist(&cache)?;
                }
                continue;
            }

            info!(batch = index, pending = pending.len(), "processing items");
            summary.classifier_calls += 1;
            let classified = self.classifier.classify(&pending);

            if let Ok(labels) = &classified {
                let outcome = reconciler::apply_labels(&mut cache, labels);
                summary.labels_applied += outcome.applied;
                summary.unmatched.extend(outcome.unmatched);
            }
            self.persist(&cache)?;

            classified.with_context(|| format!("Classifier request for batch {index} failed"))?;
        }

        Ok((cache, summary))
    }

    fn persist(&self, cache: &FingerprintCache) -> Result<()> {
        self.store.persist(cache).with_context(|| {
            format!("Failed to persist cache to {}", self.store.path().display())
        })
    }
}
