//! Merges classifier output into the cache and pushes labels back as tags.

use std::thread;
use std::time::Duration;

use crate::cache::{FingerprintCache, fingerprint};
use crate::classifier::Labels;
use crate::raindrop::{BookmarkService, RaindropError};

/// Pause policy between consecutive tag pushes.
///
/// The bookmarking service rate-limits writes; the default waits half a
/// second between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimit {
    /// Push as fast as the service answers.
    None,
    /// Sleep for a fixed duration between pushes.
    FixedDelay(Duration),
}

impl RateLimit {
    /// Builds a policy from a delay in seconds.
    ///
    /// Zero, negative and non-finite values disable pausing.
    pub fn from_secs_f64(secs: f64) -> Self {
        match Duration::try_from_secs_f64(secs) {
            Ok(delay) if !delay.is_zero() => RateLimit::FixedDelay(delay),
            _ => RateLimit::None,
        }
    }

    /// Blocks the current thread for the configured delay.
    pub fn pause(&self) {
        if let RateLimit::FixedDelay(delay) = self {
            thread::sleep(*delay);
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        RateLimit::FixedDelay(Duration::from_millis(500))
    }
}

/// What happened when a batch of labels was merged into the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Number of cache records whose label was set.
    pub applied: usize,
    /// Articles named in the reply that match no cache record.
    pub unmatched: Vec<String>,
}

/// Writes each `(article, label)` pair onto the cache record for that article.
///
/// Articles are looked up by fingerprint. An article with no record was never
/// submitted (the model invented or rewrote it); it is logged and skipped.
pub fn apply_labels(cache: &mut FingerprintCache, labels: &Labels) -> Reconciliation {
    let mut outcome = Reconciliation::default();

    for (article, label) in labels {
        if cache.set_label(&fingerprint(article), label) {
            outcome.applied += 1;
        } else {
            tracing::warn!(article = %article, label = %label, "classifier returned an article that was not submitted");
            outcome.unmatched.push(article.clone());
        }
    }

    outcome
}

/// Pushes every non-empty cached label to its bookmark as the bookmark's tag.
///
/// Runs over the whole cache, so labels from earlier runs are pushed again;
/// replacing a tag set with the same tags is a no-op for the service. The
/// rate-limit pause is applied between pushes.
///
/// Returns the number of bookmarks updated.
///
/// # Errors
///
/// Stops at the first failed update.
pub fn write_back(
    cache: &FingerprintCache,
    service: &dyn BookmarkService,
    rate_limit: RateLimit,
) -> Result<usize, RaindropError> {
    let mut pushed = 0;

    for record in cache.labeled() {
        if pushed > 0 {
            rate_limit.pause();
        }

        tracing::info!(
            bookmark_id = %record.bookmark_id(),
            article = %record.article(),
            label = %record.label(),
            "updating tag"
        );
        service.update_tags(record.bookmark_id(), &[record.label().to_string()])?;
        pushed += 1;
    }

    Ok(pushed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookmarkId, CacheRecord};
    use crate::raindrop::RawBookmark;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingService {
        updates: Mutex<Vec<(BookmarkId, Vec<String>)>>,
        fail_after: Option<usize>,
    }

    impl BookmarkService for RecordingService {
        fn search_page(&self, _: i64, _: u32, _: u32) -> Result<Vec<RawBookmark>, RaindropError> {
            Ok(Vec::new())
        }

        fn update_tags(&self, id: BookmarkId, tags: &[String]) -> Result<(), RaindropError> {
            let mut updates = self.updates.lock().unwrap();
            if self.fail_after == Some(updates.len()) {
                return Err(RaindropError::Http {
                    status: 429,
                    body: "Too many requests".to_string(),
                });
            }
            updates.push((id, tags.to_vec()));
            Ok(())
        }
    }

    fn cache_with(records: &[(i64, &str, &str)]) -> FingerprintCache {
        records
            .iter()
            .map(|(id, article, label)| {
                (
                    fingerprint(article),
                    CacheRecord::new(BookmarkId::new(*id), *article, *label),
                )
            })
            .collect()
    }

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(a, l)| (a.to_string(), l.to_string()))
            .collect()
    }

    #[test]
    fn apply_labels_updates_matching_records() {
        let mut cache = cache_with(&[(1, "Foo", ""), (2, "Bar", "")]);

        let outcome = apply_labels(&mut cache, &labels(&[("Foo", "Technology"), ("Bar", "Music")]));

        assert_eq!(outcome.applied, 2);
        assert!(outcome.unmatched.is_empty());
        assert_eq!(cache.get(&fingerprint("Foo")).unwrap().label(), "Technology");
        assert_eq!(cache.get(&fingerprint("Bar")).unwrap().label(), "Music");
    }

    #[test]
    fn apply_labels_reports_hallucinated_articles() {
        let mut cache = cache_with(&[(1, "Foo", "")]);

        let outcome = apply_labels(
            &mut cache,
            &labels(&[("Foo", "Design"), ("Never submitted", "Finance")]),
        );

        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.unmatched, vec!["Never submitted".to_string()]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn apply_labels_with_empty_mapping_changes_nothing() {
        let mut cache = cache_with(&[(1, "Foo", "")]);
        let before = cache.clone();

        let outcome = apply_labels(&mut cache, &Labels::new());

        assert_eq!(outcome, Reconciliation::default());
        assert_eq!(cache, before);
    }

    #[test]
    fn write_back_pushes_only_labeled_records() {
        let cache = cache_with(&[(1, "Foo", "Technology"), (2, "Bar", ""), (3, "Baz", "Health")]);
        let service = RecordingService::default();

        let pushed = write_back(&cache, &service, RateLimit::None).unwrap();

        assert_eq!(pushed, 2);
        let mut updates = service.updates.lock().unwrap().clone();
        updates.sort();
        assert_eq!(
            updates,
            vec![
                (BookmarkId::new(1), vec!["Technology".to_string()]),
                (BookmarkId::new(3), vec!["Health".to_string()]),
            ]
        );
    }

    #[test]
    fn write_back_on_empty_cache_pushes_nothing() {
        let service = RecordingService::default();
        let pushed = write_back(&FingerprintCache::new(), &service, RateLimit::None).unwrap();
        assert_eq!(pushed, 0);
    }

    #[test]
    fn write_back_stops_at_first_failure() {
        let cache = cache_with(&[(1, "A", "Music"), (2, "B", "Music"), (3, "C", "Music")]);
        let service = RecordingService {
            fail_after: Some(1),
            ..Default::default()
        };

        let result = write_back(&cache, &service, RateLimit::None);

        assert!(matches!(result, Err(RaindropError::Http { status: 429, .. })));
        assert_eq!(service.updates.lock().unwrap().len(), 1);
    }

    #[test]
    fn write_back_pauses_between_pushes_only() {
        let cache = cache_with(&[(1, "A", "Music"), (2, "B", "Music"), (3, "C", "Music")]);
        let service = RecordingService::default();
        let start = Instant::now();

        write_back(&cache, &service, RateLimit::FixedDelay(Duration::from_millis(50))).unwrap();

        // Two pauses for three pushes
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(1000));
    }

    #[test]
    fn rate_limit_from_seconds() {
        assert_eq!(
            RateLimit::from_secs_f64(0.5),
            RateLimit::FixedDelay(Duration::from_millis(500))
        );
        assert_eq!(RateLimit::from_secs_f64(0.0), RateLimit::None);
        assert_eq!(RateLimit::from_secs_f64(-1.0), RateLimit::None);
        assert_eq!(RateLimit::default(), RateLimit::from_secs_f64(0.5));
    }
}
