//! Fingerprint cache: the record of which articles have already been classified.
//!
//! The cache maps a [`Fingerprint`] of an article's normalized text to a
//! [`CacheRecord`]. It is loaded once at startup through [`CacheStore::load`],
//! threaded through every batch, and written back with [`CacheStore::persist`]
//! after each batch so a crash loses at most the batch in flight.

mod schema;
mod store;

use std::collections::BTreeMap;

use crate::models::{CacheRecord, Fingerprint};

pub use store::{CacheLoad, CacheStore};

/// Computes the cache key for an article text.
///
/// Shorthand for [`Fingerprint::of`].
pub fn fingerprint(text: &str) -> Fingerprint {
    Fingerprint::of(text)
}

/// In-memory mapping from fingerprint to cache record.
///
/// Supports lookup, insert and label update. There is no removal: once an
/// article is seen, its record survives for the lifetime of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintCache {
    records: BTreeMap<Fingerprint, CacheRecord>,
}

impl FingerprintCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record for a fingerprint.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&CacheRecord> {
        self.records.get(fingerprint)
    }

    /// Returns true if the fingerprint has a record with a non-empty label.
    pub fn is_labeled(&self, fingerprint: &Fingerprint) -> bool {
        self.get(fingerprint).is_some_and(CacheRecord::is_labeled)
    }

    /// Inserts or overwrites the record stored under `fingerprint`.
    ///
    /// Returns the previous record, if any.
    pub fn insert(&mut self, fingerprint: Fingerprint, record: CacheRecord) -> Option<CacheRecord> {
        self.records.insert(fingerprint, record)
    }

    /// Sets the label of an existing record.
    ///
    /// Returns false, leaving the cache untouched, when no record exists.
    pub fn set_label(&mut self, fingerprint: &Fingerprint, label: &str) -> bool {
        match self.records.get_mut(fingerprint) {
            Some(record) => {
                record.set_label(label);
                true
            }
            None => false,
        }
    }

    /// Iterates over all records in fingerprint order.
    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &CacheRecord)> {
        self.records.iter()
    }

    /// Iterates over records that carry a non-empty label.
    pub fn labeled(&self) -> impl Iterator<Item = &CacheRecord> {
        self.records.values().filter(|r| r.is_labeled())
    }
}

impl FromIterator<(Fingerprint, CacheRecord)> for FingerprintCache {
    fn from_iter<I: IntoIterator<Item = (Fingerprint, CacheRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
