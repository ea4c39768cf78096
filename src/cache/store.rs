use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tempfile::NamedTempFile;

use super::FingerprintCache;
use super::schema::{INSERT_RECORD, SELECT_RECORDS, SNAPSHOT_SCHEMA};
use crate::models::{BookmarkId, CacheRecord, Fingerprint};

/// Outcome of loading a cache snapshot.
///
/// Loading never fails: a missing or unreadable snapshot yields an empty
/// cache together with the reason, which the caller reports as a warning.
#[derive(Debug)]
pub enum CacheLoad {
    /// A prior snapshot was read successfully.
    Restored(FingerprintCache),
    /// No usable snapshot; start from an empty cache.
    Fresh { reason: String },
}

impl CacheLoad {
    /// Returns the loaded cache, or an empty one for [`CacheLoad::Fresh`].
    pub fn into_cache(self) -> FingerprintCache {
        match self {
            CacheLoad::Restored(cache) => cache,
            CacheLoad::Fresh { .. } => FingerprintCache::new(),
        }
    }
}

/// Durable snapshot of a [`FingerprintCache`] in a SQLite file.
///
/// Each [`persist`](CacheStore::persist) writes a complete new snapshot to a
/// temporary file beside the target and renames it into place, so readers
/// only ever see the previous snapshot or the new one.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Creates a store backed by the snapshot file at `path`.
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot.
    ///
    /// Missing files, non-SQLite files and files without the expected table
    /// all produce [`CacheLoad::Fresh`].
    pub fn load(&self) -> CacheLoad {
        if !self.path.exists() {
            return CacheLoad::Fresh {
                reason: format!("no snapshot at {}", self.path.display()),
            };
        }

        match read_snapshot(&self.path) {
            Ok(cache) => CacheLoad::Restored(cache),
            Err(e) => CacheLoad::Fresh {
                reason: format!("could not read {}: {e:#}", self.path.display()),
            },
        }
    }

    /// Overwrites the snapshot with the full contents of `cache`.
    pub fn persist(&self, cache: &FingerprintCache) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        let staged = NamedTempFile::new_in(dir).context("Failed to create staging snapshot")?;
        write_snapshot(staged.path(), cache)?;

        staged
            .persist(&self.path)
            .with_context(|| format!("Failed to replace snapshot {}", self.path.display()))?;

        tracing::debug!(records = cache.len(), path = %self.path.display(), "cache persisted");
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<FingerprintCache> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(SELECT_RECORDS)?;

    let rows = stmt.query_map([], |row| {
        let fingerprint: String = row.get(0)?;
        let bookmark_id: i64 = row.get(1)?;
        let article: String = row.get(2)?;
        let label: String = row.get(3)?;
        Ok((
            Fingerprint::from_hex(fingerprint),
            CacheRecord::new(BookmarkId::new(bookmark_id), article, label),
        ))
    })?;

    let cache = rows.collect::<rusqlite::Result<FingerprintCache>>()?;
    Ok(cache)
}

fn write_snapshot(path: &Path, cache: &FingerprintCache) -> Result<()> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("Failed to open staging snapshot {}", path.display()))?;
    conn.execute_batch(SNAPSHOT_SCHEMA)?;

    let tx = conn.transaction()?;
    {
        let mut insert = tx.prepare(INSERT_RECORD)?;
        for (fingerprint, record) in cache.iter() {
            insert.execute((
                fingerprint.as_str(),
                record.bookmark_id().get(),
                record.article(),
                record.label(),
            ))?;
        }
    }
    tx.commit()?;

    conn.close()
        .map_err(|(_, e)| e)
        .context("Failed to close staging snapshot")?;
    Ok(())
}
