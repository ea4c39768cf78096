use serde::{Deserialize, Serialize};

use super::BookmarkId;

/// Cached classification state for one article text.
///
/// A record starts with an empty label when its article is first queued for
/// classification and gets its label filled in once the classifier answers.
/// Records are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    bookmark_id: BookmarkId,
    article: String,
    label: String,
}

impl CacheRecord {
    /// Creates an unlabeled record.
    pub fn unlabeled(bookmark_id: BookmarkId, article: impl Into<String>) -> Self {
        Self::new(bookmark_id, article, String::new())
    }

    /// Creates a record with the given label (possibly empty).
    pub fn new(bookmark_id: BookmarkId, article: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            bookmark_id,
            article: article.into(),
            label: label.into(),
        }
    }

    /// Returns the ID of the bookmark that receives this record's tag.
    pub fn bookmark_id(&self) -> BookmarkId {
        self.bookmark_id
    }

    /// Returns the normalized article text.
    pub fn article(&self) -> &str {
        &self.article
    }

    /// Returns the label, empty when unclassified.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true once a non-empty label has been assigned.
    pub fn is_labeled(&self) -> bool {
        !self.label.is_empty()
    }

    /// Replaces the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }
}
