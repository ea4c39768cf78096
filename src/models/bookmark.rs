use serde::{Deserialize, Serialize};

use super::{BookmarkId, Fingerprint};

/// A bookmark as seen by one run: its service ID and normalized title.
///
/// Items are compared by `(id, text)`, so a set of items collapses exact
/// duplicates while keeping two bookmarks that merely share a title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookmarkItem {
    id: BookmarkId,
    text: String,
}

impl BookmarkItem {
    /// Creates a bookmark item from an ID and an already-normalized title.
    pub fn new(id: BookmarkId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Returns the bookmark's service ID.
    pub fn id(&self) -> BookmarkId {
        self.id
    }

    /// Returns the normalized title.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the cache key for this item's text.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.text)
    }
}
