use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

/// Unique identifier for a bookmark in the bookmarking service.
///
/// Wraps the service's integer ID to prevent accidental mixing with
/// collection IDs or page indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(i64);

impl BookmarkId {
    /// Creates a new bookmark ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content fingerprint used as the cache key.
///
/// The lowercase hex SHA-1 digest of the UTF-8 bytes of a normalized article
/// text. Two texts with the same fingerprint are treated as the same article.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use droptag::Fingerprint;
    ///
    /// let fp = Fingerprint::of("hello");
    /// assert_eq!(fp.as_str(), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    /// ```
    pub fn of(text: &str) -> Self {
        Self(hex::encode(Sha1::digest(text.as_bytes())))
    }

    /// Wraps an already-computed digest, e.g. one read back from a snapshot.
    pub fn from_hex(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookmark_id_new_and_get() {
        let id = BookmarkId::new(42);
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn bookmark_id_display_shows_raw_value() {
        assert_eq!(format!("{}", BookmarkId::new(123)), "123");
    }

    #[test]
    fn bookmark_id_serializes_as_raw_integer() {
        let id = BookmarkId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");

        let deserialized: BookmarkId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn fingerprint_matches_known_sha1_digest() {
        assert_eq!(
            Fingerprint::of("").as_str(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            Fingerprint::of("abc").as_str(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn fingerprint_is_stable_across_calls() {
        let text = "Rust ownership explained";
        assert_eq!(Fingerprint::of(text), Fingerprint::of(text));
        assert_eq!(Fingerprint::of(text).as_str().len(), 40);
    }

    #[test]
    fn fingerprint_hashes_utf8_bytes() {
        // "é" is two bytes in UTF-8
        assert_ne!(Fingerprint::of("cafe"), Fingerprint::of("café"));
        assert_eq!(
            Fingerprint::of("café"),
            Fingerprint::from_hex(hex::encode(Sha1::digest("café".as_bytes())))
        );
    }

    #[test]
    fn distinct_texts_have_distinct_fingerprints() {
        assert_ne!(Fingerprint::of("Foo"), Fingerprint::of("foo"));
        assert_ne!(Fingerprint::of("Foo"), Fingerprint::of("Foo "));
    }
}
