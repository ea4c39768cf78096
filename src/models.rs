mod bookmark;
mod cache_record;
mod ids;

pub use bookmark::BookmarkItem;
pub use cache_record::CacheRecord;
pub use ids::{BookmarkId, Fingerprint};
