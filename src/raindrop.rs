/// Raindrop.io HTTP client module.
///
/// This module provides a blocking client for paging through a collection's
/// bookmarks and replacing a bookmark's tags.
mod client;

pub use client::{
    BookmarkService, RaindropClient, RaindropClientBuilder, RaindropError, RawBookmark,
};
