//! Item source: every bookmark in a collection, with normalized titles.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::BookmarkItem;
use crate::raindrop::{BookmarkService, RaindropError};

/// Number of bookmarks requested per page.
pub const PAGE_SIZE: u32 = 50;

static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w ]").expect("valid regex"));
static RE_WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Normalizes a bookmark title for classification and fingerprinting.
///
/// Removes every character that is neither a word character (Unicode letters,
/// digits, underscore and combining marks) nor a plain space, then collapses
/// runs of two or more whitespace characters into a single space. Leading and
/// trailing spaces are kept.
///
/// Word characters follow the `regex` crate's Unicode `\w`: combining marks
/// are kept, while digits outside the decimal category such as `²` and `½`
/// are removed.
///
/// # Examples
///
/// ```
/// use droptag::source::normalize_title;
///
/// assert_eq!(normalize_title("Rust: the  book!"), "Rust the book");
/// assert_eq!(normalize_title("Café — menu"), "Café menu");
/// ```
pub fn normalize_title(title: &str) -> String {
    let stripped = RE_NON_WORD.replace_all(title, "");
    RE_WHITESPACE_RUN.replace_all(&stripped, " ").into_owned()
}

/// Fetches every bookmark in a collection.
///
/// Pages are requested from zero with [`PAGE_SIZE`] items each until a page
/// comes back empty. The result is ordered and free of exact duplicates.
///
/// # Errors
///
/// The first failing page aborts the fetch; nothing is retried.
pub fn fetch_all(
    service: &dyn BookmarkService,
    collection_id: i64,
) -> Result<BTreeSet<BookmarkItem>, RaindropError> {
    fetch_all_paged(service, collection_id, PAGE_SIZE)
}

/// Like [`fetch_all`] with an explicit page size.
pub fn fetch_all_paged(
    service: &dyn BookmarkService,
    collection_id: i64,
    per_page: u32,
) -> Result<BTreeSet<BookmarkItem>, RaindropError> {
    let mut items = BTreeSet::new();
    let mut page = 0;

    loop {
        let bookmarks = service.search_page(collection_id, page, per_page)?;
        if bookmarks.is_empty() {
            break;
        }

        tracing::info!(page, count = bookmarks.len(), "processing bookmark page");
        items.extend(
            bookmarks
                .into_iter()
                .map(|b| BookmarkItem::new(b.id, normalize_title(&b.title))),
        );
        page += 1;
    }

    Ok(items)
}
