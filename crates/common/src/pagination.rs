//! Page-number pagination.
//!
//! Listings are split into fixed-size pages addressed by a 1-based page
//! number taken from the `page` query parameter. Requests never fail on a
//! bad page number: anything missing, non-numeric or below 1 resolves to
//! the first page, and anything past the end resolves to the last page.

use serde::Serialize;

/// A requested page number, as received from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PageRequest(Option<i64>);

impl PageRequest {
    /// Parse the raw `page` query value. Unparseable input is kept as
    /// "no preference" and resolves to the first page.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        Self(raw.and_then(|s| s.trim().parse::<i64>().ok()))
    }

    /// The page number asked for, before clamping to the last page.
    #[must_use]
    pub fn requested(self) -> u64 {
        self.0
            .and_then(|n| u64::try_from(n).ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1)
    }

    /// Resolve against the number of available pages.
    ///
    /// `num_pages` is at least 1 for every listing, so the result is always
    /// a valid 1-based page number.
    #[must_use]
    pub fn resolve(self, num_pages: u64) -> u64 {
        self.requested().min(num_pages.max(1))
    }
}

/// Number of pages needed for `total` items, never less than one.
#[must_use]
pub const fn num_pages(total: u64, per_page: u64) -> u64 {
    if per_page == 0 || total == 0 {
        return 1;
    }
    total.div_ceil(per_page)
}

/// One page of an ordered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: u64,
    /// Total number of pages (at least 1).
    pub num_pages: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Configured page size.
    pub per_page: u64,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Build a page from already-sliced items.
    #[must_use]
    pub fn new(items: Vec<T>, number: u64, total: u64, per_page: u64) -> Self {
        let num_pages = num_pages(total, per_page);
        Self {
            items,
            number,
            num_pages,
            total,
            per_page,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }

    /// Convert the items with a fallible function, keeping the page metadata.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
            has_previous: self.has_previous,
            has_next: self.has_next,
        })
    }
}
