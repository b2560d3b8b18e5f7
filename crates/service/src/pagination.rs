//! Pagination utilities for the check collection

use std::ops::Range;

/// Page size used by the registry service.
pub const PAGE_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSize {
    /// Return the whole collection.
    All,
    /// Items per page, at least 1.
    Limit(usize),
}

impl PageSize {
    /// Index range of 1-based `page` within a collection of `len` items.
    ///
    /// Page 0 is treated as page 1. Pages past the end yield an empty range.
    pub fn bounds(self, page: usize, len: usize) -> Range<usize> {
        match self {
            Self::All => 0..len,
            Self::Limit(size) => {
                let start = size.saturating_mul(page.max(1) - 1).min(len);
                let end = start.saturating_add(size).min(len);
                start..end
            }
        }
    }
}

/// Normalize a client supplied page number: anything below 1 becomes 1.
pub fn normalize_page(page: i64) -> usize {
    if page <= 0 { 1 } else { usize::try_from(page).unwrap_or(usize::MAX) }
}
