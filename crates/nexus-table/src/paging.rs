//! Pagination window over a derived result.

use std::ops::Range;

/// Zero-based page index plus page size.
///
/// The window itself is never clamped when set; clamping happens when a
/// slice is taken, so a page past the end simply yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Zero-based page index.
    pub page: usize,
    /// Rows per page, always greater than zero.
    pub page_size: usize,
}

impl Pagination {
    /// Creates a window at page 0.
    pub fn new(page_size: usize) -> Self {
        Pagination {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    /// Index of the first row on this page (may exceed `total`).
    pub fn start(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    /// The in-bounds row range this page covers for a result of `total` rows.
    ///
    /// ```
    /// use nexus_table::Pagination;
    ///
    /// let p = Pagination { page: 2, page_size: 10 };
    /// assert_eq!(p.range(25), 20..25);
    /// assert_eq!(p.range(15), 15..15);
    /// ```
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = self.start().min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }

    /// Slices `rows` to this page.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        &rows[self.range(rows.len())]
    }

    /// Number of pages needed for `total` rows (0 for an empty result).
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(10)
    }
}
