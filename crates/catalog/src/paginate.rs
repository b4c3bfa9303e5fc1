//! Fixed-size pages over the live result set.

/// One page of results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, T> {
    pub slice: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Slice out page `current_page` (1-based).
///
/// `total_pages` is never below 1. Pages past the end come back empty;
/// clamping the page index is the caller's job (see [`clamp_page`]).
/// A `page_size` of 0 is treated as 1.
pub fn paginate<T>(items: &[T], page_size: usize, current_page: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);

    let start = current_page.saturating_sub(1).saturating_mul(page_size);
    let slice = if start >= items.len() {
        &items[..0]
    } else {
        &items[start..(start + page_size).min(items.len())]
    };

    Page {
        slice,
        current_page,
        total_pages,
    }
}

/// Number of pages needed for `len` items; at least 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a page index into `[1, total_pages]`.
pub fn clamp_page(current_page: usize, total_pages: usize) -> usize {
    current_page.clamp(1, total_pages.max(1))
}
