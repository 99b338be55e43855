//! Fixed-size pagination over a result list.
//!
//! Pages are 1-based. An empty list still has one (empty) page so that the
//! current page is always valid.

/// Number of countries shown per page.
pub const PAGE_SIZE: usize = 12;

/// Number of pages needed for `len` items, never less than one.
///
/// # Examples
///
/// ```
/// use country_explorer::app::pagination::{total_pages, PAGE_SIZE};
///
/// assert_eq!(total_pages(0, PAGE_SIZE), 1);
/// assert_eq!(total_pages(12, PAGE_SIZE), 1);
/// assert_eq!(total_pages(25, PAGE_SIZE), 3);
/// ```
#[must_use]
pub const fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 || len == 0 {
        return 1;
    }
    len.div_ceil(page_size)
}

/// Returns the slice of `items` shown on `page`.
///
/// Page 0 and pages past the end yield an empty slice.
#[must_use]
pub fn visible_page<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// True if `page` is a valid page for `len` items.
#[must_use]
pub const fn is_valid_page(page: usize, len: usize, page_size: usize) -> bool {
    page >= 1 && page <= total_pages(len, page_size)
}
