//! Fixed-size pagination.

use serde::{Deserialize, Serialize};

/// A contiguous slice of a larger list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed.
    pub current_page: usize,
    /// `ceil(total_items / page_size)`; 0 for an empty list.
    pub total_pages: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Pager controls are only worth rendering with more than one page.
    pub fn show_pager(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1 && self.total_pages > 0
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Number of pages needed for `count` items.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 { 0 } else { count.div_ceil(page_size) }
}

/// Slice page `page` (1-indexed; 0 is read as 1) out of `items`.
///
/// Pages past the end come back empty with the requested page number.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let current_page = page.max(1);
    let total_pages = total_pages(items.len(), page_size);

    let start = (current_page - 1).saturating_mul(page_size);
    let slice = if page_size == 0 || start >= items.len() {
        &[][..]
    } else {
        &items[start..(start + page_size).min(items.len())]
    };

    Page { items: slice.to_vec(), current_page, total_pages, page_size, total_items: items.len() }
}
