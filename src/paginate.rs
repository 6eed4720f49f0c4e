//! Offset pagination over the filtered ticket list.

use serde::Serialize;

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served
    pub page: usize,
    pub page_size: usize,
    /// Number of items before slicing
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Number of pages needed for `total` items. Zero items still count as one
/// (empty) page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    total.div_ceil(size).max(1)
}

/// Slice `items` to the 1-based `page`.
///
/// Page 0 is treated as page 1. A page past the end yields an empty slice
/// rather than clamping, so the caller can tell it overshot.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let start = (page - 1).saturating_mul(page_size);

    let slice = if start >= items.len() {
        &[][..]
    } else {
        let end = (start + page_size).min(items.len());
        &items[start..end]
    };

    Page {
        items: slice.to_vec(),
        page,
        page_size,
        total: items.len(),
        total_pages: page_count(items.len(), page_size),
    }
}
