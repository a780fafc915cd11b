//! Page slicing

use crate::{CoreError, CoreResult};
use serde::Serialize;

/// One page of a list, borrowed from the source slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: usize) -> CoreResult<usize> {
    if page_size < 1 {
        return Err(CoreError::invalid_argument(
            "page_size",
            "page_size must be at least 1",
        ));
    }
    Ok(len.div_ceil(page_size).max(1))
}

/// Clamp a requested page into `[1, total_pages]`.
pub fn clamp_page(len: usize, page_size: usize, page: usize) -> CoreResult<usize> {
    Ok(page.clamp(1, total_pages(len, page_size)?))
}

/// Slice `items` to the given 1-based page.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> CoreResult<Page<'_, T>> {
    let total_pages = total_pages(items.len(), page_size)?;
    if page < 1 {
        return Err(CoreError::invalid_argument("page", "page must be at least 1"));
    }
    if page > total_pages {
        return Err(CoreError::invalid_argument(
            "page",
            format!("page {} is beyond total pages {}", page, total_pages),
        ));
    }

    let start = ((page - 1) * page_size).min(items.len());
    let end = page.saturating_mul(page_size).min(items.len());
    Ok(Page {
        items: &items[start..end],
        page,
        total_pages,
    })
}
