//! Page-number window rendered under every list table.

use serde::{Deserialize, Serialize};

/// Number of page buttons shown on each side of the current page.
pub const WINDOW_NEIGHBORS: u32 = 2;

/// One entry of the rendered pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "page")]
pub enum PageLink {
    /// A clickable page number.
    Page(u32),
    /// A gap between non-adjacent page numbers.
    Ellipsis,
}

/// Derived pagination metadata for one loaded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current 1-based page.
    pub current_page: u32,
    /// Total number of pages, zero for an empty collection.
    pub total_pages: u32,
    /// Total number of records across all pages.
    pub total_items: u64,
    /// Page buttons, including ellipses.
    pub links: Vec<PageLink>,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// 1-based index of the first record shown, zero when empty.
    pub first_item: u64,
    /// 1-based index of the last record shown, zero when empty.
    pub last_item: u64,
}

impl Pagination {
    /// Builds pagination metadata from list state.
    #[must_use]
    pub fn new(current_page: u32, page_size: u32, total_items: u64, total_pages: u32) -> Self {
        let (first_item, last_item) = if total_items == 0 || page_size == 0 {
            (0, 0)
        } else {
            let first = u64::from(current_page.saturating_sub(1))
                .saturating_mul(u64::from(page_size))
                .saturating_add(1);
            let last = first
                .saturating_add(u64::from(page_size) - 1)
                .min(total_items);
            (first.min(total_items), last)
        };

        Self {
            current_page,
            total_pages,
            total_items,
            links: page_window(current_page, total_pages),
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
            first_item,
            last_item,
        }
    }
}

/// Returns the page buttons for `current_page` out of `total_pages`.
///
/// The window spans five pages centered on the current one where possible.
/// Page 1 and the last page are always reachable, with an ellipsis when the
/// window does not touch them.
#[must_use]
pub fn page_window(current_page: u32, total_pages: u32) -> Vec<PageLink> {
    let width = WINDOW_NEIGHBORS * 2;
    let start_page = current_page.saturating_sub(WINDOW_NEIGHBORS).max(1);
    let end_page = total_pages.min(start_page.saturating_add(width));
    let start_page = end_page.saturating_sub(width).max(1);

    let mut links = Vec::new();
    if start_page > 1 {
        links.push(PageLink::Page(1));
        if start_page > 2 {
            links.push(PageLink::Ellipsis);
        }
    }

    links.extend((start_page..=end_page).map(PageLink::Page));

    if end_page < total_pages {
        if end_page < total_pages - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page(total_pages));
    }

    links
}
