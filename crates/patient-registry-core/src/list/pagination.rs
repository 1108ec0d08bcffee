//! Page-button arithmetic.

/// Maximum number of page buttons shown at once.
pub const PAGE_WINDOW: u32 = 5;

/// Up to [`PAGE_WINDOW`] contiguous page numbers around `page`.
///
/// The window is `[page - 2, page + 2]` slid to stay inside
/// `[1, total_pages]`. Empty when there are no pages.
pub fn page_window(page: u32, total_pages: u32) -> Vec<u32> {
    if total_pages == 0 {
        return Vec::new();
    }
    let page = page.clamp(1, total_pages);
    let width = PAGE_WINDOW.min(total_pages);
    let start = page
        .saturating_sub(PAGE_WINDOW / 2)
        .max(1)
        .min(total_pages - width + 1);
    (start..start + width).collect()
}
