use std::ops::Range;

/// Fixed-size page cursor. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
}

/// "Showing `start`–`end` of `total`", with `start` 1-based and 0 when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Clamps `page` into `[1, total_pages]`; an empty set has the single page 1.
    pub fn clamp(&self, page: usize, total: usize) -> usize {
        page.clamp(1, self.total_pages(total).max(1))
    }

    pub fn go_to(&mut self, page: usize, total: usize) -> usize {
        self.current_page = self.clamp(page, total);
        self.current_page
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Index range of the visible slice, computed against the current total
    /// so a cursor left stale by shrinking data never slices out of bounds.
    pub fn range(&self, total: usize) -> Range<usize> {
        let page = self.clamp(self.current_page, total);
        let start = ((page - 1) * self.page_size).min(total);
        let end = (page * self.page_size).min(total);
        start..end
    }

    pub fn window(&self, total: usize) -> PageWindow {
        let range = self.range(total);
        PageWindow {
            start: if range.is_empty() { 0 } else { range.start + 1 },
            end: range.end,
            total,
        }
    }

    pub fn has_prev(&self, total: usize) -> bool {
        self.clamp(self.current_page, total) > 1
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.range(total).end < total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Pagination::new(5);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(5), 1);
        assert_eq!(p.total_pages(6), 2);
    }

    #[test]
    fn test_go_to_clamps_both_ends() {
        let mut p = Pagination::new(5);
        assert_eq!(p.go_to(0, 12), 1);
        assert_eq!(p.go_to(9, 12), 3);
        assert_eq!(p.go_to(2, 0), 1);
    }

    #[test]
    fn test_range_and_window_on_last_page() {
        let mut p = Pagination::new(5);
        p.go_to(3, 12);
        assert_eq!(p.range(12), 10..12);
        assert_eq!(
            p.window(12),
            PageWindow {
                start: 11,
                end: 12,
                total: 12
            }
        );
        assert!(p.has_prev(12));
        assert!(!p.has_next(12));
    }

    #[test]
    fn test_stale_cursor_is_clamped_when_data_shrinks() {
        let mut p = Pagination::new(5);
        p.go_to(3, 12);
        assert_eq!(p.range(4), 0..4);
        assert!(!p.has_prev(4));
        assert!(!p.has_next(4));
        assert_eq!(p.window(0).start, 0);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let p = Pagination::new(0);
        assert_eq!(p.page_size(), 1);
    }
}
