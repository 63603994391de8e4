/// Pagination state machine
///
/// Owns `{current_page, total_pages, is_loading}` plus a request generation.
/// Every accepted navigation gets a new generation; only the newest one may
/// release the loading lock or update what is on screen.

use std::ops::RangeInclusive;

use crate::gallery::loader::total_pages;

/// Number of page buttons shown around the current page
pub const DEFAULT_MAX_BUTTONS: u32 = 7;

/// An accepted navigation that the caller must now load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub page: u32,
    pub generation: u64,
}

/// One numbered button in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub page: u32,
    pub is_current: bool,
    pub enabled: bool,
}

/// Declarative description of the pagination bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub pages: Vec<PageButton>,
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    current_page: u32,
    total_pages: u32,
    is_loading: bool,
    max_buttons: u32,
    generation: u64,
}

impl PaginationController {
    pub fn new(total: u32, page_size: u32, max_buttons: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: total_pages(total, page_size),
            is_loading: false,
            max_buttons: max_buttons.max(1),
            generation: 0,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Begin loading the current page (used once at startup)
    pub fn start(&mut self) -> Navigation {
        self.begin(self.current_page)
    }

    /// Request a move to `target`.
    ///
    /// Returns `None`, leaving state untouched, when `target` is outside
    /// `1..=total_pages` or already current. A load in flight does not block
    /// the move; its result simply becomes stale.
    pub fn go_to_page(&mut self, target: i64) -> Option<Navigation> {
        if target < 1 || target > i64::from(self.total_pages) {
            tracing::trace!(target, total_pages = self.total_pages, "page out of range");
            return None;
        }
        let target = target as u32;
        if target == self.current_page {
            return None;
        }
        Some(self.begin(target))
    }

    pub fn previous(&mut self) -> Option<Navigation> {
        self.go_to_page(i64::from(self.current_page) - 1)
    }

    pub fn next(&mut self) -> Option<Navigation> {
        self.go_to_page(i64::from(self.current_page) + 1)
    }

    /// Settle the load for `generation`.
    ///
    /// Returns false for a superseded generation, whose result must be
    /// discarded. The newest generation always releases the loading lock,
    /// whether its load succeeded or failed.
    pub fn finish(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(generation, current = self.generation, "discarding stale page load");
            return false;
        }
        self.is_loading = false;
        true
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Page numbers to show, centred on the current page where possible
    pub fn button_window(&self) -> RangeInclusive<u32> {
        let half = self.max_buttons / 2;
        let mut start = self.current_page.saturating_sub(half).max(1);
        let end = self
            .total_pages
            .min(start.saturating_add(self.max_buttons - 1));
        if end - start < self.max_buttons - 1 {
            start = end.saturating_add(1).saturating_sub(self.max_buttons).max(1);
        }
        start..=end
    }

    pub fn controls(&self) -> PaginationControls {
        let enabled = !self.is_loading;
        let pages = self
            .button_window()
            .map(|page| PageButton {
                page,
                is_current: page == self.current_page,
                enabled,
            })
            .collect();

        PaginationControls {
            previous_enabled: enabled && self.current_page > 1,
            next_enabled: enabled && self.current_page < self.total_pages,
            pages,
        }
    }

    fn begin(&mut self, page: u32) -> Navigation {
        self.current_page = page;
        self.is_loading = true;
        self.generation += 1;
        tracing::debug!(page, generation = self.generation, "navigating");
        Navigation {
            page,
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(total_pages: u32, current: u32) -> Vec<u32> {
        // page_size 1 makes total == total_pages
        let mut controller = PaginationController::new(total_pages, 1, DEFAULT_MAX_BUTTONS);
        if current != 1 {
            controller.go_to_page(i64::from(current)).unwrap();
        }
        controller.button_window().collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(PaginationController::new(20, 9, 7).total_pages(), 3);
        assert_eq!(PaginationController::new(0, 9, 7).total_pages(), 1);
        assert_eq!(PaginationController::new(18, 9, 7).total_pages(), 2);
    }

    #[test]
    fn test_button_window() {
        assert_eq!(window(10, 1), (1..=7).collect::<Vec<_>>());
        assert_eq!(window(10, 10), (4..=10).collect::<Vec<_>>());
        assert_eq!(window(10, 5), (2..=8).collect::<Vec<_>>());
        assert_eq!(window(10, 4), (1..=7).collect::<Vec<_>>());
        assert_eq!(window(10, 8), (4..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_button_window_fewer_pages_than_buttons() {
        assert_eq!(window(3, 2), vec![1, 2, 3]);
        assert_eq!(window(1, 1), vec![1]);
    }

    #[test]
    fn test_button_window_huge_max_buttons() {
        let mut controller = PaginationController::new(10, 1, u32::MAX);
        assert_eq!(controller.button_window(), 1..=10);

        controller.go_to_page(6).unwrap();
        assert_eq!(controller.button_window(), 1..=10);
        assert_eq!(controller.controls().pages.len(), 10);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut controller = PaginationController::new(20, 9, 7);
        let before = (controller.current_page(), controller.is_loading(), controller.generation());

        assert!(controller.go_to_page(0).is_none());
        assert!(controller.go_to_page(-3).is_none());
        assert!(controller.go_to_page(4).is_none());
        assert!(controller.go_to_page(1).is_none());
        assert!(controller.previous().is_none());

        let after = (controller.current_page(), controller.is_loading(), controller.generation());
        assert_eq!(before, after);
    }

    #[test]
    fn test_navigation_sets_loading() {
        let mut controller = PaginationController::new(20, 9, 7);

        let nav = controller.go_to_page(2).unwrap();

        assert_eq!(nav.page, 2);
        assert_eq!(controller.current_page(), 2);
        assert!(controller.is_loading());
        assert!(controller.finish(nav.generation));
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let mut controller = PaginationController::new(50, 9, 7);
        let first = controller.go_to_page(2).unwrap();
        let second = controller.go_to_page(3).unwrap();

        assert!(second.generation > first.generation);
        assert!(!controller.finish(first.generation));
        assert!(controller.is_loading());
        assert_eq!(controller.current_page(), 3);

        assert!(controller.finish(second.generation));
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_controls_edges_and_loading() {
        let mut controller = PaginationController::new(20, 9, 7);
        let nav = controller.start();

        let loading = controller.controls();
        assert!(!loading.previous_enabled);
        assert!(!loading.next_enabled);
        assert!(loading.pages.iter().all(|b| !b.enabled));

        controller.finish(nav.generation);
        let first = controller.controls();
        assert!(!first.previous_enabled);
        assert!(first.next_enabled);
        assert_eq!(first.pages.iter().filter(|b| b.is_current).count(), 1);
        assert!(first.pages[0].is_current);

        controller.next().unwrap();
        let nav = controller.next().unwrap();
        controller.finish(nav.generation);
        let last = controller.controls();
        assert_eq!(controller.current_page(), 3);
        assert!(last.previous_enabled);
        assert!(!last.next_enabled);
    }
}
