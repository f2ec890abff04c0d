//! Memoized detail-panel content with its scroll offset
//!
//! Content is stored as display rows already wrapped to the panel width,
//! so scroll limits and the position hint count what is actually drawn.

use ratatui::text::Line;

/// Cache key used when no issue is selected
pub const NO_SELECTION_KEY: &str = "_none_";

#[derive(Debug, Clone, Default)]
pub struct DetailPanelCache {
    key: Option<String>,
    width: u16,
    stale: bool,
    lines: Vec<Line<'static>>,
    scroll: usize,
    /// Rows visible at once
    viewport: usize,
}

impl DetailPanelCache {
    /// Force a rebuild on the next render
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Rebuild the content if `key` or the wrap `width` changed
    ///
    /// Returns true when `build` ran. A new key resets scroll to the top.
    pub fn ensure<F>(&mut self, key: &str, width: u16, build: F) -> bool
    where
        F: FnOnce() -> Vec<Line<'static>>,
    {
        let same_key = self.key.as_deref() == Some(key);
        if same_key && !self.stale && self.width == width {
            return false;
        }
        self.lines = build();
        self.width = width;
        self.stale = false;
        if !same_key {
            self.key = Some(key.to_string());
            self.scroll = 0;
        }
        self.scroll = self.scroll.min(self.max_scroll());
        true
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Set the visible row count and re-clamp the offset
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// Last visible row, 1-based, for the position hint
    pub fn last_visible_row(&self) -> usize {
        (self.scroll + self.viewport.max(1)).min(self.lines.len())
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport.max(1))
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll = (self.scroll + n).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_sub(n);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn lines(n: usize) -> Vec<Line<'static>> {
        (0..n).map(|i| Line::from(format!("line {i}"))).collect()
    }

    #[test]
    fn test_builds_once_per_key() {
        let calls = Cell::new(0);
        let mut cache = DetailPanelCache::default();
        let build = || {
            calls.set(calls.get() + 1);
            lines(3)
        };

        assert!(cache.ensure("bv-1", 40, build));
        assert!(!cache.ensure("bv-1", 40, || lines(99)));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.lines().len(), 3);
        assert_eq!(cache.key(), Some("bv-1"));
    }

    #[test]
    fn test_key_change_rebuilds_and_resets_scroll() {
        let mut cache = DetailPanelCache::default();
        cache.ensure("bv-1", 40, || lines(20));
        cache.scroll_down(5);
        assert_eq!(cache.scroll(), 5);

        assert!(cache.ensure("bv-2", 40, || lines(20)));
        assert_eq!(cache.scroll(), 0);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let mut cache = DetailPanelCache::default();
        cache.ensure(NO_SELECTION_KEY, 40, || lines(2));
        cache.invalidate();
        assert!(cache.ensure(NO_SELECTION_KEY, 40, || lines(4)));
        assert_eq!(cache.lines().len(), 4);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut cache = DetailPanelCache::default();
        cache.ensure("bv-1", 40, || lines(10));
        cache.scroll_down(100);
        assert_eq!(cache.scroll(), 9);
        cache.scroll_up(3);
        assert_eq!(cache.scroll(), 6);
        cache.scroll_up(100);
        assert_eq!(cache.scroll(), 0);
    }

    #[test]
    fn test_invalidate_keeps_scroll_for_same_key() {
        let mut cache = DetailPanelCache::default();
        cache.ensure("bv-1", 40, || lines(10));
        cache.scroll_down(4);
        cache.invalidate();
        assert!(cache.ensure("bv-1", 40, || lines(3)));
        assert_eq!(cache.scroll(), 2);
    }

    #[test]
    fn test_width_change_rebuilds_and_keeps_scroll() {
        let mut cache = DetailPanelCache::default();
        cache.ensure("bv-1", 40, || lines(10));
        cache.scroll_down(3);
        assert!(!cache.ensure("bv-1", 40, || lines(99)));
        assert!(cache.ensure("bv-1", 30, || lines(12)));
        assert_eq!(cache.lines().len(), 12);
        assert_eq!(cache.scroll(), 3);
    }

    #[test]
    fn test_viewport_limits_scroll_to_last_page() {
        let mut cache = DetailPanelCache::default();
        cache.ensure("bv-1", 40, || lines(10));
        cache.set_viewport(4);
        cache.scroll_down(100);
        assert_eq!(cache.scroll(), 6);
        assert_eq!(cache.last_visible_row(), 10);

        cache.set_viewport(8);
        assert_eq!(cache.scroll(), 2);
        cache.set_viewport(20);
        assert_eq!(cache.scroll(), 0);
        assert_eq!(cache.last_visible_row(), 10);
    }

    #[test]
    fn test_scroll_before_first_build() {
        let mut cache = DetailPanelCache::default();
        cache.scroll_down(3);
        assert_eq!(cache.scroll(), 0);
    }
}
