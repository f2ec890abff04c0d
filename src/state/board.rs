//! Board view model
//!
//! Owns the small mutable view state (selection, search, expansion,
//! visibility, detail panel) over a shared, immutable [`IssueSnapshot`].
//! Every command is total: out-of-range state is clamped, never reported.

use std::cell::RefCell;
use std::sync::Arc;

use super::dependency::DependencyIndex;
use super::detail_cache::DetailPanelCache;
use super::issue::Issue;
use super::layout::{
    detail_fits, floor_size, BoardLayout, DETAIL_DEFAULT_PERCENT, SPLIT_MAX_PERCENT,
    SPLIT_MIN_PERCENT, SPLIT_STEP_PERCENT,
};
use super::search::{SearchMatch, SearchState};
use super::selection::{ColumnLens, SelectionState};
use super::snapshot::IssueSnapshot;
use super::swimlane::{group_issues, Columns, SwimLaneMode, COLUMN_COUNT};
use super::visibility::{hidden_count, visible_columns, VisibilityOverride};
use crate::ui::markdown::{MarkdownRender, TermMarkdown};
use crate::ui::theme::Theme;

/// Which pane receives scroll keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardFocus {
    #[default]
    Board,
    Detail,
}

/// Detail panel visibility
///
/// `requested` follows the user's toggle; `auto_hidden` follows the
/// terminal width. The panel shows only when requested and not auto-hidden,
/// so a manual hide survives re-widening. Until the first resize the width
/// is unknown and the panel counts as auto-hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DetailPanelState {
    requested: bool,
    auto_hidden: bool,
    /// Board share of the width, when the user adjusted the split
    split_percent: Option<u16>,
}

impl Default for DetailPanelState {
    fn default() -> Self {
        Self {
            requested: true,
            auto_hidden: true,
            split_percent: None,
        }
    }
}

pub struct BoardModel {
    snapshot: Arc<IssueSnapshot>,
    columns: Arc<Columns>,
    deps: DependencyIndex,
    mode: SwimLaneMode,
    visibility: VisibilityOverride,
    visible: Vec<usize>,
    selection: SelectionState,
    search: SearchState,
    expanded_id: Option<String>,
    detail: DetailPanelState,
    focus: BoardFocus,
    size: Option<(u16, u16)>,
    theme: Theme,
    markdown: Box<dyn MarkdownRender>,
    detail_cache: RefCell<DetailPanelCache>,
}

impl Default for BoardModel {
    fn default() -> Self {
        Self::with_snapshot(Arc::new(IssueSnapshot::default()))
    }
}

impl BoardModel {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self::with_snapshot(Arc::new(IssueSnapshot::new(issues)))
    }

    pub fn with_snapshot(snapshot: Arc<IssueSnapshot>) -> Self {
        let mut board = Self {
            snapshot: Arc::new(IssueSnapshot::default()),
            columns: Arc::new(Columns::default()),
            deps: DependencyIndex::default(),
            mode: SwimLaneMode::default(),
            visibility: VisibilityOverride::default(),
            visible: (0..COLUMN_COUNT).collect(),
            selection: SelectionState::default(),
            search: SearchState::default(),
            expanded_id: None,
            detail: DetailPanelState::default(),
            focus: BoardFocus::default(),
            size: None,
            theme: Theme::default(),
            markdown: Box::new(TermMarkdown::default()),
            detail_cache: RefCell::new(DetailPanelCache::default()),
        };
        board.set_snapshot(snapshot);
        board
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self.detail_cache.get_mut().invalidate();
        self
    }

    pub fn with_markdown(mut self, renderer: Box<dyn MarkdownRender>) -> Self {
        self.markdown = renderer;
        self.detail_cache.get_mut().invalidate();
        self
    }

    // ---- data replacement ----

    /// Replace the issue set; selection is clamped, not preserved
    pub fn set_issues(&mut self, issues: Vec<Issue>) {
        self.set_snapshot(Arc::new(IssueSnapshot::new(issues)));
    }

    pub fn set_snapshot(&mut self, snapshot: Arc<IssueSnapshot>) {
        tracing::debug!("Board snapshot replaced with {} issues", snapshot.len());
        self.deps = DependencyIndex::build(snapshot.issues());
        self.snapshot = snapshot;
        if let Some(id) = &self.expanded_id {
            if self.snapshot.index_of(id).is_none() {
                self.expanded_id = None;
            }
        }
        self.regroup();
    }

    /// Replace the issue set and re-select the previously selected issue
    /// when it still exists
    pub fn set_issues_preserving_selection(&mut self, issues: Vec<Issue>) {
        self.set_snapshot_preserving_selection(Arc::new(IssueSnapshot::new(issues)));
    }

    pub fn set_snapshot_preserving_selection(&mut self, snapshot: Arc<IssueSnapshot>) {
        let previous = self.selected_issue().map(|issue| issue.id.clone());
        self.set_snapshot(snapshot);
        if let Some(id) = previous {
            self.select_issue_by_id(&id);
        }
    }

    fn regroup(&mut self) {
        self.columns = match self.snapshot.board_state() {
            Some(state) => state.columns_for_mode(self.mode),
            None => Arc::new(group_issues(self.snapshot.issues(), self.mode)),
        };
        tracing::debug!(
            "Regrouped by {}: {:?}",
            self.mode.name(),
            self.column_lens()
        );
        self.refresh_visible();
        self.search.cancel();
        self.detail_cache.get_mut().invalidate();
    }

    fn refresh_visible(&mut self) {
        let lens = self.column_lens();
        self.visible = visible_columns(lens, self.visibility.show_empty(self.mode));
        self.selection.clamp(&self.visible, &lens);
    }

    fn column_lens(&self) -> ColumnLens {
        [
            self.columns[0].len(),
            self.columns[1].len(),
            self.columns[2].len(),
            self.columns[3].len(),
        ]
    }

    // ---- queries ----

    pub fn snapshot(&self) -> &Arc<IssueSnapshot> {
        &self.snapshot
    }

    pub fn deps(&self) -> &DependencyIndex {
        &self.deps
    }

    /// Snapshot indices of the issues in raw column `col`
    pub fn column(&self, col: usize) -> &[usize] {
        self.columns.get(col).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn issue_at(&self, col: usize, row: usize) -> Option<&Issue> {
        self.column(col)
            .get(row)
            .and_then(|&idx| self.snapshot.get(idx))
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        let col = self.focused_column();
        self.issue_at(col, self.selection.selected_row(col))
    }

    pub fn column_count(&self, col: usize) -> usize {
        self.column(col).len()
    }

    pub fn total_count(&self) -> usize {
        self.snapshot.len()
    }

    pub fn mode(&self) -> SwimLaneMode {
        self.mode
    }

    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    pub fn visibility_override(&self) -> VisibilityOverride {
        self.visibility
    }

    pub fn visibility_mode_name(&self) -> &'static str {
        self.visibility.label()
    }

    pub fn hidden_column_count(&self) -> usize {
        hidden_count(self.column_lens(), &self.visible)
    }

    pub fn visible_columns(&self) -> &[usize] {
        &self.visible
    }

    /// Raw index of the focused column
    pub fn focused_column(&self) -> usize {
        self.selection.focused_column(&self.visible)
    }

    pub fn focused_position(&self) -> usize {
        self.selection.focused_position()
    }

    pub fn selected_row(&self, col: usize) -> usize {
        self.selection.selected_row(col)
    }

    pub fn search_query(&self) -> &str {
        self.search.query()
    }

    pub fn search_match_count(&self) -> usize {
        self.search.match_count()
    }

    pub fn search_cursor_pos(&self) -> usize {
        self.search.cursor_pos()
    }

    pub fn is_search_mode(&self) -> bool {
        self.search.is_active()
    }

    pub fn is_match_highlighted(&self, col: usize, row: usize) -> bool {
        self.search.is_current_match(col, row)
    }

    pub fn is_search_match(&self, col: usize, row: usize) -> bool {
        self.search.is_match(col, row)
    }

    pub fn expanded_id(&self) -> Option<&str> {
        self.expanded_id.as_deref()
    }

    pub fn is_card_expanded(&self, id: &str) -> bool {
        self.expanded_id.as_deref() == Some(id)
    }

    pub fn has_expanded_card(&self) -> bool {
        self.expanded_id.is_some()
    }

    pub fn is_detail_shown(&self) -> bool {
        self.detail.requested && !self.detail.auto_hidden
    }

    pub fn is_detail_requested(&self) -> bool {
        self.detail.requested
    }

    pub fn detail_focused(&self) -> bool {
        self.focus == BoardFocus::Detail
    }

    pub fn focus(&self) -> BoardFocus {
        self.focus
    }

    pub fn split_percent(&self) -> Option<u16> {
        self.detail.split_percent
    }

    /// Last size passed to [`BoardModel::resize`]
    pub fn size(&self) -> Option<(u16, u16)> {
        self.size
    }

    pub fn layout(&self, width: u16, height: u16) -> BoardLayout {
        BoardLayout::compute(
            width,
            height,
            self.visible.len(),
            self.detail.requested,
            self.detail.split_percent,
        )
    }

    pub(crate) fn theme(&self) -> &Theme {
        &self.theme
    }

    pub(crate) fn markdown(&self) -> &dyn MarkdownRender {
        self.markdown.as_ref()
    }

    pub(crate) fn detail_cache(&self) -> &RefCell<DetailPanelCache> {
        &self.detail_cache
    }

    // ---- navigation ----

    pub fn move_down(&mut self) {
        self.collapse_expanded();
        let lens = self.column_lens();
        self.selection.move_down(&self.visible, &lens);
    }

    pub fn move_up(&mut self) {
        self.collapse_expanded();
        let lens = self.column_lens();
        self.selection.move_up(&self.visible, &lens);
    }

    pub fn move_left(&mut self) {
        self.collapse_expanded();
        self.selection.move_left(&self.visible);
    }

    pub fn move_right(&mut self) {
        self.collapse_expanded();
        self.selection.move_right(&self.visible);
    }

    /// Focus raw column `raw` (0-3), or the nearest visible one
    pub fn jump_to_column(&mut self, raw: usize) {
        self.collapse_expanded();
        self.selection.jump_to_column(&self.visible, raw);
    }

    pub fn jump_to_first_column(&mut self) {
        self.collapse_expanded();
        self.selection.jump_to_first_column();
    }

    pub fn jump_to_last_column(&mut self) {
        self.collapse_expanded();
        self.selection.jump_to_last_column(&self.visible);
    }

    pub fn move_to_top(&mut self) {
        self.collapse_expanded();
        self.selection.move_to_top(&self.visible);
    }

    pub fn move_to_bottom(&mut self) {
        self.collapse_expanded();
        let lens = self.column_lens();
        self.selection.move_to_bottom(&self.visible, &lens);
    }

    /// Move down by half of `visible_rows`
    pub fn page_down(&mut self, visible_rows: usize) {
        self.collapse_expanded();
        let lens = self.column_lens();
        self.selection.page_down(&self.visible, &lens, visible_rows);
    }

    /// Move up by half of `visible_rows`
    pub fn page_up(&mut self, visible_rows: usize) {
        self.collapse_expanded();
        let lens = self.column_lens();
        self.selection.page_up(&self.visible, &lens, visible_rows);
    }

    /// Linear scan over every column; returns whether the issue was found
    pub fn select_issue_by_id(&mut self, id: &str) -> bool {
        let found = (0..COLUMN_COUNT).find_map(|col| {
            self.column(col)
                .iter()
                .position(|&idx| self.snapshot.get(idx).is_some_and(|i| i.id == id))
                .map(|row| (col, row))
        });
        match found {
            Some((col, row)) => {
                self.selection.select(&self.visible, col, row);
                true
            }
            None => false,
        }
    }

    // ---- grouping and visibility ----

    pub fn cycle_swimlane_mode(&mut self) {
        self.set_swimlane_mode(self.mode.next());
    }

    pub fn set_swimlane_mode(&mut self, mode: SwimLaneMode) {
        if self.mode != mode {
            self.mode = mode;
            self.regroup();
        }
    }

    pub fn toggle_empty_columns(&mut self) {
        self.set_visibility_override(self.visibility.next());
    }

    pub fn set_visibility_override(&mut self, visibility: VisibilityOverride) {
        self.visibility = visibility;
        self.refresh_visible();
    }

    // ---- search ----

    pub fn start_search(&mut self) {
        self.search.start();
    }

    pub fn append_search_char(&mut self, c: char) {
        self.search.push_char(c);
        self.rescan();
    }

    pub fn backspace_search(&mut self) {
        if self.search.pop_char() {
            self.rescan();
        }
    }

    fn rescan(&mut self) {
        let hit = self.search.rescan(&self.columns, self.snapshot.issues());
        tracing::debug!(
            "Search {:?}: {} matches",
            self.search.query(),
            self.search.match_count()
        );
        self.jump_to_match(hit);
    }

    pub fn next_match(&mut self) {
        let hit = self.search.next_match();
        self.jump_to_match(hit);
    }

    pub fn prev_match(&mut self) {
        let hit = self.search.prev_match();
        self.jump_to_match(hit);
    }

    fn jump_to_match(&mut self, hit: Option<SearchMatch>) {
        if let Some(m) = hit {
            self.selection.select(&self.visible, m.col, m.row);
        }
    }

    /// Leave input mode, keeping matches for n/N
    pub fn finish_search(&mut self) {
        self.search.finish();
    }

    pub fn cancel_search(&mut self) {
        self.search.cancel();
    }

    // ---- expansion ----

    pub fn toggle_expand(&mut self) {
        let Some(id) = self.selected_issue().map(|issue| issue.id.clone()) else {
            return;
        };
        if self.expanded_id.as_deref() == Some(id.as_str()) {
            self.expanded_id = None;
        } else {
            self.expanded_id = Some(id);
        }
    }

    pub fn collapse_expanded(&mut self) {
        self.expanded_id = None;
    }

    // ---- detail panel ----

    pub fn toggle_detail(&mut self) {
        self.detail.requested = !self.detail.requested;
        self.snap_focus();
    }

    pub fn show_detail(&mut self) {
        self.detail.requested = true;
    }

    pub fn hide_detail(&mut self) {
        self.detail.requested = false;
        self.snap_focus();
    }

    /// Returns false when the panel is not on screen
    pub fn focus_detail(&mut self) -> bool {
        if self.is_detail_shown() {
            self.focus = BoardFocus::Detail;
            true
        } else {
            false
        }
    }

    pub fn focus_board(&mut self) {
        self.focus = BoardFocus::Board;
    }

    pub fn toggle_focus(&mut self) {
        match self.focus {
            BoardFocus::Board => {
                self.focus_detail();
            }
            BoardFocus::Detail => self.focus_board(),
        }
    }

    pub fn detail_scroll_down(&mut self, lines: usize) {
        self.detail_cache.get_mut().scroll_down(lines);
    }

    pub fn detail_scroll_up(&mut self, lines: usize) {
        self.detail_cache.get_mut().scroll_up(lines);
    }

    /// Widen the detail panel by one step
    pub fn grow_detail(&mut self) {
        self.adjust_split(-(SPLIT_STEP_PERCENT as i32));
    }

    /// Narrow the detail panel by one step
    pub fn shrink_detail(&mut self) {
        self.adjust_split(SPLIT_STEP_PERCENT as i32);
    }

    pub fn set_split_percent(&mut self, percent: Option<u16>) {
        self.detail.split_percent =
            percent.map(|p| p.clamp(SPLIT_MIN_PERCENT, SPLIT_MAX_PERCENT));
        self.refresh_auto_hide();
    }

    fn adjust_split(&mut self, delta: i32) {
        let current = self
            .detail
            .split_percent
            .unwrap_or(100 - DETAIL_DEFAULT_PERCENT);
        let next = (i32::from(current) + delta)
            .clamp(i32::from(SPLIT_MIN_PERCENT), i32::from(SPLIT_MAX_PERCENT));
        self.set_split_percent(Some(next as u16));
    }

    /// Record a new terminal size and re-derive detail auto-hide
    pub fn resize(&mut self, width: u16, height: u16) {
        let size = floor_size(width, height);
        if self.size.map(|(w, _)| w) != Some(size.0) {
            self.detail_cache.get_mut().invalidate();
        }
        self.size = Some(size);
        self.refresh_auto_hide();
    }

    fn refresh_auto_hide(&mut self) {
        if let Some((width, _)) = self.size {
            let hidden = !detail_fits(width, self.detail.split_percent);
            if hidden != self.detail.auto_hidden {
                tracing::debug!("Detail panel auto-hidden: {hidden} at width {width}");
            }
            self.detail.auto_hidden = hidden;
        }
        self.snap_focus();
    }

    fn snap_focus(&mut self) {
        if self.focus == BoardFocus::Detail && !self.is_detail_shown() {
            self.focus = BoardFocus::Board;
        }
    }
}
