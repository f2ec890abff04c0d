//! Cursor state for the board: a selected row per column plus the focused
//! position inside the visible-column list
//!
//! Every operation takes the current visible list and column lengths and
//! self-corrects, so stale state after a regroup never panics.

use super::swimlane::COLUMN_COUNT;

/// Per-column lengths, indexed by raw column
pub type ColumnLens = [usize; COLUMN_COUNT];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    rows: [usize; COLUMN_COUNT],
    focused: usize,
}

impl SelectionState {
    /// Position inside the visible-column list
    pub fn focused_position(&self) -> usize {
        self.focused
    }

    /// Raw column index the cursor is on
    pub fn focused_column(&self, visible: &[usize]) -> usize {
        visible
            .get(self.focused)
            .or_else(|| visible.last())
            .copied()
            .unwrap_or(0)
    }

    pub fn selected_row(&self, col: usize) -> usize {
        self.rows.get(col).copied().unwrap_or(0)
    }

    /// Clamp every row and the focus after the data or visible list changed
    pub fn clamp(&mut self, visible: &[usize], lens: &ColumnLens) {
        for (row, &len) in self.rows.iter_mut().zip(lens.iter()) {
            if len == 0 {
                *row = 0;
            } else if *row >= len {
                *row = len - 1;
            }
        }
        if self.focused >= visible.len() {
            self.focused = visible.len().saturating_sub(1);
        }
    }

    fn shift_row(&mut self, visible: &[usize], lens: &ColumnLens, delta: isize) {
        let col = self.focused_column(visible);
        let len = lens[col];
        if len == 0 {
            self.rows[col] = 0;
            return;
        }
        let target = self.rows[col].saturating_add_signed(delta);
        self.rows[col] = target.min(len - 1);
    }

    pub fn move_down(&mut self, visible: &[usize], lens: &ColumnLens) {
        self.shift_row(visible, lens, 1);
    }

    pub fn move_up(&mut self, visible: &[usize], lens: &ColumnLens) {
        self.shift_row(visible, lens, -1);
    }

    pub fn move_left(&mut self, visible: &[usize]) {
        self.focused = self.focused.min(visible.len().saturating_sub(1)).saturating_sub(1);
    }

    pub fn move_right(&mut self, visible: &[usize]) {
        let last = visible.len().saturating_sub(1);
        self.focused = (self.focused + 1).min(last);
    }

    /// Focus raw column `raw`, or the nearest visible one
    ///
    /// Out-of-range indices are ignored. Ties go to the column encountered
    /// first in the visible list.
    pub fn jump_to_column(&mut self, visible: &[usize], raw: usize) {
        if raw >= COLUMN_COUNT {
            return;
        }
        let mut best: Option<(usize, usize)> = None;
        for (pos, &col) in visible.iter().enumerate() {
            let dist = col.abs_diff(raw);
            let closer = match best {
                Some((_, d)) => dist < d,
                None => true,
            };
            if closer {
                best = Some((pos, dist));
            }
        }
        if let Some((pos, _)) = best {
            self.focused = pos;
        }
    }

    pub fn jump_to_first_column(&mut self) {
        self.focused = 0;
    }

    pub fn jump_to_last_column(&mut self, visible: &[usize]) {
        self.focused = visible.len().saturating_sub(1);
    }

    pub fn move_to_top(&mut self, visible: &[usize]) {
        let col = self.focused_column(visible);
        self.rows[col] = 0;
    }

    pub fn move_to_bottom(&mut self, visible: &[usize], lens: &ColumnLens) {
        let col = self.focused_column(visible);
        self.rows[col] = lens[col].saturating_sub(1);
    }

    /// Move down by half of `visible_rows`
    pub fn page_down(&mut self, visible: &[usize], lens: &ColumnLens, visible_rows: usize) {
        let step = (visible_rows / 2) as isize;
        self.shift_row(visible, lens, step);
    }

    /// Move up by half of `visible_rows`
    pub fn page_up(&mut self, visible: &[usize], lens: &ColumnLens, visible_rows: usize) {
        let step = (visible_rows / 2) as isize;
        self.shift_row(visible, lens, -step);
    }

    /// Put the cursor on `(col, row)`; focus moves only if `col` is visible
    pub fn select(&mut self, visible: &[usize], col: usize, row: usize) {
        if col >= COLUMN_COUNT {
            return;
        }
        if let Some(pos) = visible.iter().position(|&c| c == col) {
            self.focused = pos;
        }
        self.rows[col] = row;
    }
}
