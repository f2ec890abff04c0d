//! Width-driven layout decisions for the board
//!
//! ```text
//! Row 0:    Title bar ("BOARD [by: Status]")
//! Row 1:    Spacer
//! Row 2:    Column headers
//! Row 3+:   Cards, one column per visible lane, separated by a single rule
//! Right:    Detail panel (only on wide terminals)
//! ```

use chrono::{DateTime, Duration, Utc};

use super::dependency::has_open_blocker;
use super::issue::Issue;
use super::snapshot::IssueSnapshot;

/// Smallest size the layout math will run on
pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 8;

/// Terminals at or below this width never show the detail panel
pub const DETAIL_MIN_TERMINAL_WIDTH: u16 = 120;
/// Narrowest readable detail panel; anything smaller is auto-hidden
pub const DETAIL_MIN_WIDTH: u16 = 40;
pub const DETAIL_MAX_WIDTH: u16 = 80;
/// Default detail share of the terminal width
pub const DETAIL_DEFAULT_PERCENT: u16 = 35;

/// Board share of the width when the user adjusts the split
pub const SPLIT_MIN_PERCENT: u16 = 20;
pub const SPLIT_MAX_PERCENT: u16 = 80;
pub const SPLIT_STEP_PERCENT: u16 = 5;

pub const MIN_COLUMN_WIDTH: u16 = 28;
pub const MIN_COLUMN_HEIGHT: u16 = 8;
/// Title bar, spacer, header and bottom margin
pub const COLUMN_HEIGHT_RESERVE: u16 = 6;
/// Lines per collapsed card: content, border and margin
pub const CARD_HEIGHT: u16 = 6;

/// Floor degenerate sizes before any layout math
pub fn floor_size(width: u16, height: u16) -> (u16, u16) {
    (width.max(MIN_WIDTH), height.max(MIN_HEIGHT))
}

/// Width the detail panel would get, before the readability check
///
/// `split_percent` is the board's share of the width; `None` means the
/// default 35% detail sizing.
pub fn detail_candidate_width(width: u16, split_percent: Option<u16>) -> u16 {
    if width <= DETAIL_MIN_TERMINAL_WIDTH {
        return 0;
    }
    match split_percent {
        None => {
            let share = (u32::from(width) * u32::from(DETAIL_DEFAULT_PERCENT) / 100) as u16;
            share.clamp(DETAIL_MIN_WIDTH, DETAIL_MAX_WIDTH)
        }
        Some(percent) => {
            let percent = percent.clamp(SPLIT_MIN_PERCENT, SPLIT_MAX_PERCENT);
            let share = (u32::from(width) * u32::from(100 - percent) / 100) as u16;
            share.saturating_sub(2).min(DETAIL_MAX_WIDTH)
        }
    }
}

/// Whether a detail panel at this width would be readable
pub fn detail_fits(width: u16, split_percent: Option<u16>) -> bool {
    detail_candidate_width(width, split_percent) >= DETAIL_MIN_WIDTH
}

/// How much per-column statistics the header has room for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatDensity {
    /// Count only
    Count,
    /// Count plus P0/P1 tallies
    Priority,
    /// Everything, including blocked count and oldest age
    Full,
}

impl StatDensity {
    pub fn for_width(width: u16) -> Self {
        if width < 100 {
            Self::Count
        } else if width < 140 {
            Self::Priority
        } else {
            Self::Full
        }
    }
}

/// Resolved geometry for one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub width: u16,
    pub height: u16,
    pub detail_width: u16,
    pub board_width: u16,
    pub column_width: u16,
    pub column_height: u16,
    pub visible_cards: usize,
    pub density: StatDensity,
}

impl BoardLayout {
    pub fn compute(
        width: u16,
        height: u16,
        column_count: usize,
        detail_requested: bool,
        split_percent: Option<u16>,
    ) -> Self {
        let (width, height) = floor_size(width, height);
        let column_count = column_count.max(1) as u16;

        let detail_width = if detail_requested && detail_fits(width, split_percent) {
            detail_candidate_width(width, split_percent)
        } else {
            0
        };
        let board_width = if detail_width > 0 {
            width - detail_width - 1
        } else {
            width
        };

        let available = board_width.saturating_sub(column_count - 1);
        let column_width = (available / column_count).max(MIN_COLUMN_WIDTH);
        let column_height = height
            .saturating_sub(COLUMN_HEIGHT_RESERVE)
            .max(MIN_COLUMN_HEIGHT);
        let visible_cards = usize::from((column_height - 1) / CARD_HEIGHT).max(1);

        Self {
            width,
            height,
            detail_width,
            board_width,
            column_width,
            column_height,
            visible_cards,
            density: StatDensity::for_width(width),
        }
    }

    pub fn detail_shown(&self) -> bool {
        self.detail_width > 0
    }
}

/// First row of the card window that keeps `selected` on screen
pub fn window_start(selected: usize, visible_cards: usize) -> usize {
    (selected + 1).saturating_sub(visible_cards)
}

/// Header statistics for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnStats {
    pub total: usize,
    pub p0: usize,
    pub p1: usize,
    /// Issues with an unresolved blocker
    pub blocked: usize,
    pub oldest_age: Option<Duration>,
}

impl ColumnStats {
    pub fn compute(column: &[usize], snapshot: &IssueSnapshot, now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total: column.len(),
            ..Default::default()
        };
        let mut oldest: Option<DateTime<Utc>> = None;
        for issue in column.iter().filter_map(|&idx| snapshot.get(idx)) {
            match issue.priority {
                0 => stats.p0 += 1,
                1 => stats.p1 += 1,
                _ => {}
            }
            if has_open_blocker(issue, Some(snapshot)) {
                stats.blocked += 1;
            }
            if let Some(created) = issue.created_at {
                oldest = Some(match oldest {
                    Some(o) if o <= created => o,
                    _ => created,
                });
            }
        }
        stats.oldest_age = oldest.map(|o| now - o);
        stats
    }
}

/// "<1d", "Nd", "Nw" or "Nmo"
pub fn format_oldest_age(age: Duration) -> String {
    let days = age.num_days();
    if days < 1 {
        "<1d".to_string()
    } else if days < 7 {
        format!("{days}d")
    } else if days < 30 {
        format!("{}w", days / 7)
    } else {
        format!("{}mo", days / 30)
    }
}

/// Age of an issue measured from its last update
pub fn issue_age(issue: &Issue, now: DateTime<Utc>) -> Option<Duration> {
    issue.updated_at.or(issue.created_at).map(|t| now - t)
}
