//! Colors and icons for the board

use chrono::Duration;
use ratatui::style::{Color, Modifier, Style};

use crate::state::{IssueType, Status};

/// Palette used by every board widget
///
/// Lookups are total: unknown statuses and types fall back to neutral
/// entries instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub open: Color,
    pub in_progress: Color,
    pub blocked: Color,
    pub closed: Color,
    pub blocks_others: Color,
    pub bug: Color,
    pub feature: Color,
    pub task: Color,
    pub epic: Color,
    pub chore: Color,
    pub match_current: Color,
    pub match_any: Color,
    pub age_fresh: Color,
    pub age_aging: Color,
    pub age_stale: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Cyan,
            secondary: Color::Rgb(139, 148, 158),
            text: Color::White,
            muted: Color::DarkGray,
            border: Color::Rgb(68, 71, 90),
            open: Color::Rgb(80, 250, 123),
            in_progress: Color::Rgb(139, 233, 253),
            blocked: Color::Rgb(255, 85, 85),
            closed: Color::Rgb(98, 114, 164),
            blocks_others: Color::Rgb(255, 184, 108),
            bug: Color::Rgb(255, 85, 85),
            feature: Color::Rgb(189, 147, 249),
            task: Color::Rgb(241, 250, 140),
            epic: Color::Rgb(255, 121, 198),
            chore: Color::Rgb(139, 148, 158),
            match_current: Color::Rgb(189, 147, 249),
            match_any: Color::Rgb(97, 175, 239),
            age_fresh: Color::Rgb(80, 250, 123),
            age_aging: Color::Rgb(255, 184, 108),
            age_stale: Color::Rgb(255, 85, 85),
        }
    }
}

impl Theme {
    /// Single-letter type badge and its color
    pub fn type_icon(&self, issue_type: &IssueType) -> (&'static str, Color) {
        match issue_type {
            IssueType::Bug => ("B", self.bug),
            IssueType::Feature => ("F", self.feature),
            IssueType::Task => ("T", self.task),
            IssueType::Epic => ("E", self.epic),
            IssueType::Chore => ("C", self.chore),
            IssueType::Other(_) => ("·", self.secondary),
        }
    }

    pub fn status_icon(&self, status: &Status) -> &'static str {
        match status {
            Status::Open => "🟢",
            Status::InProgress => "🔵",
            Status::Blocked => "🔴",
            Status::Deferred => "💤",
            Status::Pinned => "📌",
            Status::Hooked => "🪝",
            Status::Closed => "✅",
            Status::Tombstone => "🪦",
            Status::Other(_) => "⚪",
        }
    }

    pub fn status_color(&self, status: &Status) -> Color {
        match status {
            Status::Open => self.open,
            Status::InProgress => self.in_progress,
            Status::Blocked => self.blocked,
            Status::Closed | Status::Tombstone => self.closed,
            _ => self.secondary,
        }
    }

    pub fn priority_icon(&self, priority: i32) -> &'static str {
        match priority {
            i32::MIN..=0 => "🔥",
            1 => "⚡",
            2 => "🔹",
            3 => "☕",
            _ => "💤",
        }
    }

    /// Bold, red for P0/P1
    pub fn priority_style(&self, priority: i32) -> Style {
        let color = if priority <= 1 {
            self.blocked
        } else {
            self.secondary
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Green under a week, orange under a month, red beyond
    pub fn age_color(&self, age: Option<Duration>) -> Color {
        match age {
            None => self.muted,
            Some(age) if age < Duration::days(7) => self.age_fresh,
            Some(age) if age < Duration::days(30) => self.age_aging,
            Some(_) => self.age_stale,
        }
    }
}
