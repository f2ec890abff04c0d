//! Which of the four columns are rendered

use serde::{Deserialize, Serialize};

use super::swimlane::{SwimLaneMode, COLUMN_COUNT};

/// User override for empty-column visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityOverride {
    /// Show empty columns only when grouping by status
    #[default]
    Auto,
    ShowAll,
    HideEmpty,
}

impl VisibilityOverride {
    /// Auto -> ShowAll -> HideEmpty -> Auto
    pub fn next(self) -> Self {
        match self {
            Self::Auto => Self::ShowAll,
            Self::ShowAll => Self::HideEmpty,
            Self::HideEmpty => Self::Auto,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::ShowAll => "Show All",
            Self::HideEmpty => "Hide Empty",
        }
    }

    pub fn show_empty(self, mode: SwimLaneMode) -> bool {
        match self {
            Self::ShowAll => true,
            Self::HideEmpty => false,
            Self::Auto => mode == SwimLaneMode::ByStatus,
        }
    }
}

/// Raw indices of the columns to render, in order; never empty
pub fn visible_columns(lens: [usize; COLUMN_COUNT], show_empty: bool) -> Vec<usize> {
    let visible: Vec<usize> = (0..COLUMN_COUNT)
        .filter(|&col| show_empty || lens[col] > 0)
        .collect();
    if visible.is_empty() {
        (0..COLUMN_COUNT).collect()
    } else {
        visible
    }
}

/// Empty columns left out of `visible`
pub fn hidden_count(lens: [usize; COLUMN_COUNT], visible: &[usize]) -> usize {
    (0..COLUMN_COUNT)
        .filter(|col| lens[*col] == 0 && !visible.contains(col))
        .count()
}
