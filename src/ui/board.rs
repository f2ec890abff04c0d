//! Board rendering
//!
//! [`BoardModel::render`] draws into any ratatui buffer; [`BoardModel::view`]
//! renders into an off-screen buffer and returns it as plain text.

use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use super::card::{
    collapsed_height, expanded_height, render_card, render_expanded_card, CardState,
};
use super::detail_panel::render_detail_panel;
use super::text::truncate;
use crate::state::{
    floor_size, format_oldest_age, window_start, BoardLayout, BoardModel, ColumnStats,
    StatDensity, SwimLaneMode,
};

/// Title bar, spacer and header rows above the cards
const CARDS_TOP: u16 = 3;

impl BoardModel {
    /// Draw the board and, when it fits, the detail panel into `area`
    ///
    /// Only the detail cache is touched; repeated calls with unchanged state
    /// draw identical output.
    pub fn render(&self, area: Rect, buf: &mut Buffer, now: DateTime<Utc>) {
        let area = area.intersection(buf.area);
        if area.is_empty() {
            return;
        }
        let layout = self.layout(area.width, area.height);
        let board_area = Rect {
            width: layout.board_width.min(area.width),
            ..area
        };

        self.render_title_bar(board_area, buf);
        if self.total_count() == 0 {
            let message = "No issues to display";
            let x = board_area.x + board_area.width.saturating_sub(message.width() as u16) / 2;
            let y = board_area.y + board_area.height / 2;
            put(
                buf,
                board_area,
                x,
                y,
                message,
                Style::default().fg(self.theme().muted),
            );
        } else {
            self.render_columns(&layout, board_area, buf, now);
        }

        if layout.detail_shown() {
            let detail_area = Rect {
                x: area.x + layout.board_width + 1,
                width: layout.detail_width,
                ..area
            }
            .intersection(area);
            if !detail_area.is_empty() {
                render_detail_panel(self, detail_area, buf, now);
            }
        }
    }

    /// Plain-text rendering at the current time
    pub fn view(&self, width: u16, height: u16) -> String {
        self.view_at(width, height, Utc::now())
    }

    pub fn view_at(&self, width: u16, height: u16, now: DateTime<Utc>) -> String {
        let (width, height) = floor_size(width, height);
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        self.render(area, &mut buf, now);
        buffer_text(&buf)
    }

    fn render_title_bar(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme();
        let mut spans = vec![
            Span::styled(
                "BOARD",
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" [by: {}]", self.mode_name()),
                Style::default().fg(theme.secondary),
            ),
        ];
        let hidden = self.hidden_column_count();
        if hidden > 0 {
            spans.push(Span::styled(
                format!(" [+{hidden} hidden]"),
                Style::default().fg(theme.muted),
            ));
        }
        let row = Rect { height: 1, ..area };
        Paragraph::new(Line::from(spans)).render(row, buf);
    }

    fn render_columns(
        &self,
        layout: &BoardLayout,
        area: Rect,
        buf: &mut Buffer,
        now: DateTime<Utc>,
    ) {
        let visible = self.visible_columns();
        let stride = layout.column_width + 1;
        let fit = usize::from((area.width + 1) / stride).max(1);
        let first = window_start(self.focused_position(), fit);

        let cards_height = layout
            .column_height
            .min(area.height.saturating_sub(CARDS_TOP));

        for (slot, (pos, &col)) in visible
            .iter()
            .enumerate()
            .skip(first)
            .take(fit)
            .enumerate()
        {
            let x = area.x + slot as u16 * stride;
            let column_area = Rect {
                x,
                y: area.y,
                width: layout.column_width,
                height: area.height,
            }
            .intersection(area);
            if column_area.is_empty() {
                break;
            }

            self.render_header(col, pos, layout.density, column_area, buf, now);
            let cards = Rect {
                y: column_area.y + CARDS_TOP,
                height: cards_height,
                ..column_area
            }
            .intersection(area);
            self.render_cards(col, layout.visible_cards, cards, buf, now);

            let is_last = slot + 1 == fit || pos + 1 == visible.len();
            if !is_last {
                let sep_x = x + layout.column_width;
                for y in area.y + 2..area.y + CARDS_TOP + cards_height {
                    put(
                        buf,
                        area,
                        sep_x,
                        y,
                        "│",
                        Style::default().fg(self.theme().border),
                    );
                }
            }
        }
    }

    fn render_header(
        &self,
        col: usize,
        pos: usize,
        density: StatDensity,
        area: Rect,
        buf: &mut Buffer,
        now: DateTime<Utc>,
    ) {
        let theme = self.theme();
        let lanes = self.mode().lanes();
        let stats = ColumnStats::compute(self.column(col), self.snapshot(), now);

        let mut header_style = Style::default()
            .fg(lanes.colors[col])
            .add_modifier(Modifier::BOLD);
        if pos == self.focused_position() {
            header_style = header_style.add_modifier(Modifier::UNDERLINED);
        }
        let title = truncate(
            &format!("{} {} ({})", lanes.icons[col], lanes.titles[col], stats.total),
            usize::from(area.width),
            "…",
        );
        let mut spans = vec![Span::styled(title, header_style)];

        if density != StatDensity::Count {
            if stats.p0 > 0 {
                spans.push(Span::styled(
                    format!(" {}🔴", stats.p0),
                    Style::default().fg(theme.blocked),
                ));
            }
            if stats.p1 > 0 {
                spans.push(Span::styled(
                    format!(" {}🟡", stats.p1),
                    Style::default().fg(theme.blocks_others),
                ));
            }
        }
        if density == StatDensity::Full {
            if self.mode() == SwimLaneMode::ByStatus && col == 1 && stats.blocked > 0 {
                spans.push(Span::styled(
                    format!(" ⚠{}", stats.blocked),
                    Style::default().fg(theme.blocked),
                ));
            }
            if let Some(age) = stats.oldest_age {
                spans.push(Span::styled(
                    format!(" ⏱{}", format_oldest_age(age)),
                    Style::default().fg(theme.age_color(Some(age))),
                ));
            }
        }

        let row = Rect {
            y: area.y + 2,
            height: 1,
            ..area
        }
        .intersection(area);
        Paragraph::new(Line::from(spans)).render(row, buf);
    }

    fn render_cards(
        &self,
        col: usize,
        visible_cards: usize,
        area: Rect,
        buf: &mut Buffer,
        now: DateTime<Utc>,
    ) {
        let theme = self.theme();
        let count = self.column_count(col);
        if area.is_empty() {
            return;
        }
        if count == 0 {
            put(
                buf,
                area,
                area.x + 1,
                area.y,
                "(empty)",
                Style::default().fg(theme.muted),
            );
            return;
        }

        let selected = self.selected_row(col);
        let start = window_start(selected, visible_cards);
        let bottom = area.y + area.height;
        let mut y = area.y;

        for row in start..count {
            if y >= bottom {
                break;
            }
            let Some(issue) = self.issue_at(col, row) else {
                break;
            };
            let state = CardState::at(self, col, row);
            let expanded = self.is_card_expanded(&issue.id);
            let height = if expanded {
                expanded_height(self, issue, area.width, now)
            } else {
                collapsed_height()
            };
            let card_area = Rect {
                y,
                height: height.min(bottom - y),
                ..area
            };
            if expanded {
                render_expanded_card(self, issue, state, card_area, buf, now);
            } else {
                render_card(self, issue, state, card_area, buf, now);
            }
            y = y.saturating_add(height);
        }

        if count > visible_cards {
            let indicator = format!("↕ {}/{}", selected + 1, count);
            let x = area.x + area.width.saturating_sub(indicator.width() as u16 + 1);
            put(
                buf,
                area,
                x,
                bottom - 1,
                &indicator,
                Style::default().fg(theme.muted),
            );
        }
    }
}

/// Write `text` at (x, y), clipped to `area`
fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
    if x < area.x || y < area.y || x >= area.right() || y >= area.bottom() {
        return;
    }
    buf.set_stringn(x, y, text, usize::from(area.right() - x), style);
}

/// Buffer contents as text, one line per row with trailing blanks removed
pub(crate) fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut lines = Vec::with_capacity(usize::from(area.height));
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        let mut skip = 0;
        for x in area.left()..area.right() {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            let symbol = buf[(x, y)].symbol();
            line.push_str(symbol);
            skip = symbol.width().saturating_sub(1);
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Dependency, DependencyKind, Issue, Status, VisibilityOverride};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn issue(id: &str, status: Status, priority: i32) -> Issue {
        Issue {
            id: id.to_string(),
            title: format!("Title of {id}"),
            status,
            priority,
            created_at: Some(now() - Duration::days(10)),
            ..Default::default()
        }
    }

    fn scenario() -> Vec<Issue> {
        vec![
            issue("open-low", Status::Open, 2),
            issue("wip", Status::InProgress, 1),
            issue("done", Status::Closed, 1),
            issue("open-hot", Status::Open, 0),
        ]
    }

    mod test_view {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_wide_view_shows_columns_and_detail() {
            let board = BoardModel::new(scenario());
            let text = board.view_at(200, 30, now());
            let first = text.lines().next().unwrap();
            assert!(first.starts_with("BOARD [by: Status]"));
            assert!(text.contains("OPEN (2)"));
            assert!(text.contains("IN PROGRESS (1)"));
            assert!(text.contains("BLOCKED (0)"));
            assert!(text.contains("CLOSED (1)"));
            assert!(text.contains("(empty)"));
            assert!(text.contains("DETAILS"));
            assert!(text.contains("Title of open-hot"));
        }

        #[test]
        fn test_full_density_stats() {
            let board = BoardModel::new(scenario());
            let text = board.view_at(200, 30, now());
            assert!(text.contains("OPEN (2) 1🔴 ⏱1w"));
            assert!(text.contains("IN PROGRESS (1) 1🟡 ⏱1w"));
        }

        #[test]
        fn test_narrow_view_hides_stats_and_detail() {
            let board = BoardModel::new(scenario());
            let text = board.view_at(80, 24, now());
            assert!(text.contains("OPEN (2)"));
            assert!(!text.contains("🔴"));
            assert!(!text.contains("DETAILS"));
            assert_eq!(text.split('\n').count(), 24);
        }

        #[test]
        fn test_narrow_view_scrolls_columns_with_focus() {
            let mut board = BoardModel::new(scenario());
            board.jump_to_last_column();
            let text = board.view_at(80, 24, now());
            assert!(text.contains("CLOSED (1)"));
            assert!(!text.contains("OPEN (2)"));
        }

        #[test]
        fn test_hidden_badge() {
            let mut board = BoardModel::new(scenario());
            board.cycle_swimlane_mode();
            let text = board.view_at(200, 30, now());
            assert!(text.starts_with("BOARD [by: Priority] [+1 hidden]"));
            assert!(!text.contains("P3+ OTHER"));
        }

        #[test]
        fn test_show_all_lists_empty_lanes() {
            let mut board = BoardModel::new(scenario());
            board.cycle_swimlane_mode();
            board.set_visibility_override(VisibilityOverride::ShowAll);
            let text = board.view_at(200, 30, now());
            assert!(text.contains("P3+ OTHER (0)"));
            assert!(!text.contains("hidden"));
        }

        #[test]
        fn test_empty_board_placeholders() {
            let board = BoardModel::default();
            let text = board.view_at(200, 30, now());
            assert!(text.contains("No issues to display"));
            assert!(text.contains("No Selection"));
        }

        #[test]
        fn test_degenerate_size_is_floored() {
            let board = BoardModel::new(scenario());
            let text = board.view_at(0, 0, now());
            assert_eq!(text.split('\n').count(), 8);
            assert!(text.starts_with("BOARD"));
        }

        #[test]
        fn test_render_into_small_area_does_not_panic() {
            let board = BoardModel::new(scenario());
            let mut buf = Buffer::empty(Rect::new(0, 0, 5, 2));
            board.render(Rect::new(0, 0, 5, 2), &mut buf, now());
            board.render(Rect::new(10, 10, 5, 2), &mut buf, now());
        }

        #[test]
        fn test_view_is_repeatable() {
            let board = BoardModel::new(scenario());
            assert_eq!(board.view_at(200, 30, now()), board.view_at(200, 30, now()));
        }

        #[test]
        fn test_split_change_redraws_detail_at_new_width() {
            let mut board = BoardModel::new(scenario());
            board.view_at(200, 30, now());
            board.shrink_detail();
            board.shrink_detail();
            let adjusted = board.view_at(200, 30, now());

            let mut fresh = BoardModel::new(scenario());
            fresh.set_split_percent(board.split_percent());
            assert_eq!(adjusted, fresh.view_at(200, 30, now()));
        }
    }

    mod test_cards {
        use super::*;
        use pretty_assertions::assert_eq;

        fn many(n: usize) -> BoardModel {
            BoardModel::new(
                (0..n)
                    .map(|i| issue(&format!("i-{i:02}"), Status::Open, 2))
                    .collect(),
            )
        }

        #[test]
        fn test_scroll_indicator_and_window() {
            let mut board = many(20);
            let text = board.view_at(200, 30, now());
            assert!(text.contains("↕ 1/20"));
            assert!(text.contains("Title of i-00"));

            for _ in 0..10 {
                board.move_down();
            }
            let text = board.view_at(200, 30, now());
            assert!(text.contains("↕ 11/20"));
            assert!(text.contains("Title of i-10"));
            assert!(!text.contains("Title of i-00"));
        }

        #[test]
        fn test_no_indicator_when_all_fit() {
            let board = many(2);
            let text = board.view_at(200, 30, now());
            assert!(!text.contains('↕'));
        }

        #[test]
        fn test_expanded_card_renders_inline() {
            let a = issue("A", Status::Open, 1);
            let b = Issue {
                dependencies: vec![Dependency {
                    issue_id: "B".into(),
                    depends_on_id: "A".into(),
                    kind: DependencyKind::Blocks,
                }],
                ..issue("B", Status::Open, 2)
            };
            let mut board = BoardModel::new(vec![a, b]);
            board.toggle_expand();
            let text = board.view_at(200, 40, now());
            assert!(text.contains("Blocks:"));
            assert!(text.contains("• B: Title of B"));

            board.move_down();
            let text = board.view_at(200, 40, now());
            assert!(!text.contains("Blocks:"));
        }

        #[test]
        fn test_dependency_border_colors() {
            let a = issue("A", Status::InProgress, 1);
            let b = Issue {
                dependencies: vec![Dependency {
                    issue_id: "B".into(),
                    depends_on_id: "A".into(),
                    kind: DependencyKind::Blocks,
                }],
                ..issue("B", Status::Closed, 2)
            };
            let mut board = BoardModel::new(vec![a, b]);
            board.hide_detail();
            let area = Rect::new(0, 0, 140, 30);
            let mut buf = Buffer::empty(area);
            board.render(area, &mut buf, now());

            let theme = *board.theme();
            // focus sits on the empty open column
            let column_width = board.layout(140, 30).column_width;
            let in_progress_x = column_width + 1;
            let closed_x = 3 * (column_width + 1);
            assert_eq!(buf[(in_progress_x, CARDS_TOP)].fg, theme.blocks_others);
            assert_eq!(buf[(closed_x, CARDS_TOP)].fg, theme.blocked);
        }
    }

    #[test]
    fn test_buffer_text_skips_wide_cell_tails() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        buf.set_string(0, 0, "🔴ab", Style::default());
        assert_eq!(buffer_text(&buf), "🔴ab");
    }
}
