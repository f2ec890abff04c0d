//! Issue cards: the compact three-line form and the inline expanded form

use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use super::markdown::render_or_plain;
use super::text::{format_time_rel, truncate, wrap};
use crate::state::{issue_age, BoardModel, Issue, Status};

/// Border, padding and the gap below a card
const CARD_CHROME: u16 = 4;
const CARD_BODY_LINES: u16 = 3;
const AGE_MAX_WIDTH: usize = 6;
const MAX_CARD_LABELS: usize = 3;
const LABEL_MAX_WIDTH: usize = 8;
const BLOCKER_ID_MAX: usize = 10;
const BLOCKER_TITLE_MAX: usize = 12;
const EXPANDED_DESCRIPTION_LINES: usize = 8;

/// Highlight state of one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardState {
    pub selected: bool,
    pub current_match: bool,
    pub search_match: bool,
}

impl CardState {
    pub fn at(board: &BoardModel, col: usize, row: usize) -> Self {
        Self {
            selected: board.focused_column() == col && board.selected_row(col) == row,
            current_match: board.is_match_highlighted(col, row),
            search_match: board.is_search_match(col, row),
        }
    }
}

/// Border color, first rule wins: selection, search, dependencies, status
pub fn border_color(board: &BoardModel, issue: &Issue, state: CardState) -> Color {
    let theme = board.theme();
    if state.selected {
        theme.primary
    } else if state.current_match {
        theme.match_current
    } else if state.search_match {
        theme.match_any
    } else if issue.has_blocking_deps() {
        theme.blocked
    } else if board.deps().blocks_others(&issue.id) {
        theme.blocks_others
    } else if issue.status == Status::Open {
        theme.open
    } else {
        theme.border
    }
}

/// Total rows a collapsed card occupies, including the gap below it
pub fn collapsed_height() -> u16 {
    CARD_BODY_LINES + 2 + 1
}

fn inner_width(card_width: u16) -> usize {
    usize::from(card_width.saturating_sub(CARD_CHROME))
}

fn short_age(issue: &Issue, now: DateTime<Utc>) -> String {
    match issue.updated_at.or(issue.created_at) {
        Some(t) => {
            let rel = format_time_rel(Some(t), now);
            truncate(rel.trim_end_matches(" ago"), AGE_MAX_WIDTH, "")
        }
        None => String::new(),
    }
}

/// Type badge, priority, ID and, right-aligned, `trailer`
fn header_line(
    board: &BoardModel,
    issue: &Issue,
    width: usize,
    trailer: Span<'static>,
) -> Line<'static> {
    let theme = board.theme();
    let (icon, icon_color) = theme.type_icon(&issue.issue_type);
    let priority = issue.priority_label();
    let id_max = width.saturating_sub(14).max(6);
    let id = truncate(&issue.id, id_max, "…");

    let used = icon.width() + 1 + priority.width() + 1 + id.width();
    let pad = width.saturating_sub(used + trailer.width()).max(1);

    Line::from(vec![
        Span::styled(
            icon.to_string(),
            Style::default().fg(icon_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(priority, theme.priority_style(issue.priority)),
        Span::raw(" "),
        Span::styled(id, Style::default().fg(theme.secondary)),
        Span::raw(" ".repeat(pad)),
        trailer,
    ])
}

/// Three content lines of a collapsed card
pub fn card_lines(
    board: &BoardModel,
    issue: &Issue,
    state: CardState,
    card_width: u16,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let theme = board.theme();
    let width = inner_width(card_width);

    let age = Span::styled(
        short_age(issue, now),
        Style::default().fg(theme.age_color(issue_age(issue, now))),
    );
    let header = header_line(board, issue, width, age);

    let title_style = if state.selected {
        Style::default()
            .fg(theme.primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };
    let title = Line::from(Span::styled(
        truncate(&issue.title, width.saturating_sub(2).max(10), "…"),
        title_style,
    ));

    vec![header, title, meta_line(board, issue)]
}

/// First blocker, blocks count and a few labels
fn meta_line(board: &BoardModel, issue: &Issue) -> Line<'static> {
    let theme = board.theme();
    let mut spans = Vec::new();

    if let Some(dep) = issue.blocking_deps().next() {
        let mut text = format!(
            "🚫←{}",
            truncate(&dep.depends_on_id, BLOCKER_ID_MAX, "…")
        );
        if let Some(target) = board.snapshot().find(&dep.depends_on_id) {
            text.push_str(&format!(
                " ({})",
                truncate(&target.title, BLOCKER_TITLE_MAX, "…")
            ));
        }
        spans.push(Span::styled(text, Style::default().fg(theme.blocked)));
    }

    let blocks = board.deps().blocks(&issue.id).len();
    if blocks > 0 {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("⚡→{blocks}"),
            Style::default().fg(theme.blocks_others),
        ));
    }

    for label in issue.labels.iter().take(MAX_CARD_LABELS) {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            truncate(label, LABEL_MAX_WIDTH, "…"),
            Style::default().fg(theme.muted),
        ));
    }

    Line::from(spans)
}

/// Content of the single expanded card
pub fn expanded_lines(
    board: &BoardModel,
    issue: &Issue,
    card_width: u16,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let theme = board.theme();
    let width = inner_width(card_width);
    let muted = Style::default().fg(theme.muted);

    let marker = Span::styled("▼", Style::default().fg(theme.primary));
    let mut lines = vec![header_line(board, issue, width, marker)];

    let title_style = Style::default()
        .fg(theme.primary)
        .add_modifier(Modifier::BOLD);
    lines.extend(
        wrap(&issue.title, width)
            .into_iter()
            .map(|l| Line::styled(l, title_style)),
    );
    lines.push(Line::styled("─".repeat(width), muted));

    if !issue.description.trim().is_empty() {
        let mut source: Vec<&str> = issue
            .description
            .lines()
            .take(EXPANDED_DESCRIPTION_LINES)
            .collect();
        if issue.description.lines().count() > EXPANDED_DESCRIPTION_LINES {
            source.push("...");
        }
        let text = render_or_plain(board.markdown(), &source.join("\n"), width as u16);
        lines.extend(text.lines);
    }

    let blockers: Vec<_> = issue.blocking_deps().collect();
    if !blockers.is_empty() {
        lines.push(Line::default());
        lines.push(Line::styled(
            "Blocked by:",
            Style::default()
                .fg(theme.blocked)
                .add_modifier(Modifier::BOLD),
        ));
        for dep in blockers {
            let entry = match board.snapshot().find(&dep.depends_on_id) {
                Some(target) => format!(
                    "  • {}: {} ({})",
                    dep.depends_on_id, target.title, target.status
                ),
                None => format!("  • {}", dep.depends_on_id),
            };
            lines.push(Line::from(truncate(&entry, width, "…")));
        }
    }

    let dependents = board.deps().blocks(&issue.id);
    if !dependents.is_empty() {
        lines.push(Line::default());
        lines.push(Line::styled(
            "Blocks:",
            Style::default()
                .fg(theme.blocks_others)
                .add_modifier(Modifier::BOLD),
        ));
        for id in dependents {
            let entry = match board.snapshot().find(id) {
                Some(target) => format!("  • {}: {}", id, target.title),
                None => format!("  • {id}"),
            };
            lines.push(Line::from(truncate(&entry, width, "…")));
        }
    }

    if !issue.labels.is_empty() {
        lines.push(Line::default());
        lines.push(Line::styled(
            truncate(&format!("🏷 {}", issue.labels.join(", ")), width, "…"),
            muted,
        ));
    }

    lines.push(Line::styled(
        truncate(
            &format!(
                "Created {} · Updated {}",
                format_time_rel(issue.created_at, now),
                format_time_rel(issue.updated_at, now)
            ),
            width,
            "…",
        ),
        muted,
    ));
    lines
}

/// Rows the expanded card needs, including borders and the gap below
pub fn expanded_height(
    board: &BoardModel,
    issue: &Issue,
    card_width: u16,
    now: DateTime<Utc>,
) -> u16 {
    let content = expanded_lines(board, issue, card_width, now).len() as u16;
    content.saturating_add(3)
}

fn card_block(color: Color, state: CardState) -> Block<'static> {
    let border_type = if state.selected || state.current_match {
        BorderType::Thick
    } else {
        BorderType::Rounded
    };
    Block::bordered()
        .border_type(border_type)
        .border_style(Style::default().fg(color))
        .padding(Padding::horizontal(1))
}

/// Draw a collapsed card into `area`; the gap row is left untouched
pub fn render_card(
    board: &BoardModel,
    issue: &Issue,
    state: CardState,
    area: Rect,
    buf: &mut Buffer,
    now: DateTime<Utc>,
) {
    let area = Rect {
        height: area.height.min(CARD_BODY_LINES + 2),
        ..area
    };
    let color = border_color(board, issue, state);
    Paragraph::new(card_lines(board, issue, state, area.width, now))
        .block(card_block(color, state))
        .render(area, buf);
}

/// Draw the expanded card, clipped to `area`
pub fn render_expanded_card(
    board: &BoardModel,
    issue: &Issue,
    state: CardState,
    area: Rect,
    buf: &mut Buffer,
    now: DateTime<Utc>,
) {
    let lines = expanded_lines(board, issue, area.width, now);
    let area = Rect {
        height: area.height.min(lines.len() as u16 + 2),
        ..area
    };
    let color = border_color(board, issue, state);
    Paragraph::new(lines)
        .block(card_block(color, state))
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Dependency, DependencyKind};
    use crate::ui::board::buffer_text;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn blocks(from: &str, on: &str) -> Dependency {
        Dependency {
            issue_id: from.into(),
            depends_on_id: on.into(),
            kind: DependencyKind::Blocks,
        }
    }

    /// A is blocked on by B
    fn pair() -> BoardModel {
        let a = Issue {
            id: "A".into(),
            title: "Build the parser".into(),
            status: Status::InProgress,
            priority: 1,
            updated_at: Some(now() - Duration::days(2)),
            ..Default::default()
        };
        let b = Issue {
            id: "B".into(),
            title: "Ship it".into(),
            status: Status::Open,
            priority: 2,
            labels: vec!["release".into(), "backend-service".into()],
            dependencies: vec![blocks("B", "A")],
            ..Default::default()
        };
        BoardModel::new(vec![a, b])
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn draw(board: &BoardModel, id: &str, state: CardState, expanded: bool) -> String {
        let issue = board.snapshot().find(id).unwrap();
        let area = Rect::new(0, 0, 32, if expanded { 20 } else { 5 });
        let mut buf = Buffer::empty(area);
        if expanded {
            render_expanded_card(board, issue, state, area, &mut buf, now());
        } else {
            render_card(board, issue, state, area, &mut buf, now());
        }
        buffer_text(&buf)
    }

    mod test_border {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_dependency_colors() {
            let board = pair();
            let theme = *board.theme();
            let a = board.snapshot().find("A").unwrap();
            let b = board.snapshot().find("B").unwrap();
            assert_eq!(border_color(&board, a, CardState::default()), theme.blocks_others);
            assert_eq!(border_color(&board, b, CardState::default()), theme.blocked);
        }

        #[test]
        fn test_selection_and_search_take_precedence() {
            let board = pair();
            let theme = *board.theme();
            let b = board.snapshot().find("B").unwrap();
            let selected = CardState {
                selected: true,
                current_match: true,
                search_match: true,
            };
            assert_eq!(border_color(&board, b, selected), theme.primary);
            let current = CardState {
                current_match: true,
                search_match: true,
                ..Default::default()
            };
            assert_eq!(border_color(&board, b, current), theme.match_current);
            let any = CardState {
                search_match: true,
                ..Default::default()
            };
            assert_eq!(border_color(&board, b, any), theme.match_any);
        }

        #[test]
        fn test_status_fallbacks() {
            let board = BoardModel::new(vec![
                Issue {
                    id: "o".into(),
                    ..Default::default()
                },
                Issue {
                    id: "c".into(),
                    status: Status::Closed,
                    ..Default::default()
                },
            ]);
            let theme = *board.theme();
            let open = board.snapshot().find("o").unwrap();
            let closed = board.snapshot().find("c").unwrap();
            assert_eq!(border_color(&board, open, CardState::default()), theme.open);
            assert_eq!(border_color(&board, closed, CardState::default()), theme.border);
        }

        #[test]
        fn test_rendered_border_uses_color() {
            let board = pair();
            let a = board.snapshot().find("A").unwrap();
            let mut buf = Buffer::empty(Rect::new(0, 0, 30, 5));
            render_card(&board, a, CardState::default(), buf.area, &mut buf, now());
            assert_eq!(buf[(0, 0)].fg, board.theme().blocks_others);
            assert_eq!(buf[(0, 0)].symbol(), "╭");
        }
    }

    mod test_collapsed {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_three_lines() {
            let board = pair();
            let b = board.snapshot().find("B").unwrap();
            let lines = card_lines(&board, b, CardState::default(), 40, now());
            assert_eq!(lines.len(), 3);
            assert!(plain(&lines[0]).starts_with("T P2 B"));
            assert_eq!(plain(&lines[1]), "Ship it");
            assert_eq!(plain(&lines[2]), "🚫←A (Build the p…) release backend…");
        }

        #[test]
        fn test_blocks_badge_and_age() {
            let board = pair();
            let a = board.snapshot().find("A").unwrap();
            let lines = card_lines(&board, a, CardState::default(), 40, now());
            assert!(plain(&lines[0]).ends_with(" 2d"));
            assert_eq!(plain(&lines[2]), "⚡→1");
        }

        #[test]
        fn test_long_id_and_title_are_truncated() {
            let issue = Issue {
                id: "project-with-a-very-long-identifier".into(),
                title: "A title far too long for a narrow card".into(),
                ..Default::default()
            };
            let board = BoardModel::new(vec![issue]);
            let issue = board.snapshot().find("project-with-a-very-long-identifier").unwrap();
            let lines = card_lines(&board, issue, CardState::default(), 28, now());
            assert!(plain(&lines[0]).contains("project-w…"));
            assert!(plain(&lines[1]).ends_with('…'));
            assert!(plain(&lines[1]).width() <= 22);
        }

        #[test]
        fn test_selected_title_is_bold() {
            let board = pair();
            let a = board.snapshot().find("A").unwrap();
            let state = CardState {
                selected: true,
                ..Default::default()
            };
            let lines = card_lines(&board, a, state, 40, now());
            let style = lines[1].spans[0].style;
            assert!(style.add_modifier.contains(Modifier::BOLD));
            assert_eq!(style.fg, Some(board.theme().primary));
        }

        #[test]
        fn test_render_draws_box() {
            let board = pair();
            let text = draw(&board, "A", CardState::default(), false);
            let rows: Vec<&str> = text.lines().collect();
            assert_eq!(rows.len(), 5);
            assert!(rows[0].starts_with('╭'));
            assert!(rows[2].contains("Build the parser"));
            assert!(rows[4].starts_with('╰'));
        }

        #[test]
        fn test_selected_card_is_thick() {
            let board = pair();
            let state = CardState {
                selected: true,
                ..Default::default()
            };
            let text = draw(&board, "A", state, false);
            assert!(text.starts_with('┏'));
        }
    }

    mod test_expanded {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_dependency_sections() {
            let board = pair();
            let b = board.snapshot().find("B").unwrap();
            let lines: Vec<String> = expanded_lines(&board, b, 60, now())
                .iter()
                .map(plain)
                .collect();
            assert!(lines[0].ends_with('▼'));
            assert_eq!(lines[1], "Ship it");
            assert!(lines.contains(&"Blocked by:".to_string()));
            assert!(lines.contains(&"  • A: Build the parser (in_progress)".to_string()));
            assert!(lines.iter().any(|l| l.contains("release, backend-service")));
            assert!(lines.last().unwrap().starts_with("Created unknown"));

            let a = board.snapshot().find("A").unwrap();
            let lines: Vec<String> = expanded_lines(&board, a, 60, now())
                .iter()
                .map(plain)
                .collect();
            assert!(lines.contains(&"Blocks:".to_string()));
            assert!(lines.contains(&"  • B: Ship it".to_string()));
        }

        #[test]
        fn test_unresolved_blocker_shows_raw_id() {
            let board = BoardModel::new(vec![Issue {
                id: "x".into(),
                dependencies: vec![blocks("x", "gone-1")],
                ..Default::default()
            }]);
            let x = board.snapshot().find("x").unwrap();
            let lines: Vec<String> = expanded_lines(&board, x, 60, now())
                .iter()
                .map(plain)
                .collect();
            assert!(lines.contains(&"  • gone-1".to_string()));
        }

        #[test]
        fn test_description_is_capped() {
            let description = (1..=12)
                .map(|n| format!("line {n}"))
                .collect::<Vec<_>>()
                .join("\n\n");
            let board = BoardModel::new(vec![Issue {
                id: "d".into(),
                title: "Long".into(),
                description,
                ..Default::default()
            }]);
            let d = board.snapshot().find("d").unwrap();
            let lines: Vec<String> = expanded_lines(&board, d, 60, now())
                .iter()
                .map(plain)
                .collect();
            assert!(lines.contains(&"line 4".to_string()));
            assert!(!lines.contains(&"line 5".to_string()));
            assert!(lines.contains(&"...".to_string()));
        }

        #[test]
        fn test_expanded_height_counts_chrome() {
            let board = pair();
            let a = board.snapshot().find("A").unwrap();
            let content = expanded_lines(&board, a, 40, now()).len() as u16;
            assert_eq!(expanded_height(&board, a, 40, now()), content + 3);
        }

        #[test]
        fn test_render_expanded() {
            let board = pair();
            let text = draw(&board, "A", CardState::default(), true);
            assert!(text.contains("Blocks:"));
            assert!(text.contains("▼"));
        }
    }
}
