//! Detail panel for the selected issue
//!
//! Content is markdown, formatted once per selection and panel width through
//! the board's renderer, wrapped to display rows and kept in the detail
//! cache; scrolling reuses the cached rows.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

use super::markdown::render_or_plain;
use super::text::{format_time_rel, wrap_line};
use crate::state::{BoardModel, Issue, NO_SELECTION_KEY};

const PLACEHOLDER: &str = "## No Selection\n\n\
Navigate to a card with **h/l** and **j/k** to see details here.\n\n\
Press **Tab** to hide this panel.";

/// Markdown source for `issue`, or the placeholder when nothing is selected
pub fn detail_source(board: &BoardModel, issue: Option<&Issue>, now: DateTime<Utc>) -> String {
    let Some(issue) = issue else {
        return PLACEHOLDER.to_string();
    };
    let theme = board.theme();
    let snapshot = board.snapshot();
    let (icon, _) = theme.type_icon(&issue.issue_type);

    let mut md = String::new();
    let _ = writeln!(md, "## {icon} {}\n", issue.id);
    let _ = writeln!(md, "**{}**\n", issue.title);
    let _ = writeln!(
        md,
        "{} **{}** · {} **{}**\n",
        theme.status_icon(&issue.status),
        issue.status,
        theme.priority_icon(issue.priority),
        issue.priority_label()
    );
    if let Some(assignee) = issue.assignee.as_deref().filter(|a| !a.is_empty()) {
        let _ = writeln!(md, "**Assignee:** @{assignee}\n");
    }
    if !issue.labels.is_empty() {
        let _ = writeln!(md, "**Labels:** {}\n", issue.labels.join(", "));
    }

    let blockers: Vec<_> = issue.blocking_deps().collect();
    if !blockers.is_empty() {
        let _ = writeln!(md, "### 🚫 Blocked by\n");
        for dep in blockers {
            match snapshot.find(&dep.depends_on_id) {
                Some(target) => {
                    let _ = writeln!(
                        md,
                        "- **{}**: {} ({})",
                        target.id, target.title, target.status
                    );
                }
                None => {
                    let _ = writeln!(md, "- {}", dep.depends_on_id);
                }
            }
        }
        md.push('\n');
    }

    let dependents = board.deps().blocks(&issue.id);
    if !dependents.is_empty() {
        let _ = writeln!(md, "### ⚡ Blocks\n");
        for id in dependents {
            match snapshot.find(id) {
                Some(target) => {
                    let _ = writeln!(md, "- **{}**: {}", target.id, target.title);
                }
                None => {
                    let _ = writeln!(md, "- {id}");
                }
            }
        }
        let _ = writeln!(
            md,
            "\n💡 Completing this would unblock {} issue(s)\n",
            dependents.len()
        );
    }

    if !issue.description.trim().is_empty() {
        let _ = writeln!(md, "---\n\n{}\n", issue.description.trim_end());
    }

    let _ = writeln!(md, "---\n");
    let _ = write!(
        md,
        "Created {} · Updated {}",
        format_time_rel(issue.created_at, now),
        format_time_rel(issue.updated_at, now)
    );
    md
}

/// Draw the panel, rebuilding cached content only when the selection changed
pub fn render_detail_panel(board: &BoardModel, area: Rect, buf: &mut Buffer, now: DateTime<Utc>) {
    let theme = board.theme();
    let inner_width = area.width.saturating_sub(2);
    let inner_height = usize::from(area.height.saturating_sub(2));

    let selected = board.selected_issue();
    let key = selected.map_or(NO_SELECTION_KEY, |issue| issue.id.as_str());

    let mut cache = board.detail_cache().borrow_mut();
    let rebuilt = cache.ensure(key, inner_width, || {
        let source = detail_source(board, selected, now);
        render_or_plain(board.markdown(), &source, inner_width)
            .lines
            .iter()
            .flat_map(|line| wrap_line(line, usize::from(inner_width)))
            .collect()
    });
    cache.set_viewport(inner_height);
    if rebuilt {
        tracing::debug!("Detail panel rebuilt for {key}");
    }

    let border_style = if board.detail_focused() {
        Style::default().fg(theme.primary)
    } else {
        Style::default().fg(theme.border)
    };
    let mut block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(Line::styled(
            " DETAILS ",
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ));

    let total = cache.lines().len();
    if total > inner_height {
        block = block.title_bottom(
            Line::styled(
                format!(" ↕ {}/{} ", cache.last_visible_row(), total),
                Style::default().fg(theme.muted),
            )
            .right_aligned(),
        );
    }

    let scroll = u16::try_from(cache.scroll()).unwrap_or(u16::MAX);
    Paragraph::new(cache.lines().to_vec())
        .block(block)
        .scroll((scroll, 0))
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Dependency, DependencyKind, Status};
    use crate::ui::board::buffer_text;
    use crate::ui::markdown::{MarkdownError, MarkdownRender};
    use chrono::{Duration, TimeZone};
    use ratatui::text::Text;
    use std::cell::Cell;
    use std::rc::Rc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn board() -> BoardModel {
        let a = Issue {
            id: "A".into(),
            title: "Parser".into(),
            status: Status::InProgress,
            priority: 0,
            assignee: Some("sam".into()),
            labels: vec!["core".into()],
            description: "Handle *nested* lists.".into(),
            created_at: Some(now() - Duration::days(3)),
            ..Default::default()
        };
        let b = Issue {
            id: "B".into(),
            title: "Release".into(),
            dependencies: vec![
                Dependency {
                    issue_id: "B".into(),
                    depends_on_id: "A".into(),
                    kind: DependencyKind::Blocks,
                },
                Dependency {
                    issue_id: "B".into(),
                    depends_on_id: "ghost".into(),
                    kind: DependencyKind::Blocks,
                },
            ],
            ..Default::default()
        };
        BoardModel::new(vec![a, b])
    }

    fn panel_text(board: &BoardModel, height: u16) -> String {
        let area = Rect::new(0, 0, 50, height);
        let mut buf = Buffer::empty(area);
        render_detail_panel(board, area, &mut buf, now());
        buffer_text(&buf)
    }

    mod test_source {
        use super::*;

        #[test]
        fn test_placeholder() {
            let board = board();
            let md = detail_source(&board, None, now());
            assert!(md.starts_with("## No Selection"));
            assert!(md.contains("**h/l**"));
        }

        #[test]
        fn test_blocker_side() {
            let board = board();
            let a = board.snapshot().find("A").unwrap();
            let md = detail_source(&board, Some(a), now());
            assert!(md.starts_with("## T A"));
            assert!(md.contains("**Parser**"));
            assert!(md.contains("**in_progress**"));
            assert!(md.contains("**P0**"));
            assert!(md.contains("**Assignee:** @sam"));
            assert!(md.contains("**Labels:** core"));
            assert!(md.contains("- **B**: Release"));
            assert!(md.contains("Completing this would unblock 1 issue(s)"));
            assert!(md.contains("Handle *nested* lists."));
            assert!(md.ends_with("Created 3d ago · Updated unknown"));
        }

        #[test]
        fn test_blocked_side_resolves_titles() {
            let board = board();
            let b = board.snapshot().find("B").unwrap();
            let md = detail_source(&board, Some(b), now());
            assert!(md.contains("- **A**: Parser (in_progress)"));
            assert!(md.contains("- ghost\n"));
            assert!(!md.contains("Assignee"));
            assert!(!md.contains("unblock"));
        }
    }

    mod test_render {
        use super::*;

        #[test]
        fn test_renders_selected_issue() {
            let board = board();
            let text = panel_text(&board, 30);
            assert!(text.contains("DETAILS"));
            // open issue B sorts first in the open column
            assert!(text.contains("Release"));
            assert!(text.contains("Blocked by"));
        }

        #[test]
        fn test_empty_board_shows_placeholder() {
            let board = BoardModel::default();
            let text = panel_text(&board, 20);
            assert!(text.contains("No Selection"));
            assert_eq!(
                board.detail_cache().borrow().key(),
                Some(NO_SELECTION_KEY)
            );
        }

        #[test]
        fn test_overflow_shows_scroll_hint() {
            let board = board();
            let text = panel_text(&board, 8);
            assert!(text.contains("↕ 6/"));
        }

        struct Counting(Rc<Cell<usize>>);

        impl MarkdownRender for Counting {
            fn render(&self, source: &str, _width: u16) -> Result<Text<'static>, MarkdownError> {
                self.0.set(self.0.get() + 1);
                Ok(Text::from(source.to_string()))
            }
        }

        #[test]
        fn test_content_is_formatted_once_per_selection() {
            let calls = Rc::new(Cell::new(0));
            let mut board = board().with_markdown(Box::new(Counting(Rc::clone(&calls))));
            panel_text(&board, 30);
            panel_text(&board, 30);
            assert_eq!(calls.get(), 1);

            board.move_right();
            panel_text(&board, 30);
            assert_eq!(calls.get(), 2);
        }

        struct Broken;

        impl MarkdownRender for Broken {
            fn render(&self, _source: &str, _width: u16) -> Result<Text<'static>, MarkdownError> {
                Err(MarkdownError::Unbalanced(1))
            }
        }

        #[test]
        fn test_renderer_failure_shows_raw_markdown() {
            let board = board().with_markdown(Box::new(Broken));
            let text = panel_text(&board, 30);
            assert!(text.contains("## T B"));
        }

        #[test]
        fn test_scroll_moves_content() {
            let mut board = board();
            panel_text(&board, 10);
            board.detail_scroll_down(2);
            let text = panel_text(&board, 10);
            let first = text.lines().nth(1).unwrap_or("");
            assert!(first.contains("Release"));
            assert!(!first.contains("T B"));
        }

        #[test]
        fn test_long_description_scrolls_to_its_end() {
            let words: Vec<String> = (0..200).map(|i| format!("word{i}")).collect();
            let issue = Issue {
                id: "long".into(),
                title: "Long read".into(),
                description: format!("{} ENDMARK", words.join(" ")),
                ..Default::default()
            };
            let mut board = BoardModel::new(vec![issue]);
            let area = Rect::new(0, 0, 50, 12);

            let mut buf = Buffer::empty(area);
            render_detail_panel(&board, area, &mut buf, now());
            assert!(!buffer_text(&buf).contains("ENDMARK"));
            let rows = board.detail_cache().borrow().lines().len();
            assert!(rows > 20);

            board.detail_scroll_down(10_000);
            let mut buf = Buffer::empty(area);
            render_detail_panel(&board, area, &mut buf, now());
            let text = buffer_text(&buf);
            assert!(text.contains("ENDMARK"));
            assert!(text.contains(&format!("↕ {rows}/{rows}")));
            assert_eq!(board.detail_cache().borrow().scroll(), rows - 10);
        }

        #[test]
        fn test_cached_rows_fit_panel_width() {
            let board = board();
            panel_text(&board, 30);
            let cache = board.detail_cache().borrow();
            assert!(cache.lines().iter().all(|line| line.width() <= 48));
        }
    }
}
