//! Layout components (board area, status bar)

use crate::app::{App, IssueFilter};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Create the main layout, reserving the bottom line for the status bar
pub fn create_layout(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Board
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    chunks[0]
}

/// Keyboard hints for the current input mode
fn hints(app: &App) -> &'static str {
    if app.board.is_search_mode() {
        "Enter:keep  Esc:cancel  ↑/↓:match"
    } else if app.board.detail_focused() {
        "j/k:scroll  S-Tab:board  Tab:hide  q:quit"
    } else {
        "hjkl:nav  /:search  s:group  e:empty  d:expand  Tab:detail  y:copy  q:quit"
    }
}

/// Spans describing search state, if any
fn search_spans(app: &App) -> Vec<Span<'static>> {
    let board = &app.board;
    if board.is_search_mode() {
        let mut spans = vec![Span::styled(
            format!(" /{}", board.search_query()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )];
        if !board.search_query().is_empty() {
            spans.push(Span::styled(
                format!(
                    " [{}/{}]",
                    board.search_cursor_pos(),
                    board.search_match_count()
                ),
                Style::default().fg(Color::Gray),
            ));
        }
        return spans;
    }
    if board.search_match_count() > 0 {
        return vec![Span::styled(
            format!(
                " [{}/{}] n/N",
                board.search_cursor_pos(),
                board.search_match_count()
            ),
            Style::default().fg(Color::Gray),
        )];
    }
    Vec::new()
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = search_spans(app);
    if spans.is_empty() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(hints(app), Style::default().fg(Color::Gray)));
    }

    if app.filter() != IssueFilter::All {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("filter: {}", app.filter().label()),
            Style::default().fg(Color::Cyan),
        ));
    }

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg.clone(), Style::default().fg(Color::Green)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    // Issue count on the right
    let count = format!(" {} issues ", app.board.total_count());
    let count_width = count.len() as u16;
    let count_area = Rect {
        x: area.width.saturating_sub(count_width),
        y: area.height.saturating_sub(1),
        width: count_width.min(area.width),
        height: 1,
    };
    let count_widget =
        Paragraph::new(count).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(count_widget, count_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuiConfig;
    use crate::source::MockIssueSource;
    use crate::state::Issue;
    use crate::ui::board::buffer_text;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        let mut source = MockIssueSource::new();
        source.expect_load_issues().returning(|| {
            Ok(vec![
                Issue {
                    id: "bv-1".into(),
                    title: "Parser".into(),
                    ..Default::default()
                },
                Issue {
                    id: "bv-2".into(),
                    title: "Printer".into(),
                    ..Default::default()
                },
            ])
        });
        source.expect_describe().return_const("mock".to_string());
        tokio_test::block_on(App::with_source(Box::new(source), TuiConfig::default())).unwrap()
    }

    fn press(app: &mut App, c: char) {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        tokio_test::block_on(app.handle_key(key)).unwrap();
    }

    fn status_line(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| crate::ui::draw(frame, app)).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        text.lines().last().unwrap_or_default().to_string()
    }

    #[test]
    fn test_create_layout_reserves_status_row() {
        let board = create_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(board, Rect::new(0, 0, 80, 23));
    }

    #[test]
    fn test_status_bar_shows_hints_and_message() {
        let app = app();
        let line = status_line(&app);
        assert!(line.contains("hjkl:nav"));
        assert!(line.contains("Loaded 2 issues"));
        assert!(line.ends_with("2 issues"));
    }

    #[test]
    fn test_status_bar_shows_search_prompt() {
        let mut app = app();
        press(&mut app, '/');
        press(&mut app, 'p');
        let line = status_line(&app);
        assert!(line.starts_with(" /p [1/2]"));
    }

    #[test]
    fn test_status_bar_shows_filter() {
        let mut app = app();
        press(&mut app, 'o');
        let line = status_line(&app);
        assert!(line.contains("filter: Open"));
    }

    #[test]
    fn test_draw_renders_board() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| crate::ui::draw(frame, &app)).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.starts_with("BOARD [by: Status]"));
        assert!(text.contains("Parser"));
    }
}
