//! Application state and core logic

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::TuiConfig;
use crate::source::{IssueSource, JsonFileSource};
use crate::state::{is_ready, BoardModel, Issue, IssueSnapshot};

/// Lines moved by ctrl+j / ctrl+k in the detail panel
const DETAIL_SCROLL_STEP: usize = 3;

/// Which issues reach the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueFilter {
    #[default]
    All,
    Open,
    Closed,
    /// Open with no unresolved blocker
    Ready,
}

impl IssueFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::Ready => "Ready",
        }
    }
}

/// Main application struct
pub struct App {
    /// Board view model
    pub board: BoardModel,
    /// Where issues come from
    source: Box<dyn IssueSource>,
    /// Unfiltered issue set from the last load
    all_issues: Vec<Issue>,
    /// Active filter
    filter: IssueFilter,
    /// Feedback shown in the status bar until the next key press
    pub status_message: Option<String>,
    /// Whether the app should quit
    quit: bool,
    /// First `g` of `gg` seen
    waiting_for_g: bool,
    /// Terminal size (height, width)
    pub terminal_size: Option<(u16, u16)>,
}

impl App {
    /// Create a new App reading the configured issue file
    pub async fn new(config: TuiConfig) -> Result<Self> {
        let source = match &config.issues_path {
            Some(path) => JsonFileSource::new(path),
            None => JsonFileSource::default(),
        };
        Self::with_source(Box::new(source), config).await
    }

    /// Create an App over any source; load failures leave the board empty
    pub async fn with_source(source: Box<dyn IssueSource>, config: TuiConfig) -> Result<Self> {
        let mut board = BoardModel::default();
        if let Some(mode) = config.swimlane_mode {
            board.set_swimlane_mode(mode);
        }
        if let Some(visibility) = config.empty_columns {
            board.set_visibility_override(visibility);
        }
        if config.show_detail == Some(false) {
            board.hide_detail();
        }
        board.set_split_percent(config.board_split_percent);

        let mut app = Self {
            board,
            source,
            all_issues: Vec::new(),
            filter: IssueFilter::default(),
            status_message: None,
            quit: false,
            waiting_for_g: false,
            terminal_size: None,
        };
        app.reload().await;
        Ok(app)
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn filter(&self) -> IssueFilter {
        self.filter
    }

    pub fn source_name(&self) -> String {
        self.source.describe()
    }

    /// Settings worth keeping for the next session
    pub fn current_config(&self, base: &TuiConfig) -> TuiConfig {
        TuiConfig {
            swimlane_mode: Some(self.board.mode()),
            empty_columns: Some(self.board.visibility_override()),
            show_detail: Some(self.board.is_detail_requested()),
            board_split_percent: self.board.split_percent(),
            ..base.clone()
        }
    }

    /// Record a terminal resize; the bottom row belongs to the status bar
    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = Some((height, width));
        self.board.resize(width, height.saturating_sub(1));
    }

    /// Reload from the source, keeping the selected issue when it survives
    pub async fn reload(&mut self) {
        match self.source.load_issues().await {
            Ok(issues) => {
                tracing::info!("Loaded {} issues from {}", issues.len(), self.source_name());
                self.status_message = Some(format!("Loaded {} issues", issues.len()));
                self.all_issues = issues;
                self.apply_filter();
            }
            Err(err) => {
                tracing::warn!("Failed to load issues: {err}");
                self.status_message = Some(format!("Failed to load issues: {err}"));
            }
        }
    }

    pub fn set_filter(&mut self, filter: IssueFilter) {
        self.filter = filter;
        self.apply_filter();
        self.status_message = Some(format!(
            "Filter: {} ({} issues)",
            filter.label(),
            self.board.total_count()
        ));
    }

    fn apply_filter(&mut self) {
        let snapshot = match self.filter {
            IssueFilter::All => IssueSnapshot::with_board_state(self.all_issues.clone()),
            IssueFilter::Open => IssueSnapshot::new(
                self.all_issues
                    .iter()
                    .filter(|i| !i.status.is_closed_like())
                    .cloned()
                    .collect(),
            ),
            IssueFilter::Closed => IssueSnapshot::new(
                self.all_issues
                    .iter()
                    .filter(|i| i.status.is_closed_like())
                    .cloned()
                    .collect(),
            ),
            IssueFilter::Ready => {
                // Blockers resolve against the whole set, not the filtered one
                let everything = IssueSnapshot::new(self.all_issues.clone());
                IssueSnapshot::new(
                    self.all_issues
                        .iter()
                        .filter(|i| is_ready(i, Some(&everything)))
                        .cloned()
                        .collect(),
                )
            }
        };
        self.board
            .set_snapshot_preserving_selection(Arc::new(snapshot));
    }

    fn board_height(&self) -> u16 {
        self.board.size().map_or(24, |(_, h)| h)
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Clear any status messages on key press
        self.status_message = None;

        if self.board.is_search_mode() {
            self.handle_search_key(key);
            return Ok(());
        }

        if std::mem::take(&mut self.waiting_for_g) && key.code == KeyCode::Char('g') {
            self.board.move_to_top();
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_control_key(key);
            return Ok(());
        }

        let detail_focused = self.board.detail_focused();
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('g') => self.waiting_for_g = true,
            KeyCode::Char('j') | KeyCode::Down if detail_focused => {
                self.board.detail_scroll_down(1)
            }
            KeyCode::Char('k') | KeyCode::Up if detail_focused => self.board.detail_scroll_up(1),
            KeyCode::Char('j') | KeyCode::Down => self.board.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.board.move_up(),
            KeyCode::Char('h') | KeyCode::Left => self.board.move_left(),
            KeyCode::Char('l') | KeyCode::Right => self.board.move_right(),
            KeyCode::Char('0') | KeyCode::Home => self.board.move_to_top(),
            KeyCode::Char('G') | KeyCode::Char('$') | KeyCode::End => {
                self.board.move_to_bottom()
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.board.jump_to_column(usize::from(c as u8 - b'1'));
            }
            KeyCode::Char('H') => self.board.jump_to_first_column(),
            KeyCode::Char('L') => self.board.jump_to_last_column(),
            KeyCode::Char('/') => self.board.start_search(),
            KeyCode::Char('n') => self.board.next_match(),
            KeyCode::Char('N') => self.board.prev_match(),
            KeyCode::Char('y') => self.copy_selected_id(),
            KeyCode::Char('o') => self.set_filter(IssueFilter::Open),
            KeyCode::Char('c') => self.set_filter(IssueFilter::Closed),
            KeyCode::Char('r') => self.set_filter(IssueFilter::Ready),
            KeyCode::Char('a') => self.set_filter(IssueFilter::All),
            KeyCode::Char('R') => self.reload().await,
            KeyCode::Char('s') => {
                self.board.cycle_swimlane_mode();
                self.status_message = Some(format!("Grouped by {}", self.board.mode_name()));
            }
            KeyCode::Char('e') => {
                self.board.toggle_empty_columns();
                self.status_message = Some(format!(
                    "Empty columns: {}",
                    self.board.visibility_mode_name()
                ));
            }
            KeyCode::Char('d') | KeyCode::Enter => self.board.toggle_expand(),
            KeyCode::Tab => self.board.toggle_detail(),
            KeyCode::BackTab => self.board.toggle_focus(),
            KeyCode::Char('[') => self.board.grow_detail(),
            KeyCode::Char(']') => self.board.shrink_detail(),
            KeyCode::Esc => {
                self.board.collapse_expanded();
                self.board.focus_board();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_control_key(&mut self, key: KeyEvent) {
        // a page is a third of the board; the cursor moves half a page
        let page = usize::from(self.board_height()) / 3;
        match key.code {
            KeyCode::Char('c') => self.quit = true,
            KeyCode::Char('d') => self.board.page_down(page),
            KeyCode::Char('u') => self.board.page_up(page),
            KeyCode::Char('j') => self.board.detail_scroll_down(DETAIL_SCROLL_STEP),
            KeyCode::Char('k') => self.board.detail_scroll_up(DETAIL_SCROLL_STEP),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.board.cancel_search(),
            KeyCode::Enter => self.board.finish_search(),
            KeyCode::Backspace => self.board.backspace_search(),
            KeyCode::Down => self.board.next_match(),
            KeyCode::Up => self.board.prev_match(),
            KeyCode::Char('n') if ctrl => self.board.next_match(),
            KeyCode::Char('p') if ctrl => self.board.prev_match(),
            KeyCode::Char('c') if ctrl => self.quit = true,
            KeyCode::Char(c) if !ctrl => self.board.append_search_char(c),
            _ => {}
        }
    }

    fn copy_selected_id(&mut self) {
        let Some(id) = self.board.selected_issue().map(|issue| issue.id.clone()) else {
            return;
        };
        self.status_message = Some(match copy_to_clipboard(&id) {
            Ok(()) => format!("Copied {id}"),
            Err(err) => {
                tracing::warn!("Clipboard copy failed: {err}");
                format!("Clipboard unavailable: {err}")
            }
        });
    }
}

/// Copy text to clipboard
fn copy_to_clipboard(text: &str) -> Result<()> {
    use arboard::Clipboard;
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}
