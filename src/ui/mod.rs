//! UI module for rendering the TUI

pub mod board;
pub mod card;
pub mod detail_panel;
mod layout;
pub mod markdown;
pub mod text;
pub mod theme;

use crate::app::App;
use chrono::Utc;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let board_area = layout::create_layout(frame.area());
    app.board.render(board_area, frame.buffer_mut(), Utc::now());

    // Draw status bar
    layout::draw_status_bar(frame, app);
}
