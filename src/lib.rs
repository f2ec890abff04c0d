//! Swimlane TUI - adaptive Kanban board for issue trackers
//!
//! The [`state::BoardModel`] groups an issue set into four swimlane columns
//! by status, priority or type, and tracks selection, search, card expansion
//! and the detail panel. [`ui`] renders it with ratatui; [`app::App`] maps
//! keys onto it for the binary.

pub mod app;
pub mod config;
pub mod source;
pub mod state;
pub mod ui;
