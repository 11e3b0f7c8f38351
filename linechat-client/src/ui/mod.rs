//! UI components for the linechat client
//!
//! Ratatui frame around the message log, the compose rows below it, and the
//! tasks that keep them on screen.

mod app;
mod borders;
mod event;
mod render;
mod terminal;

pub use app::App;
