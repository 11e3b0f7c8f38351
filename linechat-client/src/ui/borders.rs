//! Frame glyphs and colors

use ratatui::style::{Color, Style};
use ratatui::symbols::border;

use crate::chat::{Classification, Message};

/// Double-line box around the message log
pub const FRAME_SET: border::Set = border::DOUBLE;

/// Style of the frame around the log
pub fn frame_style() -> Style {
    Style::default().fg(Color::Blue).bg(Color::Black)
}

/// Style of the compose rows
pub fn input_style() -> Style {
    Style::default().fg(Color::White).bg(Color::Black)
}

/// Style of the blank run after a log line
pub fn padding_style() -> Style {
    Style::default().fg(Color::Cyan).bg(Color::Black)
}

/// Style of a log line, by classification
///
/// Lines starting with `>` are drawn like greetings regardless of shape.
pub fn message_style(message: &Message) -> Style {
    let fg = if message.classification() == Classification::Greeting
        || message.content().starts_with('>')
    {
        Color::Green
    } else if message.classification() == Classification::User {
        Color::White
    } else {
        Color::Cyan
    };

    Style::default().fg(fg).bg(Color::Black)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_set_is_double_line() {
        assert_eq!(FRAME_SET.top_left, "╔");
        assert_eq!(FRAME_SET.top_right, "╗");
        assert_eq!(FRAME_SET.bottom_left, "╚");
        assert_eq!(FRAME_SET.bottom_right, "╝");
        assert_eq!(FRAME_SET.horizontal_top, "═");
        assert_eq!(FRAME_SET.vertical_left, "║");
    }

    #[test]
    fn test_message_colors() {
        assert_eq!(message_style(&Message::new("alice: > hi")).fg, Some(Color::Green));
        assert_eq!(message_style(&Message::new("hello")).fg, Some(Color::White));
        assert_eq!(message_style(&Message::new("alice: hello")).fg, Some(Color::Cyan));
    }

    #[test]
    fn test_leading_angle_is_green() {
        // No colon, so User by shape, but still drawn as a greeting
        assert_eq!(message_style(&Message::new("> quoted")).fg, Some(Color::Green));
    }

    #[test]
    fn test_black_background() {
        assert_eq!(frame_style().bg, Some(Color::Black));
        assert_eq!(input_style().bg, Some(Color::Black));
        assert_eq!(message_style(&Message::placeholder()).bg, Some(Color::Black));
    }
}
