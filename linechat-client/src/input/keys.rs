//! Key translation for the compose line
//!
//! Maps crossterm key events to the handful of editing commands the
//! client understands.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// An editing command decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Leave the client (Ctrl+Q)
    Quit,
    /// Send the composed text (Enter)
    Submit,
    /// Delete the character before the cursor (Backspace)
    Erase,
    /// Insert a character
    Char(char),
}

/// Translate a key event to an editing command
///
/// Returns `None` for releases, repeats, and keys with no meaning here
/// (arrows, function keys, control chords other than Ctrl+Q).
pub fn translate_key(key: &KeyEvent) -> Option<KeyInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let modifiers = key.modifiers;

    match key.code {
        KeyCode::Char(c) => translate_char(c, modifiers),
        KeyCode::Enter => Some(KeyInput::Submit),
        KeyCode::Backspace => Some(KeyInput::Erase),
        _ => None,
    }
}

fn translate_char(c: char, modifiers: KeyModifiers) -> Option<KeyInput> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match c.to_ascii_lowercase() {
            'q' => Some(KeyInput::Quit),
            _ => None,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) || c.is_control() {
        return None;
    }

    Some(KeyInput::Char(c))
}
