//! Keyboard dispatch for the compose line
//!
//! Key presses edit the shared input buffer; Enter hands the composed text
//! to the send path and Ctrl+Q ends the session.

mod keys;

pub use keys::{translate_key, KeyInput};

use crossterm::event::{Event, KeyEvent};
use linechat_utils::LinechatError;

use crate::chat::{InputBuffer, SharedInput};
use crate::connection::MessageSender;

/// Result of processing an input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Leave the client
    Quit,
    /// Composed text was taken from the buffer for sending
    Submit(String),
    /// The buffer changed
    Edited,
    /// Nothing happened
    Ignored,
}

/// Routes terminal events into the input buffer and the outgoing channel
#[derive(Debug, Clone)]
pub struct Dispatcher {
    input: SharedInput,
    outgoing: MessageSender,
}

impl Dispatcher {
    pub fn new(input: SharedInput, outgoing: MessageSender) -> Self {
        Self { input, outgoing }
    }

    /// Apply a key event to a buffer
    ///
    /// A full buffer drops the character and reports `Ignored`.
    pub fn handle_key(key: &KeyEvent, buffer: &mut InputBuffer) -> KeyOutcome {
        match translate_key(key) {
            Some(KeyInput::Quit) => KeyOutcome::Quit,
            Some(KeyInput::Submit) => KeyOutcome::Submit(buffer.take_and_clear()),
            Some(KeyInput::Erase) => {
                buffer.erase_backward();
                KeyOutcome::Edited
            }
            Some(KeyInput::Char(c)) => insert_or_warn(buffer, c),
            None => KeyOutcome::Ignored,
        }
    }

    /// Apply a key or paste event to a buffer
    pub fn apply(event: &Event, buffer: &mut InputBuffer) -> KeyOutcome {
        match event {
            Event::Key(key) => Self::handle_key(key, buffer),
            Event::Paste(text) => paste(buffer, text),
            _ => KeyOutcome::Ignored,
        }
    }

    /// Apply an event while there is no send path yet
    ///
    /// Enter leaves the composed text in place.
    pub fn apply_offline(event: &Event, buffer: &mut InputBuffer) -> KeyOutcome {
        match event {
            Event::Key(key) if matches!(translate_key(key), Some(KeyInput::Submit)) => {
                KeyOutcome::Ignored
            }
            _ => Self::apply(event, buffer),
        }
    }

    /// Process a terminal event, sending on submit
    ///
    /// Waits while a previous message is still queued. Submits after the
    /// send path has stopped are dropped.
    pub async fn dispatch(&self, event: &Event) -> KeyOutcome {
        let outcome = self.input.update(|buffer| Self::apply(event, buffer));

        if let KeyOutcome::Submit(text) = &outcome {
            match self.outgoing.send(text.clone()).await {
                Ok(()) => {}
                Err(LinechatError::ConnectionClosed) => {
                    tracing::debug!("Dropping submit, send path closed");
                }
                Err(e) => tracing::warn!("Failed to queue message: {}", e),
            }
        }

        outcome
    }
}

fn insert_or_warn(buffer: &mut InputBuffer, c: char) -> KeyOutcome {
    match buffer.insert(c) {
        Ok(()) => KeyOutcome::Edited,
        Err(e) => {
            tracing::warn!("{}", e);
            KeyOutcome::Ignored
        }
    }
}

fn paste(buffer: &mut InputBuffer, text: &str) -> KeyOutcome {
    let mut outcome = KeyOutcome::Ignored;
    for c in text.chars().filter(|c| !c.is_control()) {
        if insert_or_warn(buffer, c) == KeyOutcome::Ignored {
            break;
        }
        outcome = KeyOutcome::Edited;
    }
    outcome
}
