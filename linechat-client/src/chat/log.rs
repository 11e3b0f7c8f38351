//! Bounded message log
//!
//! Holds exactly [`LOG_CAPACITY`] entries, newest first. Unused slots are
//! placeholders, so the renderer can always walk a full log.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::message::{Message, LINE_WIDTH};

/// Number of entries the log retains
pub const LOG_CAPACITY: usize = 50;

/// Fixed-capacity message store, most recent entry at index 0
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<Message>,
}

impl MessageLog {
    /// Create a log filled with placeholders
    pub fn new() -> Self {
        Self {
            entries: std::iter::repeat_with(Message::placeholder)
                .take(LOG_CAPACITY)
                .collect(),
        }
    }

    /// Append a line of text, evicting the oldest entries as needed
    ///
    /// Text wider than [`LINE_WIDTH`] code points is split into consecutive
    /// entries. Chunks are pushed in reading order, so the last chunk ends up
    /// newest.
    pub fn append(&mut self, text: &str) {
        for chunk in wrap(text) {
            self.push_front(Message::new(chunk));
        }
    }

    fn push_front(&mut self, message: Message) {
        self.entries.pop_back();
        self.entries.push_front(message);
    }

    /// The most recently appended entry
    pub fn newest(&self) -> &Message {
        // Length never drops below capacity
        &self.entries[0]
    }

    /// Entry at `index`, 0 being newest
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.entries.get(index)
    }

    /// Entries from newest to oldest
    pub fn entries(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    /// Always [`LOG_CAPACITY`]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Split text into chunks of at most [`LINE_WIDTH`] code points
///
/// Empty text yields a single empty chunk so that an empty send still
/// occupies a slot.
fn wrap(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    loop {
        match rest.char_indices().nth(LINE_WIDTH) {
            Some((split, _)) => {
                let (head, tail) = rest.split_at(split);
                chunks.push(head);
                rest = tail;
            }
            None => {
                chunks.push(rest);
                return chunks;
            }
        }
    }
}

/// Cloneable handle to a log shared between tasks
///
/// The lock is only held for the duration of a single call and never
/// across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedLog {
    inner: Arc<Mutex<MessageLog>>,
}

impl SharedLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MessageLog> {
        // append only swaps whole entries, a poisoned log is still consistent
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a line of text
    pub fn append(&self, text: &str) {
        self.lock().append(text);
    }

    /// Clone of the newest entry
    pub fn newest(&self) -> Message {
        self.lock().newest().clone()
    }

    /// Clone of the whole log
    pub fn snapshot(&self) -> MessageLog {
        self.lock().clone()
    }

    /// Run `f` with read access to the log
    pub fn with<R>(&self, f: impl FnOnce(&MessageLog) -> R) -> R {
        f(&*self.lock())
    }
}
