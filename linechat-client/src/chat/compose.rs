//! Input buffer for the message being composed

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use linechat_utils::{LinechatError, Result};

/// Maximum size of a composed message in bytes
pub const INPUT_CAPACITY: usize = 1024;

/// Text-entry state with an end-of-text cursor
///
/// The cursor is a byte offset and always sits on a code point boundary.
/// Everything past it is blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self {
            text: String::with_capacity(INPUT_CAPACITY),
        }
    }

    /// Write a code point at the cursor and advance past it
    ///
    /// Fails with [`LinechatError::BufferFull`] if the encoded character
    /// would not fit; the buffer is left untouched.
    pub fn insert(&mut self, ch: char) -> Result<()> {
        if self.text.len() + ch.len_utf8() > INPUT_CAPACITY {
            return Err(LinechatError::BufferFull {
                capacity: INPUT_CAPACITY,
            });
        }
        self.text.push(ch);
        Ok(())
    }

    /// Remove the code point before the cursor, if any
    pub fn erase_backward(&mut self) {
        self.text.pop();
    }

    /// Return the composed text and reset the buffer
    pub fn take_and_clear(&mut self) -> String {
        std::mem::replace(&mut self.text, String::with_capacity(INPUT_CAPACITY))
    }

    /// Byte offset of the end of the composed text
    pub fn cursor(&self) -> usize {
        self.text.len()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.text.len() >= INPUT_CAPACITY
    }

    /// Slice the buffer into `rows` fixed-width rows of `width` bytes
    ///
    /// Rows are cut on byte offsets, not code point boundaries, so a
    /// multi-byte character straddling a row edge renders as replacement
    /// characters. Rows past the composed text are blank.
    pub fn display_rows(&self, width: usize, rows: usize) -> Vec<String> {
        let bytes = self.text.as_bytes();

        (0..rows)
            .map(|row| {
                let start = (row * width).min(bytes.len());
                let end = ((row + 1) * width).min(bytes.len());
                let mut line = String::from_utf8_lossy(&bytes[start..end]).into_owned();
                let filled = line.chars().count();
                line.extend(std::iter::repeat(' ').take(width.saturating_sub(filled)));
                line
            })
            .collect()
    }
}

/// Cloneable handle to the input buffer
///
/// Only the dispatcher writes through it; the renderer reads.
#[derive(Debug, Clone, Default)]
pub struct SharedInput {
    inner: Arc<Mutex<InputBuffer>>,
}

impl SharedInput {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InputBuffer::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, InputBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with write access to the buffer
    pub fn update<R>(&self, f: impl FnOnce(&mut InputBuffer) -> R) -> R {
        f(&mut *self.lock())
    }

    /// Run `f` with read access to the buffer
    pub fn with<R>(&self, f: impl FnOnce(&InputBuffer) -> R) -> R {
        f(&*self.lock())
    }
}
