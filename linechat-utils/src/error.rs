//! Error types for linechat
//!
//! Provides a unified error type used across all linechat crates.

use std::path::PathBuf;

/// Main error type for linechat operations
#[derive(Debug, thiserror::Error)]
pub enum LinechatError {
    // === IO Errors ===

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Connection Errors ===

    #[error("Failed to connect to {addr}: {source}")]
    Connection {
        addr: String,
        source: std::io::Error,
    },

    #[error("Read from server failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("Write to server failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("Server closed the connection")]
    StreamClosed,

    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    // === Terminal Errors ===

    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    // === Input Errors ===

    #[error("Input buffer full ({capacity} bytes)")]
    BufferFull { capacity: usize },

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinechatError {
    /// Create a connection error for a dial that failed
    pub fn connection(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connection {
            addr: addr.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error must terminate the process
    ///
    /// A closed stream, a stopped send path and a full input buffer are
    /// reported to the user but keep the UI alive.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::StreamClosed | Self::ConnectionClosed | Self::BufferFull { .. }
        )
    }
}

/// Result type alias using LinechatError
pub type Result<T> = std::result::Result<T, LinechatError>;
