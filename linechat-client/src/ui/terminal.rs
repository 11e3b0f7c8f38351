//! Terminal initialization and cleanup
//!
//! Bracketed paste is enabled so pasted text arrives as one event.
//!
//! The display moves through `Uninitialized -> Running -> ShuttingDown ->
//! Closed`. Restoration runs exactly once, either from [`Terminal::close`]
//! or on drop.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, Show},
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Frame;

use linechat_utils::{LinechatError, Result};

/// Lifecycle of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalState {
    /// Nothing has touched the terminal yet
    #[default]
    Uninitialized,
    /// Raw mode and alternate screen are active
    Running,
    /// Restoration in progress
    ShuttingDown,
    /// The terminal is back to its original mode
    Closed,
}

impl TerminalState {
    pub fn is_running(self) -> bool {
        self == TerminalState::Running
    }

    /// Begin teardown; returns whether restoration is needed
    fn begin_shutdown(&mut self) -> bool {
        match self {
            TerminalState::Running => {
                *self = TerminalState::ShuttingDown;
                true
            }
            TerminalState::Uninitialized => {
                *self = TerminalState::Closed;
                false
            }
            TerminalState::ShuttingDown | TerminalState::Closed => false,
        }
    }

    fn finish_shutdown(&mut self) {
        *self = TerminalState::Closed;
    }
}

/// Terminal wrapper that handles initialization and cleanup
pub struct Terminal {
    terminal: ratatui::Terminal<CrosstermBackend<Stdout>>,
    state: TerminalState,
}

impl Terminal {
    /// Enter raw mode and the alternate screen
    pub fn new() -> Result<Self> {
        enable_raw_mode().map_err(LinechatError::Terminal)?;

        match Self::enter() {
            Ok(terminal) => {
                tracing::debug!("Terminal initialized");
                Ok(Self {
                    terminal,
                    state: TerminalState::Running,
                })
            }
            Err(e) => {
                let _ = Self::restore();
                Err(LinechatError::Terminal(e))
            }
        }
    }

    fn enter() -> io::Result<ratatui::Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = io::stdout();
        enter_screen(&mut stdout)?;

        let backend = CrosstermBackend::new(stdout);
        ratatui::Terminal::new(backend)
    }

    /// Paint one frame; a no-op once teardown has begun
    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        if !self.state.is_running() {
            return Ok(());
        }
        self.terminal.draw(render).map_err(LinechatError::Terminal)?;
        Ok(())
    }

    /// Restore the terminal to its original mode
    pub fn close(&mut self) -> Result<()> {
        if !self.state.begin_shutdown() {
            return Ok(());
        }

        let result = Self::restore().map_err(LinechatError::Terminal);
        self.state.finish_shutdown();
        tracing::debug!("Terminal restored");
        result
    }

    fn restore() -> io::Result<()> {
        disable_raw_mode()?;
        leave_screen(&mut io::stdout())
    }
}

fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, EnterAlternateScreen, Hide, EnableBracketedPaste)
}

fn leave_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen, Show, DisableBracketedPaste)
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::error!("Failed to restore terminal: {}", e);
        }
    }
}
