//! Main application struct
//!
//! The App owns the shared chat state and wires the terminal, render task,
//! network session and keyboard dispatch together.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use linechat_utils::{LinechatError, Result};

use crate::chat::{SharedInput, SharedLog};
use crate::config::ClientConfig;
use crate::connection::Session;
use crate::input::{Dispatcher, KeyOutcome};

use super::event::{AppEvent, EventHandler};
use super::render::{RenderState, Renderer};
use super::terminal::Terminal;

/// Main application
pub struct App {
    /// Server address to dial
    address: String,
    /// Redraw period
    render_interval: Duration,
    /// Messages shown in the frame
    log: SharedLog,
    /// Text being composed
    input: SharedInput,
    /// Terminal input events
    events: EventHandler,
}

impl App {
    pub fn new(address: impl Into<String>, render_interval: Duration) -> Self {
        Self {
            address: address.into(),
            render_interval,
            log: SharedLog::new(),
            input: SharedInput::new(),
            events: EventHandler::new(),
        }
    }

    /// Build from config, with `requested` overriding the configured address
    pub fn from_config(config: &ClientConfig, requested: Option<&str>) -> Self {
        Self::new(config.resolve_address(requested), config.render_interval())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Run until the user quits or a fatal error occurs
    ///
    /// The terminal is restored before this returns, on every path.
    pub async fn run(&mut self) -> Result<()> {
        let terminal = Terminal::new()?;
        let (fatal_tx, mut fatal_rx) = mpsc::channel(1);

        let renderer = Renderer::spawn(
            terminal,
            RenderState {
                log: self.log.clone(),
                input: self.input.clone(),
            },
            self.render_interval,
            fatal_tx.clone(),
        );
        self.events.start_input_stream();

        let result = self.run_session(fatal_tx, &mut fatal_rx).await;

        let restored = renderer.stop().await;
        if let Err(e) = &restored {
            tracing::error!("Failed to stop renderer: {}", e);
        }
        result.and(restored)
    }

    async fn run_session(
        &mut self,
        fatal_tx: mpsc::Sender<LinechatError>,
        fatal_rx: &mut mpsc::Receiver<LinechatError>,
    ) -> Result<()> {
        let address = self.address.clone();
        let connect = Session::connect(&address, self.log.clone(), fatal_tx);
        let Some(session) = self.await_connection(connect, fatal_rx).await? else {
            return Ok(());
        };

        let dispatcher = Dispatcher::new(self.input.clone(), session.sender());
        let result = self.dispatch_loop(&dispatcher, fatal_rx).await;

        session.shutdown();
        result
    }

    /// Wait for `connect` while still serving the keyboard
    ///
    /// Returns `None` if the user quit first. Typing edits the compose line;
    /// Enter is ignored until there is a connection to send on.
    async fn await_connection<F>(
        &mut self,
        connect: F,
        fatal_rx: &mut mpsc::Receiver<LinechatError>,
    ) -> Result<Option<Session>>
    where
        F: Future<Output = Result<Session>>,
    {
        tokio::pin!(connect);

        loop {
            tokio::select! {
                connected = &mut connect => return connected.map(Some),

                Some(e) = fatal_rx.recv() => return Err(e),

                event = self.events.next() => match event {
                    Some(AppEvent::Input(event)) => {
                        let outcome = self
                            .input
                            .update(|buffer| Dispatcher::apply_offline(&event, buffer));
                        if outcome == KeyOutcome::Quit {
                            tracing::info!("Quit requested while connecting");
                            return Ok(None);
                        }
                    }
                    Some(AppEvent::Resize { .. }) => {}
                    Some(AppEvent::Failed(e)) => return Err(e),
                    None => return Ok(None),
                },
            }
        }
    }

    async fn dispatch_loop(
        &mut self,
        dispatcher: &Dispatcher,
        fatal_rx: &mut mpsc::Receiver<LinechatError>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                Some(e) = fatal_rx.recv() => return Err(e),

                event = self.events.next() => match event {
                    Some(AppEvent::Input(event)) => {
                        if dispatcher.dispatch(&event).await == KeyOutcome::Quit {
                            tracing::info!("Quit requested");
                            return Ok(());
                        }
                    }
                    Some(AppEvent::Resize { cols, rows }) => {
                        // Next tick repaints at the new size
                        tracing::debug!(cols, rows, "Terminal resized");
                    }
                    Some(AppEvent::Failed(e)) => return Err(e),
                    None => return Ok(()),
                },
            }
        }
    }
}
