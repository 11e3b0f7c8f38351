//! Terminal event forwarding
//!
//! Reads crossterm's event stream on a background task and hands the events
//! the client cares about to the app over an unbounded channel.

use crossterm::event::{Event as CrosstermEvent, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use linechat_utils::LinechatError;

/// Application events from the terminal
#[derive(Debug)]
pub enum AppEvent {
    /// Key press or paste, for the dispatcher
    Input(CrosstermEvent),
    /// Terminal resize
    Resize { cols: u16, rows: u16 },
    /// The event stream failed; the terminal is unusable
    Failed(LinechatError),
}

/// Event handler that forwards terminal input from a background task
pub struct EventHandler {
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    task: Option<JoinHandle<()>>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, task: None }
    }

    /// Sender for injecting events
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Start reading terminal events in a background task
    pub fn start_input_stream(&mut self) {
        if self.task.is_some() {
            return;
        }

        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let mut events = EventStream::new();

            while let Some(event) = events.next().await {
                let forwarded = match event {
                    Ok(event) => match classify_event(event) {
                        Some(app_event) => app_event,
                        None => continue,
                    },
                    Err(e) => {
                        tracing::error!("Error reading terminal event: {}", e);
                        let _ = tx.send(AppEvent::Failed(LinechatError::Terminal(e)));
                        break;
                    }
                };

                if tx.send(forwarded).is_err() {
                    break;
                }
            }

            tracing::debug!("Terminal event stream ended");
        }));
    }

    /// Receive next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Map a crossterm event to an app event, dropping ones we ignore
fn classify_event(event: CrosstermEvent) -> Option<AppEvent> {
    match event {
        CrosstermEvent::Key(_) | CrosstermEvent::Paste(_) => Some(AppEvent::Input(event)),
        CrosstermEvent::Resize(cols, rows) => Some(AppEvent::Resize { cols, rows }),
        CrosstermEvent::Mouse(_) | CrosstermEvent::FocusGained | CrosstermEvent::FocusLost => None,
    }
}
