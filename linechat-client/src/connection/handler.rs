//! Outgoing message handle

use linechat_utils::{LinechatError, Result};
use tokio::sync::mpsc;

/// Capacity of the outgoing-message channel
///
/// One slot: a submit waits until the previous one has been written.
pub const OUTGOING_CAPACITY: usize = 1;

/// Clonable handle on the outgoing-message channel
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::Sender<String>,
}

impl MessageSender {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }

    /// Create a sender together with the receiving end of a fresh channel
    pub fn channel() -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(OUTGOING_CAPACITY);
        (Self::new(tx), rx)
    }

    /// Queue a message, waiting while the previous one is still in flight
    pub async fn send(&self, msg: String) -> Result<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| LinechatError::ConnectionClosed)?;
        Ok(())
    }

    /// Whether the send path has stopped receiving
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
