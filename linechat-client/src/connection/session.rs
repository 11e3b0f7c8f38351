//! TCP session to the chat server
//!
//! One socket per process. The read half belongs to the reader task, the
//! write half to the send path; they coordinate over two single-slot
//! channels:
//!
//! - disconnect: set once by the reader on end-of-stream, stops the send path
//! - pulse: advisory "a message arrived", drained by the send path
//!
//! Fatal failures (read or write errors) are reported on the caller's fatal
//! channel so the UI can be torn down before the error is printed.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use linechat_utils::{LinechatError, Result};

use crate::chat::SharedLog;

use super::frame::{decode_frame, FRAME_SIZE};
use super::handler::MessageSender;

/// Log line appended when the server closes the connection
pub const DISCONNECTED_NOTICE: &str = "Disconnected from server.";

/// A live connection and the two tasks driving it
///
/// Dropping the session aborts both tasks.
#[derive(Debug)]
pub struct Session {
    addr: String,
    sender: MessageSender,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Session {
    /// Dial the server and start the reader and send tasks
    ///
    /// There is no timeout: an unresponsive address blocks until the OS
    /// gives up.
    pub async fn connect(
        addr: &str,
        log: SharedLog,
        fatal: mpsc::Sender<LinechatError>,
    ) -> Result<Self> {
        tracing::info!(%addr, "Connecting to server");

        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| LinechatError::connection(addr, e))?;

        if let Ok(peer) = stream.peer_addr() {
            tracing::info!(%peer, "Connected");
        }

        let (read_half, write_half) = stream.into_split();
        Ok(Self::start(addr, read_half, write_half, log, fatal))
    }

    fn start<R, W>(
        addr: &str,
        reader: R,
        writer: W,
        log: SharedLog,
        fatal: mpsc::Sender<LinechatError>,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, outgoing_rx) = MessageSender::channel();
        let (disconnect_tx, disconnect_rx) = mpsc::channel(1);
        let (pulse_tx, pulse_rx) = mpsc::channel(1);

        let reader = tokio::spawn(read_task(
            reader,
            log.clone(),
            disconnect_tx,
            pulse_tx,
            fatal.clone(),
        ));
        let writer = tokio::spawn(send_task(
            writer,
            SendChannels {
                outgoing: outgoing_rx,
                disconnect: disconnect_rx,
                pulse: pulse_rx,
            },
            log,
            fatal,
        ));

        Self {
            addr: addr.to_string(),
            sender,
            reader,
            writer,
        }
    }

    /// Handle for queueing outgoing messages
    pub fn sender(&self) -> MessageSender {
        self.sender.clone()
    }

    /// Whether the send path has stopped, e.g. after a disconnect
    pub fn is_send_path_closed(&self) -> bool {
        self.writer.is_finished()
    }

    /// Stop both tasks and release the socket
    pub fn shutdown(self) {
        tracing::info!(addr = %self.addr, "Closing session");
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Read frames into the log until the stream ends or fails
async fn read_task<R>(
    mut reader: R,
    log: SharedLog,
    disconnect: mpsc::Sender<()>,
    pulse: mpsc::Sender<()>,
    fatal: mpsc::Sender<LinechatError>,
) where
    R: AsyncRead + Unpin,
{
    match read_frames(&mut reader, &log, &pulse).await {
        LinechatError::StreamClosed => {
            tracing::info!("Server closed connection");
            log.append(DISCONNECTED_NOTICE);
            let _ = disconnect.try_send(());
        }
        err => {
            tracing::error!("Failed to receive message: {}", err);
            let _ = fatal.try_send(err);
        }
    }
}

/// Returns the reason reading stopped
async fn read_frames<R>(reader: &mut R, log: &SharedLog, pulse: &mpsc::Sender<()>) -> LinechatError
where
    R: AsyncRead + Unpin,
{
    let mut frame = [0u8; FRAME_SIZE];

    loop {
        match reader.read(&mut frame).await {
            Ok(0) => return LinechatError::StreamClosed,
            Ok(n) => {
                let text = decode_frame(&frame[..n]);
                tracing::debug!(bytes = n, "Received frame from server");
                log.append(&text);
                // Pulse is advisory; one pending is enough
                let _ = pulse.try_send(());
            }
            Err(e) => return LinechatError::Read(e),
        }
    }
}

struct SendChannels {
    outgoing: mpsc::Receiver<String>,
    disconnect: mpsc::Receiver<()>,
    pulse: mpsc::Receiver<()>,
}

/// Write queued messages until disconnected
async fn send_task<W>(
    mut writer: W,
    mut channels: SendChannels,
    log: SharedLog,
    fatal: mpsc::Sender<LinechatError>,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            biased;

            _ = channels.disconnect.recv() => {
                tracing::info!("Send path stopping after disconnect");
                break;
            }

            Some(()) = channels.pulse.recv() => {
                tracing::trace!("Message pulse");
            }

            msg = channels.outgoing.recv() => {
                let Some(msg) = msg else {
                    tracing::debug!("Outgoing channel closed");
                    break;
                };

                log.append(&msg);
                if let Err(e) = writer.write_all(msg.as_bytes()).await {
                    tracing::error!("Failed to send message: {}", e);
                    let _ = fatal.try_send(LinechatError::Write(e));
                    break;
                }
                tracing::debug!(bytes = msg.len(), "Sent message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Classification;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::ReadBuf;
    use tokio::net::TcpListener;

    async fn eventually(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not met within 2s");
    }

    async fn connected() -> (Session, TcpStream, SharedLog, mpsc::Receiver<LinechatError>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let log = SharedLog::new();
        let (fatal_tx, fatal_rx) = mpsc::channel(1);

        let (session, accepted) =
            tokio::join!(Session::connect(&addr, log.clone(), fatal_tx), listener.accept());
        let (server, _) = accepted.unwrap();

        (session.unwrap(), server, log, fatal_rx)
    }

    /// Reader that fails every read
    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")))
        }
    }

    /// Writer that fails every write
    struct BrokenWriter;

    impl AsyncWrite for BrokenWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let (fatal_tx, _fatal_rx) = mpsc::channel(1);
        let result = Session::connect(&addr, SharedLog::new(), fatal_tx).await;

        match result {
            Err(LinechatError::Connection { addr: failed, .. }) => assert_eq!(failed, addr),
            Err(other) => panic!("expected connection error, got {:?}", other),
            Ok(_) => panic!("expected connection error"),
        }
    }

    #[tokio::test]
    async fn test_padded_frame_becomes_one_message() {
        let (_session, mut server, log, _fatal) = connected().await;

        let mut frame = [0u8; FRAME_SIZE];
        frame[..13].copy_from_slice(b"server: hello");
        server.write_all(&frame).await.unwrap();

        eventually(|| log.newest().content() == "server: hello").await;
        assert_eq!(log.newest().classification(), Classification::Server);
    }

    #[tokio::test]
    async fn test_send_writes_verbatim_and_logs() {
        let (session, mut server, log, _fatal) = connected().await;

        session.sender().send("hi".into()).await.unwrap();

        let mut received = [0u8; 2];
        server.read_exact(&mut received).await.unwrap();
        assert_eq!(&received, b"hi");

        eventually(|| log.newest().content() == "hi").await;
        assert_eq!(log.newest().classification(), Classification::User);
    }

    #[tokio::test]
    async fn test_sends_have_no_delimiter() {
        let (session, mut server, _log, _fatal) = connected().await;
        let sender = session.sender();

        sender.send("ab".into()).await.unwrap();
        sender.send("cd".into()).await.unwrap();

        let mut received = [0u8; 4];
        server.read_exact(&mut received).await.unwrap();
        assert_eq!(&received, b"abcd");
    }

    #[tokio::test]
    async fn test_end_of_stream_logs_notice_and_stops_send_path() {
        let (session, server, log, mut fatal) = connected().await;

        drop(server);

        eventually(|| log.newest().content() == DISCONNECTED_NOTICE).await;
        eventually(|| session.is_send_path_closed()).await;

        // Submits after a disconnect are dropped, not fatal
        let result = session.sender().send("late".into()).await;
        assert!(matches!(result, Err(LinechatError::ConnectionClosed)));
        assert!(fatal.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_read_error_is_reported_as_fatal() {
        let log = SharedLog::new();
        let (fatal_tx, mut fatal_rx) = mpsc::channel(1);
        let (disconnect_tx, mut disconnect_rx) = mpsc::channel(1);
        let (pulse_tx, _pulse_rx) = mpsc::channel(1);

        read_task(BrokenReader, log.clone(), disconnect_tx, pulse_tx, fatal_tx).await;

        let err = fatal_rx.recv().await.unwrap();
        assert!(matches!(err, LinechatError::Read(_)));
        assert!(err.is_fatal());
        // No disconnect signal for a hard failure, only the dropped sender
        assert!(disconnect_rx.recv().await.is_none());
        assert!(log.newest().is_placeholder());
    }

    #[tokio::test]
    async fn test_write_error_is_reported_as_fatal() {
        let log = SharedLog::new();
        let (fatal_tx, mut fatal_rx) = mpsc::channel(1);
        let (sender, outgoing) = MessageSender::channel();
        let (_disconnect_tx, disconnect) = mpsc::channel(1);
        let (_pulse_tx, pulse) = mpsc::channel(1);

        let task = tokio::spawn(send_task(
            BrokenWriter,
            SendChannels {
                outgoing,
                disconnect,
                pulse,
            },
            log.clone(),
            fatal_tx,
        ));

        sender.send("doomed".into()).await.unwrap();

        let err = fatal_rx.recv().await.unwrap();
        assert!(matches!(err, LinechatError::Write(_)));
        task.await.unwrap();
        // The message is logged before the write is attempted
        assert_eq!(log.newest().content(), "doomed");
    }

    #[tokio::test]
    async fn test_pulse_is_drained_without_side_effects() {
        let log = SharedLog::new();
        let (fatal_tx, _fatal_rx) = mpsc::channel(1);
        let (_sender, outgoing) = MessageSender::channel();
        let (disconnect_tx, disconnect) = mpsc::channel(1);
        let (pulse_tx, pulse) = mpsc::channel(1);

        let task = tokio::spawn(send_task(
            tokio::io::sink(),
            SendChannels {
                outgoing,
                disconnect,
                pulse,
            },
            log.clone(),
            fatal_tx,
        ));

        pulse_tx.send(()).await.unwrap();
        pulse_tx.send(()).await.unwrap();
        disconnect_tx.send(()).await.unwrap();

        task.await.unwrap();
        assert!(log.newest().is_placeholder());
    }
}
