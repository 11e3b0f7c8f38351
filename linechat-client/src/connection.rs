//! Client-server connection management
//!
//! Provides the TCP session to the chat server: a reader task turning
//! fixed-size frames into log entries and a send path draining the
//! outgoing-message channel.

mod frame;
mod handler;
mod session;

#[allow(unused_imports)]
pub use frame::{decode_frame, strip_zero_fill, FRAME_SIZE};
pub use handler::MessageSender;
pub use session::{Session, DISCONNECTED_NOTICE};
