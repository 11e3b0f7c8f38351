//! Inbound frame decoding
//!
//! The server protocol has no message boundaries. Each read of up to
//! [`FRAME_SIZE`] bytes is treated as one message, with any trailing zero
//! fill removed.

/// Size of a single socket read
pub const FRAME_SIZE: usize = 512;

/// Drop trailing zero bytes from a frame
pub fn strip_zero_fill(frame: &[u8]) -> &[u8] {
    let end = frame
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    &frame[..end]
}

/// Turn a raw frame into log text
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn decode_frame(frame: &[u8]) -> String {
    String::from_utf8_lossy(strip_zero_fill(frame)).into_owned()
}
