//! Chat model shared between the network, input and render tasks
//!
//! - [`MessageLog`]: the bounded, newest-first list of received and sent lines
//! - [`InputBuffer`]: the line being composed

mod compose;
mod log;
mod message;

// Re-exported for the render and input modules and their tests
#[allow(unused_imports)]
pub use compose::{InputBuffer, SharedInput, INPUT_CAPACITY};
#[allow(unused_imports)]
pub use log::{MessageLog, SharedLog, LOG_CAPACITY};
#[allow(unused_imports)]
pub use message::{classify, Classification, Message, LINE_WIDTH};
