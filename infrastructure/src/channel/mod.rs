//! Push channel
//!
//! Reads newline-delimited JSON messages from a UI process and feeds
//! approval decisions into the gate. The channel never writes anything back.

pub mod error;
pub mod protocol;
pub mod server;

pub use error::ChannelError;
pub use protocol::{ChannelMessage, Incoming, classify};
pub use server::{ChannelStats, PushChannel, ResponseSink};
