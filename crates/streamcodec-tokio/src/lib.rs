//! Async framed transport for `streamcodec` values over tokio streams.

mod error;

pub mod channel;
pub mod framing;

pub use channel::Channel;
pub use error::ChannelError;
pub use framing::{read_frame, read_frame_optional, write_frame};
