use streamcodec_core::CodecError;
use thiserror::Error;

/// Failures of a framed async channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Framing, serialization or stream failure.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Operation exceeded configured timeout.
    #[error("channel operation timed out")]
    Timeout,
}
