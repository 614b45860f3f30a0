//! Generic object codec: one serde value to a byte stream and back.
//!
//! [`Codec`] writes exactly the bytes its [`Format`] produces for a value and
//! reads back exactly those bytes, leaving anything after them on the stream.
//! [`FramedCodec`] adds a length prefix per value for multi-value streams.

mod error;
mod io;

pub mod codec;
pub mod format;
pub mod framing;

pub use codec::Codec;
pub use error::{CodecError, Operation};
pub use format::{Cbor, Fault, Format, Json};
pub use framing::{
    DEFAULT_MAX_FRAME_SIZE, FrameConfig, FrameReader, FramedCodec, read_frame,
    read_frame_optional, write_frame,
};
