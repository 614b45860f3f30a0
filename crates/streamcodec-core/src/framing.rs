//! Length-prefixed framing for streams that carry more than one value.
//!
//! A frame is a big-endian `u32` payload length followed by the payload.

use std::{
    fmt,
    io::{self, ErrorKind, Read, Write},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Codec, CodecError, Operation,
    format::{Cbor, Format},
};

/// Default maximum payload size accepted by framing helpers.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 8 * 1024 * 1024;

/// Limits applied when writing and reading frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Largest payload, in bytes, a frame may carry.
    pub max_frame_size: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl FrameConfig {
    /// Overrides the default maximum payload size.
    pub fn with_max_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Validates an outgoing payload length against the limit.
    pub fn check_outgoing(&self, len: usize) -> Result<u32, CodecError> {
        let size: u32 = len.try_into().map_err(|_| CodecError::FrameTooLarge {
            op: Operation::Encode,
            size: u32::MAX,
            max: self.max_frame_size,
        })?;

        if size > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                op: Operation::Encode,
                size,
                max: self.max_frame_size,
            });
        }
        Ok(size)
    }

    /// Validates a length announced by an incoming frame header.
    pub fn check_incoming(&self, header: [u8; 4]) -> Result<usize, CodecError> {
        let size = u32::from_be_bytes(header);
        if size > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                op: Operation::Decode,
                size,
                max: self.max_frame_size,
            });
        }
        Ok(size as usize)
    }
}

/// Writes one length-prefixed frame and flushes the writer.
pub fn write_frame<W: Write + ?Sized>(
    writer: &mut W,
    payload: &[u8],
    config: &FrameConfig,
) -> Result<(), CodecError> {
    let size = config.check_outgoing(payload.len())?;

    let io = || CodecError::io(Operation::Encode);
    writer.write_all(&size.to_be_bytes()).map_err(io())?;
    writer.write_all(payload).map_err(io())?;
    writer.flush().map_err(io())?;
    tracing::trace!(size, "wrote frame");
    Ok(())
}

/// Reads one length-prefixed frame.
///
/// End of stream anywhere in the frame is an `UnexpectedEof` I/O error.
pub fn read_frame<R: Read + ?Sized>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Vec<u8>, CodecError> {
    read_frame_optional(reader, config)?.ok_or_else(|| CodecError::Io {
        op: Operation::Decode,
        source: io::Error::from(ErrorKind::UnexpectedEof),
    })
}

/// Reads one frame, or returns `None` when the stream ends cleanly before a
/// new header starts.
pub fn read_frame_optional<R: Read + ?Sized>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Option<Vec<u8>>, CodecError> {
    let io = || CodecError::io(Operation::Decode);
    let Some(header) = read_header(reader).map_err(io())? else {
        return Ok(None);
    };

    let size = config.check_incoming(header)?;
    let mut payload = vec![0_u8; size];
    reader.read_exact(&mut payload).map_err(io())?;
    tracing::trace!(size, "read frame");
    Ok(Some(payload))
}

fn read_header<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<[u8; 4]>> {
    let mut header = [0_u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(Some(header))
}

/// Codec that writes each value as its own frame, so any number of values
/// can share a stream.
pub struct FramedCodec<T, F = Cbor> {
    codec: Codec<T, F>,
    config: FrameConfig,
}

impl<T, F> FramedCodec<T, F> {
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            codec: Codec::new(),
            config,
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Iterates over the values framed on `reader`.
    pub fn reader<R: Read>(self, reader: R) -> FrameReader<R, T, F> {
        FrameReader {
            reader,
            codec: self,
            done: false,
        }
    }
}

impl<T, F> Clone for FramedCodec<T, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, F> Copy for FramedCodec<T, F> {}

impl<T, F> Default for FramedCodec<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F: Format> fmt::Debug for FramedCodec<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramedCodec")
            .field("codec", &self.codec)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Serialize, F: Format> FramedCodec<T, F> {
    /// Writes `value` as one frame.
    pub fn encode<W: Write + ?Sized>(&self, value: &T, writer: &mut W) -> Result<(), CodecError> {
        let payload = self.codec.to_vec(value)?;
        write_frame(writer, &payload, &self.config)
    }
}

impl<T: DeserializeOwned, F: Format> FramedCodec<T, F> {
    /// Reads one frame and decodes the single value it must hold.
    pub fn decode<R: Read + ?Sized>(&self, reader: &mut R) -> Result<T, CodecError> {
        let payload = read_frame(reader, &self.config)?;
        self.codec.from_slice(&payload)
    }

    /// Like [`FramedCodec::decode`], but `None` on a clean end of stream.
    pub fn decode_optional<R: Read + ?Sized>(
        &self,
        reader: &mut R,
    ) -> Result<Option<T>, CodecError> {
        match read_frame_optional(reader, &self.config)? {
            Some(payload) => self.codec.from_slice(&payload).map(Some),
            None => Ok(None),
        }
    }
}

/// Iterator over framed values. Stops after the first error.
pub struct FrameReader<R, T, F = Cbor> {
    reader: R,
    codec: FramedCodec<T, F>,
    done: bool,
}

impl<R, T, F> FrameReader<R, T, F> {
    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read, T: DeserializeOwned, F: Format> Iterator for FrameReader<R, T, F> {
    type Item = Result<T, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.codec.decode_optional(&mut self.reader) {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
