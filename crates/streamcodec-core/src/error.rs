use std::{fmt, io};

use thiserror::Error;

/// Codec operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Value to bytes.
    Encode,
    /// Bytes to value.
    Decode,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialization and stream failures for codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not become bytes, or the bytes are not a valid value.
    #[error("failed to {op} value: {message}")]
    Serialization { op: Operation, message: String },
    /// Underlying stream I/O error.
    #[error("io error during {op}: {source}")]
    Io {
        op: Operation,
        #[source]
        source: io::Error,
    },
    /// Well-formed payload describing a value of another shape.
    #[error("decoded payload is not a valid {expected}: {message}")]
    TypeMismatch {
        expected: &'static str,
        message: String,
    },
    /// Bytes left over after a complete value in a bounded buffer.
    #[error("{remaining} trailing bytes after decoded value")]
    TrailingBytes { remaining: usize },
    /// Frame size exceeded maximum allowed payload.
    #[error("frame too large: {size} > {max}")]
    FrameTooLarge { op: Operation, size: u32, max: u32 },
}

impl CodecError {
    pub(crate) fn io(op: Operation) -> impl FnOnce(io::Error) -> CodecError {
        move |source| CodecError::Io { op, source }
    }

    /// Operation the error was raised by.
    pub fn operation(&self) -> Operation {
        match self {
            CodecError::Serialization { op, .. }
            | CodecError::Io { op, .. }
            | CodecError::FrameTooLarge { op, .. } => *op,
            CodecError::TypeMismatch { .. } | CodecError::TrailingBytes { .. } => {
                Operation::Decode
            }
        }
    }

    /// Returns true when the stream, not the payload, failed.
    pub fn is_io(&self) -> bool {
        matches!(self, CodecError::Io { .. })
    }
}
