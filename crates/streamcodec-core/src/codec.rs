use std::{
    any::type_name,
    fmt,
    io::{self, Read, Write},
    marker::PhantomData,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    CodecError, Operation,
    format::{Cbor, Fault, Format},
    io::Tracked,
};

/// Stateless encoder/decoder for one value of type `T` on a byte stream.
///
/// The unframed wire format is exactly what `F` writes for the value; nothing
/// is added around it. Streams are borrowed, never closed.
pub struct Codec<T, F = Cbor> {
    _marker: PhantomData<fn() -> (T, F)>,
}

impl<T, F> Codec<T, F> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T, F> Clone for Codec<T, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, F> Copy for Codec<T, F> {}

impl<T, F> Default for Codec<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F: Format> fmt::Debug for Codec<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("value", &type_name::<T>())
            .field("format", &F::NAME)
            .finish()
    }
}

impl<T: Serialize, F: Format> Codec<T, F> {
    /// Writes the serialized bytes of `value` to `output` and flushes it.
    ///
    /// On failure some bytes may already be on the stream.
    pub fn encode<W: Write + ?Sized>(&self, value: &T, output: &mut W) -> Result<(), CodecError> {
        let mut sink = Tracked::new(&mut *output);
        let result = F::write_value(&mut sink, value);
        let (written, fault) = sink.finish();
        if let Err(err) = result {
            return Err(failure::<T, F>(Operation::Encode, &err, fault));
        }

        output.flush().map_err(CodecError::io(Operation::Encode))?;
        tracing::trace!(format = F::NAME, bytes = written, "encoded value");
        Ok(())
    }

    /// Serializes `value` into a fresh buffer.
    pub fn to_vec(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        self.encode(value, &mut buf)?;
        Ok(buf)
    }
}

impl<T: DeserializeOwned, F: Format> Codec<T, F> {
    /// Reads one value from `input`, consuming only the bytes that encode it.
    pub fn decode<R: Read + ?Sized>(&self, input: &mut R) -> Result<T, CodecError> {
        let mut source = Tracked::new(&mut *input);
        let result = F::read_value(&mut source);
        let (read, fault) = source.finish();

        match result {
            Ok(value) => {
                tracing::trace!(format = F::NAME, bytes = read, "decoded value");
                Ok(value)
            }
            Err(err) => Err(failure::<T, F>(Operation::Decode, &err, fault)),
        }
    }

    /// Decodes a buffer that must hold exactly one value.
    pub fn from_slice(&self, bytes: &[u8]) -> Result<T, CodecError> {
        let mut rest = bytes;
        let value = self.decode(&mut rest)?;
        if !rest.is_empty() {
            return Err(CodecError::TrailingBytes {
                remaining: rest.len(),
            });
        }
        Ok(value)
    }
}

fn failure<T, F: Format>(op: Operation, err: &F::Error, fault: Option<io::Error>) -> CodecError {
    if let Some(source) = fault {
        return CodecError::Io { op, source };
    }

    match (F::classify(err), op) {
        (Fault::Data, Operation::Decode) => CodecError::TypeMismatch {
            expected: type_name::<T>(),
            message: err.to_string(),
        },
        (Fault::Io, _) => CodecError::Io {
            op,
            source: io::Error::other(err.to_string()),
        },
        _ => CodecError::Serialization {
            op,
            message: err.to_string(),
        },
    }
}
