//! Serialization capabilities the codec delegates to.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Coarse classification of a format error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The reader or writer failed.
    Io,
    /// The bytes are not valid for the format.
    Syntax,
    /// The bytes are valid but describe a different shape, or a value
    /// refused to serialize.
    Data,
    /// Input ended in the middle of a value.
    Eof,
}

/// Converts serde values to and from a byte stream.
///
/// `read_value` must stop at the end of the value it decodes and must not
/// check for end of input, so that later bytes on the stream stay unread.
pub trait Format {
    /// Short name used in diagnostics.
    const NAME: &'static str;

    /// Native error type of the underlying format crate.
    type Error: std::error::Error + Send + Sync + 'static;

    fn write_value<W: Write, T: Serialize>(writer: W, value: &T) -> Result<(), Self::Error>;

    fn read_value<R: Read, T: DeserializeOwned>(reader: R) -> Result<T, Self::Error>;

    fn classify(err: &Self::Error) -> Fault;
}

/// CBOR via `serde_cbor`. Self-delimiting for every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cbor;

impl Format for Cbor {
    const NAME: &'static str = "cbor";

    type Error = serde_cbor::Error;

    fn write_value<W: Write, T: Serialize>(writer: W, value: &T) -> Result<(), Self::Error> {
        serde_cbor::to_writer(writer, value)
    }

    fn read_value<R: Read, T: DeserializeOwned>(reader: R) -> Result<T, Self::Error> {
        let mut de = serde_cbor::Deserializer::from_reader(reader);
        <T as Deserialize>::deserialize(&mut de)
    }

    fn classify(err: &Self::Error) -> Fault {
        use serde_cbor::error::Category;

        match err.classify() {
            Category::Io => Fault::Io,
            Category::Syntax => Fault::Syntax,
            Category::Data => Fault::Data,
            Category::Eof => Fault::Eof,
        }
    }
}

/// JSON via `serde_json`.
///
/// Objects, arrays and strings end on a closing delimiter. A top-level number
/// is only terminated by the byte after it, which gets consumed, so streams
/// of bare numbers need framing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json;

impl Format for Json {
    const NAME: &'static str = "json";

    type Error = serde_json::Error;

    fn write_value<W: Write, T: Serialize>(writer: W, value: &T) -> Result<(), Self::Error> {
        serde_json::to_writer(writer, value)
    }

    fn read_value<R: Read, T: DeserializeOwned>(reader: R) -> Result<T, Self::Error> {
        let mut de = serde_json::Deserializer::from_reader(reader);
        <T as Deserialize>::deserialize(&mut de)
    }

    fn classify(err: &Self::Error) -> Fault {
        use serde_json::error::Category;

        match err.classify() {
            Category::Io => Fault::Io,
            Category::Syntax => Fault::Syntax,
            Category::Data => Fault::Data,
            Category::Eof => Fault::Eof,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cbor, Fault, Format, Json};

    #[test]
    fn cbor_reports_short_input_as_eof() {
        let bytes = serde_cbor::to_vec(&"truncated string").expect("encode should succeed");
        let mut short = &bytes[..bytes.len() / 2];

        let err = Cbor::read_value::<_, String>(&mut short).expect_err("short input must fail");
        assert_eq!(Cbor::classify(&err), Fault::Eof);
    }

    #[test]
    fn cbor_reports_wrong_shape_as_data() {
        let bytes = serde_cbor::to_vec(&"not a number").expect("encode should succeed");

        let err = Cbor::read_value::<_, u64>(bytes.as_slice()).expect_err("shape must not match");
        assert_eq!(Cbor::classify(&err), Fault::Data);
    }

    #[test]
    fn json_stops_at_closing_bracket() {
        let mut input = &b"[1,2]]"[..];

        let value = Json::read_value::<_, Vec<u8>>(&mut input).expect("array should decode");
        assert_eq!(value, vec![1, 2]);
        assert_eq!(input, b"]");
    }

    #[test]
    fn json_reports_garbage_as_syntax() {
        let err = Json::read_value::<_, Vec<u8>>(&b"[1, }"[..]).expect_err("garbage must fail");
        assert_eq!(Json::classify(&err), Fault::Syntax);
    }
}
