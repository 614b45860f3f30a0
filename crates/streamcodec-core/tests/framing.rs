use std::io::{self, Cursor};

use serde::{Deserialize, Serialize};
use streamcodec_core::{
    CodecError, FrameConfig, FramedCodec, Json, Operation, read_frame, read_frame_optional,
    write_frame,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Event {
    seq: u64,
    kind: String,
}

fn event(seq: u64) -> Event {
    Event {
        seq,
        kind: format!("event-{seq}"),
    }
}

#[test]
fn frame_roundtrip() {
    let config = FrameConfig::default();
    let mut sink = Vec::new();

    write_frame(&mut sink, b"hello-frame", &config).expect("write should succeed");
    assert_eq!(&sink[..4], &11_u32.to_be_bytes());

    let payload = read_frame(&mut sink.as_slice(), &config).expect("read should succeed");
    assert_eq!(payload, b"hello-frame");
}

#[test]
fn reject_oversized_frame() {
    let config = FrameConfig::default().with_max_frame_size(8);
    let mut sink = Vec::new();

    let err = write_frame(&mut sink, &[0_u8; 9], &config).expect_err("oversized frame must fail");
    match err {
        CodecError::FrameTooLarge { op, size, max } => {
            assert_eq!(op, Operation::Encode);
            assert_eq!((size, max), (9, 8));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.is_empty(), "nothing is written for a rejected frame");
}

#[test]
fn reject_oversized_header() {
    let config = FrameConfig::default().with_max_frame_size(8);
    let mut input = Vec::from(1024_u32.to_be_bytes());
    input.extend_from_slice(&[0_u8; 16]);

    let err = read_frame(&mut input.as_slice(), &config).expect_err("oversized header must fail");
    match err {
        CodecError::FrameTooLarge { op, size, .. } => {
            assert_eq!(op, Operation::Decode);
            assert_eq!(size, 1024);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn detect_truncated_frame_payload() {
    let mut input = Vec::from(8_u32.to_be_bytes());
    input.extend_from_slice(b"abc");

    let err = read_frame(&mut input.as_slice(), &FrameConfig::default())
        .expect_err("truncated frame should fail");
    match err {
        CodecError::Io { op, source } => {
            assert_eq!(op, Operation::Decode);
            assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn clean_end_of_stream_is_not_an_error() {
    let mut empty: &[u8] = &[];
    let frame = read_frame_optional(&mut empty, &FrameConfig::default())
        .expect("clean eof should succeed");
    assert!(frame.is_none());

    let err = read_frame(&mut empty, &FrameConfig::default()).expect_err("frame is required");
    assert!(err.is_io());
}

#[test]
fn framed_values_share_one_stream() {
    let codec = FramedCodec::<Event>::new();
    let mut sink = Vec::new();
    for seq in 0..3 {
        codec.encode(&event(seq), &mut sink).expect("encode should succeed");
    }

    let mut source = Cursor::new(sink);
    for seq in 0..3 {
        assert_eq!(
            codec.decode(&mut source).expect("decode should succeed"),
            event(seq)
        );
    }
    assert_eq!(
        codec
            .decode_optional(&mut source)
            .expect("clean eof should succeed"),
        None
    );
}

#[test]
fn frame_reader_yields_every_value() {
    let codec = FramedCodec::<Event, Json>::new();
    let mut sink = Vec::new();
    for seq in 0..5 {
        codec.encode(&event(seq), &mut sink).expect("encode should succeed");
    }

    let decoded = codec
        .reader(sink.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .expect("all frames should decode");
    assert_eq!(decoded, (0..5).map(event).collect::<Vec<_>>());
}

#[test]
fn frame_reader_stops_after_error() {
    let codec = FramedCodec::<Event>::new();
    let mut sink = Vec::new();
    codec.encode(&event(1), &mut sink).expect("encode should succeed");
    sink.extend_from_slice(&100_u32.to_be_bytes());
    sink.extend_from_slice(b"short");

    let mut frames = codec.reader(sink.as_slice());
    assert_eq!(
        frames
            .next()
            .expect("first frame should exist")
            .expect("first frame should decode"),
        event(1)
    );
    assert!(matches!(frames.next(), Some(Err(CodecError::Io { .. }))));
    assert!(frames.next().is_none());
}

#[test]
fn frame_payload_must_hold_exactly_one_value() {
    let codec = FramedCodec::<u32>::new();
    let mut payload = serde_cbor::to_vec(&7_u32).expect("encode should succeed");
    payload.push(0);

    let mut sink = Vec::new();
    write_frame(&mut sink, &payload, codec.config()).expect("write should succeed");

    let err = codec
        .decode(&mut sink.as_slice())
        .expect_err("trailing byte must fail");
    assert!(matches!(err, CodecError::TrailingBytes { remaining: 1 }), "got {err}");
}
