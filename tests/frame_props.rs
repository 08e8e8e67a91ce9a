//! Property-based tests for record framing.
//!
//! Random records are encoded and framed, then read back to check that the
//! length prefix always matches the payload and that payloads survive intact.

use std::io::Cursor;

use femtoship::{
    Level, LogRecord, SerializationFormat,
    viewer_handler::{
        frame::{LENGTH_PREFIX_LEN, frame_payload, read_frame},
        serialise::encode_record_frame,
    },
};
use proptest::prelude::*;

fn level() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::Trace),
        Just(Level::Debug),
        Just(Level::Info),
        Just(Level::Warning),
        Just(Level::Error),
        Just(Level::Critical),
    ]
}

proptest! {
    #[test]
    fn prefix_matches_payload_length(payload in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let frame = frame_payload(&payload, usize::MAX).expect("frame payload");
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        prefix.copy_from_slice(&frame[..LENGTH_PREFIX_LEN]);
        prop_assert_eq!(u32::from_be_bytes(prefix) as usize, payload.len());
        prop_assert_eq!(&frame[LENGTH_PREFIX_LEN..], payload.as_slice());
    }

    #[test]
    fn concatenated_frames_split_back_apart(
        payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..256), 1..8)
    ) {
        let stream: Vec<u8> = payloads
            .iter()
            .flat_map(|payload| frame_payload(payload, usize::MAX).expect("frame payload"))
            .collect();
        let mut reader = Cursor::new(stream);
        for payload in &payloads {
            let frame = read_frame(&mut reader, usize::MAX).expect("read frame");
            prop_assert_eq!(frame.as_ref(), Some(payload));
        }
        prop_assert!(read_frame(&mut reader, usize::MAX).expect("clean eof").is_none());
    }

    #[test]
    fn encoded_records_keep_their_fields(
        name in "[a-z][a-z0-9_.]{0,16}",
        message in "\\PC{0,64}",
        level in level(),
    ) {
        let record = LogRecord::new(&name, level, &message);
        let frame = encode_record_frame(&record, SerializationFormat::Json, 1 << 20)
            .expect("encode record");
        let payload = read_frame(&mut Cursor::new(frame), 1 << 20)
            .expect("read frame")
            .expect("one frame");
        let value: serde_json::Value = serde_json::from_slice(&payload).expect("json payload");
        prop_assert_eq!(value["name"].as_str(), Some(name.as_str()));
        prop_assert_eq!(value["message"].as_str(), Some(message.as_str()));
        prop_assert_eq!(value["levelname"].as_str(), Some(level.as_str()));
    }
}
