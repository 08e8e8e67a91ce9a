//! Record encoding for the wire.
//!
//! A record becomes a flat string-keyed map: the seven built-in fields first,
//! then every metadata entry whose key is not reserved.

use std::io;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::log_record::{LogRecord, RESERVED_KEYS};

use super::{config::SerializationFormat, frame::frame_payload};

struct WireRecord<'a>(&'a LogRecord);

impl Serialize for WireRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.0;
        let extra: Vec<(&str, &str)> = record.extra_metadata().collect();
        let mut map = serializer.serialize_map(Some(RESERVED_KEYS.len() + extra.len()))?;
        map.serialize_entry("name", &record.name)?;
        map.serialize_entry("message", &record.message)?;
        map.serialize_entry("levelname", record.level.as_str())?;
        map.serialize_entry("created", &record.created_secs())?;
        map.serialize_entry("file", &record.location.file)?;
        map.serialize_entry("line", &record.location.line)?;
        map.serialize_entry("function", &record.location.function)?;
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Serialise a record into a payload using `format`.
pub fn serialise_record(record: &LogRecord, format: SerializationFormat) -> io::Result<Vec<u8>> {
    let wire = WireRecord(record);
    match format {
        SerializationFormat::MsgPack => {
            let mut buf = Vec::with_capacity(128);
            wire.serialize(&mut rmp_serde::Serializer::new(&mut buf))
                .map_err(io::Error::other)?;
            Ok(buf)
        }
        SerializationFormat::Json => serde_json::to_vec(&wire).map_err(io::Error::other),
    }
}

/// Serialise and frame a record in one step.
pub fn encode_record_frame(
    record: &LogRecord,
    format: SerializationFormat,
    max_frame_size: usize,
) -> io::Result<Vec<u8>> {
    let payload = serialise_record(record, format)?;
    Ok(frame_payload(&payload, max_frame_size)?)
}
