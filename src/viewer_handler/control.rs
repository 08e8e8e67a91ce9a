//! Internal control commands exchanged with the viewer.
//!
//! A command is a UTF-8 payload starting with [`COMMAND_MAGIC`] followed by
//! `key=value`. The viewer recognises the prefix and treats the frame as
//! control data rather than a record.

use super::config::SerializationFormat;

/// Literal prefix marking a payload as an internal command.
pub const COMMAND_MAGIC: &str = "!!cutelog!!";

/// Build the handshake command advertising the record encoding.
pub fn format_command(format: SerializationFormat) -> Vec<u8> {
    format!("{COMMAND_MAGIC}format={}", format.as_str()).into_bytes()
}

/// Split a command payload into its key and value.
///
/// Returns `None` for anything that is not a well-formed command.
pub fn parse_command(payload: &[u8]) -> Option<(&str, &str)> {
    let text = std::str::from_utf8(payload).ok()?;
    text.strip_prefix(COMMAND_MAGIC)?.split_once('=')
}
