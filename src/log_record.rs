//! Log record representation shipped to the viewer.
//!
//! A [`LogRecord`] is created once per log call, held in the worker's record
//! buffer, and discarded once it has been framed onto the socket.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::level::Level;

/// Metadata keys owned by the built-in record fields.
///
/// Metadata entries using one of these keys are dropped during
/// serialisation so the built-in value always wins.
pub const RESERVED_KEYS: [&str; 7] = [
    "name",
    "message",
    "levelname",
    "created",
    "file",
    "line",
    "function",
];

/// Returns `true` when `key` collides with a built-in record field.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Source location of the log call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file name.
    pub file: String,
    /// Line number in the source file.
    pub line: u32,
    /// Function or module path that emitted the record.
    pub function: String,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Logical namespace label, e.g. `app.db`.
    pub name: String,
    /// The log message content.
    pub message: String,
    pub level: Level,
    /// Time the record was created.
    pub created: SystemTime,
    pub location: SourceLocation,
    /// Free-form string metadata attached by the caller.
    pub metadata: BTreeMap<String, String>,
}

impl LogRecord {
    /// Construct a record stamped with the current time.
    pub fn new(name: &str, level: Level, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            message: message.to_owned(),
            level,
            created: SystemTime::now(),
            location: SourceLocation::default(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Attach a metadata entry, replacing any previous value for `key`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Creation time as whole seconds since the Unix epoch.
    pub fn created_secs(&self) -> u64 {
        self.created
            .duration_since(UNIX_EPOCH)
            .map(|dur| dur.as_secs())
            .unwrap_or_default()
    }

    /// Metadata entries that do not collide with a built-in field.
    pub fn extra_metadata(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata
            .iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.name, self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    fn created_secs_truncates_to_whole_seconds() {
        let mut record = LogRecord::new("app", Level::Info, "hello");
        record.created = UNIX_EPOCH + Duration::from_millis(42_999);
        assert_eq!(record.created_secs(), 42);
    }

    #[rstest]
    fn extra_metadata_skips_reserved_keys() {
        let record = LogRecord::new("app", Level::Info, "hello")
            .with_metadata("message", "shadow")
            .with_metadata("request_id", "abc")
            .with_metadata("line", "7");
        let extra: Vec<_> = record.extra_metadata().collect();
        assert_eq!(extra, vec![("request_id", "abc")]);
    }

    #[rstest]
    fn display_includes_name_level_and_message() {
        let record = LogRecord::new("app.db", Level::Warning, "slow query");
        assert_eq!(record.to_string(), "app.db [WARNING] slow query");
    }
}
