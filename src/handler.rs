use std::time::Duration;

use thiserror::Error;

use crate::log_record::LogRecord;

/// Errors surfaced to callers of a [`Handler`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler has been closed and no longer accepts records.
    #[error("handler is closed")]
    Closed,
    /// The worker did not acknowledge a flush in time.
    #[error("flush was not acknowledged within {0:?}")]
    FlushTimeout(Duration),
}

/// Trait implemented by record sinks.
///
/// Implementations forward the record to their own consumer thread
/// without blocking the caller, so `handle` is safe to call from any thread.
pub trait Handler: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError>;

    /// Drain pending records. Returns `true` when everything buffered was
    /// written out.
    fn flush(&self) -> bool;
}
