//! Compatibility bridge for the Rust `log` crate.
//!
//! [`ViewerLogAdapter`] implements `log::Log` and forwards records emitted
//! through the `log` macros into any [`Handler`], typically a
//! [`ViewerHandler`](crate::viewer_handler::ViewerHandler). Install it with
//! [`install_global_logger`].

use std::{borrow::Cow, sync::Arc};

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::{
    diagnostics::Diagnostics,
    handler::Handler,
    level::Level,
    log_record::{LogRecord, SourceLocation},
};

/// Adapter implementing the Rust `log::Log` trait.
pub struct ViewerLogAdapter {
    handler: Arc<dyn Handler>,
    filter: LevelFilter,
    diagnostics: Diagnostics,
}

impl ViewerLogAdapter {
    /// Forward records at or above `filter` to `handler`.
    ///
    /// Records under the `diagnostics` target are never forwarded, so the
    /// handler's own connectivity reports cannot loop back into it.
    pub fn new(handler: Arc<dyn Handler>, filter: LevelFilter, diagnostics: Diagnostics) -> Self {
        Self {
            handler,
            filter,
            diagnostics,
        }
    }

    pub fn filter(&self) -> LevelFilter {
        self.filter
    }

    fn convert(record: &Record<'_>) -> LogRecord {
        let name = normalise_target(record.target());
        let message = record.args().to_string();
        LogRecord::new(&name, Level::from(record.level()), &message).with_location(
            SourceLocation::new(
                record.file().unwrap_or_default(),
                record.line().unwrap_or(0),
                record.module_path().unwrap_or_default(),
            ),
        )
    }
}

fn normalise_target(target: &str) -> Cow<'_, str> {
    if target.contains("::") {
        Cow::Owned(target.replace("::", "."))
    } else {
        Cow::Borrowed(target)
    }
}

impl log::Log for ViewerLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.filter && !self.diagnostics.owns_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Submission only fails once the handler is closed; the handler
        // already counts and reports those drops.
        let _ = self.handler.handle(Self::convert(record));
    }

    fn flush(&self) {
        self.handler.flush();
    }
}

/// Install a [`ViewerLogAdapter`] as the global Rust logger.
///
/// Fails when another global logger has already been set.
pub fn install_global_logger(
    handler: Arc<dyn Handler>,
    filter: LevelFilter,
    diagnostics: Diagnostics,
) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(ViewerLogAdapter::new(handler, filter, diagnostics)))?;
    log::set_max_level(filter);
    Ok(())
}
