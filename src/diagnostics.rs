//! Caller-supplied diagnostic logger.
//!
//! Connectivity problems never reach the code submitting records. They are
//! reported here instead, through the `log` facade under a target chosen by
//! the caller. A disabled [`Diagnostics`] swallows everything.

use std::fmt;

/// Default `log` target used for diagnostics.
pub const DEFAULT_DIAGNOSTIC_TARGET: &str = "femtoship";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostics {
    target: Option<String>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTIC_TARGET)
    }
}

impl Diagnostics {
    /// Report diagnostics under `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
        }
    }

    /// Diagnostics that emit nothing.
    pub fn disabled() -> Self {
        Self { target: None }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Returns `true` if a `log` record with `target` was emitted by us.
    pub fn owns_target(&self, target: &str) -> bool {
        self.target
            .as_deref()
            .is_some_and(|own| target == own || target.starts_with(&format!("{own}::")))
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(log::Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(log::Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(log::Level::Debug, args);
    }

    fn emit(&self, level: log::Level, args: fmt::Arguments<'_>) {
        if let Some(target) = self.target.as_deref() {
            log::log!(target: target, level, "{args}");
        }
    }
}
