//! Public handler type exported by the crate.

use std::{thread, time::Duration};

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::{
    diagnostics::Diagnostics,
    handler::{Handler, HandlerError},
    log_record::LogRecord,
    rate_limited_warner::RateLimitedWarner,
};

use super::{
    config::ViewerHandlerConfig,
    driver::FlushReport,
    transport::{Connector, TcpConnector},
    worker::{ViewerCommand, enqueue_record, request_report, spawn_worker},
};

/// Client shipping records to a remote log viewer.
///
/// Records are handed to a dedicated worker thread that owns the connection
/// and reconnects on its own. [`submit`](Self::submit) never blocks.
/// Dropping the handler performs the same teardown as [`close`](Self::close).
pub struct ViewerHandler {
    tx: Option<Sender<ViewerCommand>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    warner: RateLimitedWarner,
    diagnostics: Diagnostics,
    flush_timeout: Duration,
}

impl ViewerHandler {
    /// Construct a handler targeting `host:port` with default configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_config(ViewerHandlerConfig::default().with_target(host, port))
    }

    /// Construct the handler from a configuration object.
    pub fn with_config(config: ViewerHandlerConfig) -> Self {
        let connector = TcpConnector::from_config(&config);
        Self::with_connector(config, connector)
    }

    /// Construct the handler around a custom [`Connector`].
    pub fn with_connector<C: Connector>(config: ViewerHandlerConfig, connector: C) -> Self {
        let flush_timeout = config.flush_timeout;
        let warner = RateLimitedWarner::new(config.warn_interval);
        let diagnostics = config.diagnostics.clone();
        let (tx, handle) = spawn_worker(config, connector);
        Self {
            tx: Some(tx),
            handle: Mutex::new(Some(handle)),
            warner,
            diagnostics,
            flush_timeout,
        }
    }

    /// Queue a record for delivery without blocking.
    ///
    /// Fails only once the handler has been closed.
    pub fn submit(&self, record: LogRecord) -> Result<(), HandlerError> {
        let result = match self.tx.as_ref() {
            Some(tx) => enqueue_record(tx, record),
            None => Err(HandlerError::Closed),
        };
        if result.is_err() {
            self.warner.record_drop();
            self.warner.warn_if_due(|count| {
                self.diagnostics
                    .warn(format_args!("viewer handler closed; dropped {count} records"));
            });
        }
        result
    }

    /// Block until the worker has written out every buffered record.
    ///
    /// When the worker is not connected nothing is sent and the buffered
    /// records stay queued; the report says how many.
    pub fn flush(&self) -> Result<FlushReport, HandlerError> {
        let tx = self.tx.as_ref().ok_or(HandlerError::Closed)?;
        self.warner.flush(|count| {
            self.diagnostics
                .warn(format_args!("viewer handler dropped {count} records"));
        });
        request_report(tx, ViewerCommand::Flush, self.flush_timeout)
    }

    /// Flush once, close the connection, and wait for the worker to exit.
    ///
    /// Returns the final flush report, or `None` if already closed.
    pub fn close(&mut self) -> Option<FlushReport> {
        let report = self.request_shutdown();
        self.join_worker();
        report
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    fn request_shutdown(&mut self) -> Option<FlushReport> {
        let tx = self.tx.take()?;
        match request_report(&tx, ViewerCommand::Shutdown, self.flush_timeout) {
            Ok(report) => Some(report),
            Err(err) => {
                self.diagnostics
                    .warn(format_args!("viewer handler shutdown incomplete: {err}"));
                None
            }
        }
    }

    fn join_worker(&mut self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            self.diagnostics
                .warn(format_args!("viewer handler worker thread panicked"));
        }
    }
}

impl Handler for ViewerHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        self.submit(record)
    }

    fn flush(&self) -> bool {
        ViewerHandler::flush(self).is_ok_and(|report| report.is_complete())
    }
}

impl Drop for ViewerHandler {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ViewerHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerHandler")
            .field("closed", &self.is_closed())
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}
