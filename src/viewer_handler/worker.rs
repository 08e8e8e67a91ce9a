//! Worker thread driving socket I/O.
//!
//! The worker is the only owner of the [`Driver`]. Producers reach it
//! through an unbounded channel, so submitting never blocks, and every
//! record, flush, shutdown, and timer tick is handled on this one thread.

use std::{
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};

use crate::{handler::HandlerError, log_record::LogRecord};

use super::{
    config::ViewerHandlerConfig,
    driver::{Driver, FlushReport},
    transport::Connector,
};

/// Commands processed by the worker thread.
#[derive(Debug)]
pub enum ViewerCommand {
    Record(LogRecord),
    Flush(Sender<FlushReport>),
    Shutdown(Sender<FlushReport>),
}

pub fn spawn_worker<C: Connector>(
    config: ViewerHandlerConfig,
    connector: C,
) -> (Sender<ViewerCommand>, thread::JoinHandle<()>) {
    let (tx, rx) = unbounded();
    let handle = thread::spawn(move || {
        let driver = Driver::new(config, connector, Instant::now());
        worker_loop(rx, driver);
    });
    (tx, handle)
}

fn next_command<C: Connector>(
    rx: &Receiver<ViewerCommand>,
    driver: &Driver<C>,
) -> Result<ViewerCommand, RecvTimeoutError> {
    match driver.timer().deadline() {
        Some(deadline) => rx.recv_deadline(deadline),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    }
}

fn worker_loop<C: Connector>(rx: Receiver<ViewerCommand>, mut driver: Driver<C>) {
    loop {
        // A steady stream of records must not starve the timer.
        let now = Instant::now();
        if driver.timer().is_due(now) {
            driver.tick(now);
            continue;
        }
        match next_command(&rx, &driver) {
            Ok(ViewerCommand::Record(record)) => driver.submit(record),
            Ok(ViewerCommand::Flush(ack)) => {
                let _ = ack.send(driver.flush());
            }
            Ok(ViewerCommand::Shutdown(ack)) => {
                for cmd in rx.try_iter() {
                    if let ViewerCommand::Record(record) = cmd {
                        driver.submit(record);
                    }
                }
                let _ = ack.send(driver.teardown());
                break;
            }
            Err(RecvTimeoutError::Timeout) => driver.tick(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                driver.teardown();
                break;
            }
        }
    }
}

/// Enqueue a record without blocking.
pub fn enqueue_record(tx: &Sender<ViewerCommand>, record: LogRecord) -> Result<(), HandlerError> {
    tx.send(ViewerCommand::Record(record))
        .map_err(|_| HandlerError::Closed)
}

/// Sends `make(ack)` to the worker and waits up to `timeout` for the report.
pub fn request_report(
    tx: &Sender<ViewerCommand>,
    make: impl FnOnce(Sender<FlushReport>) -> ViewerCommand,
    timeout: Duration,
) -> Result<FlushReport, HandlerError> {
    let (ack_tx, ack_rx) = bounded(1);
    tx.send(make(ack_tx)).map_err(|_| HandlerError::Closed)?;
    ack_rx.recv_timeout(timeout).map_err(|err| match err {
        RecvTimeoutError::Timeout => HandlerError::FlushTimeout(timeout),
        RecvTimeoutError::Disconnected => HandlerError::Closed,
    })
}
