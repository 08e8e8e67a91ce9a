//! Connection state machine and the record buffer it drains.
//!
//! A [`Driver`] owns the connection state, the socket inside it, the record
//! buffer, and the drive timer. It is not thread-safe on purpose: the worker
//! thread is its only user, which is what serialises every mutation.

use std::{
    io::{self, Write},
    thread,
    time::Instant,
};

use crate::{diagnostics::Diagnostics, log_record::LogRecord};

use super::{
    backoff::BackoffState,
    buffer::RecordBuffer,
    config::ViewerHandlerConfig,
    control::format_command,
    frame::frame_payload,
    serialise::encode_record_frame,
    state::{ConnectionState, Crash, Phase},
    timer::{DriveTimer, interval_for},
    transport::Connector,
};

/// Outcome of a flush request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushReport {
    /// No connected socket; the buffer was left untouched.
    Disconnected { pending: usize },
    /// Every buffered record was attempted and the buffer emptied.
    Drained { delivered: usize, failed: usize },
}

impl FlushReport {
    /// `true` when every record buffered at flush time was written.
    pub fn is_complete(&self) -> bool {
        match self {
            FlushReport::Disconnected { pending } => *pending == 0,
            FlushReport::Drained { failed, .. } => *failed == 0,
        }
    }
}

fn write_frame<W: Write>(socket: &mut W, frame: &[u8]) -> io::Result<()> {
    socket.write_all(frame)?;
    socket.flush()
}

pub struct Driver<C: Connector> {
    config: ViewerHandlerConfig,
    connector: C,
    state: ConnectionState<C::Socket>,
    buffer: RecordBuffer,
    timer: DriveTimer,
    backoff: Option<BackoffState>,
    diagnostics: Diagnostics,
}

impl<C: Connector> Driver<C> {
    pub fn new(config: ViewerHandlerConfig, connector: C, now: Instant) -> Self {
        let timer = DriveTimer::new(config.reconnect_interval, now);
        let backoff = config.recovery.clone().map(BackoffState::new);
        let diagnostics = config.diagnostics.clone();
        Self {
            config,
            connector,
            state: ConnectionState::Closed,
            buffer: RecordBuffer::new(),
            timer,
            backoff,
            diagnostics,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn state(&self) -> &ConnectionState<C::Socket> {
        &self.state
    }

    pub fn buffer(&self) -> &RecordBuffer {
        &self.buffer
    }

    pub fn timer(&self) -> &DriveTimer {
        &self.timer
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Append a record to the tail of the buffer.
    pub fn submit(&mut self, record: LogRecord) {
        self.buffer.push(record);
    }

    /// Perform the single action belonging to the current phase.
    pub fn tick(&mut self, now: Instant) {
        let before = self.state.phase();
        self.state = match self.state.take() {
            ConnectionState::Closed => self.open_socket(now),
            ConnectionState::Opened(socket) => self.connect(socket),
            ConnectionState::Connected(socket) => self.negotiate(socket),
            ConnectionState::Running(socket) => self.ship_batch(socket),
            ConnectionState::Crashed(crash) => self.recover(crash, now),
        };
        self.timer.fired(now);
        let after = self.state.phase();
        if after != before {
            self.diagnostics
                .debug(format_args!("viewer connection {before} -> {after}"));
            if let Some(period) = interval_for(after, &self.config) {
                self.timer.reschedule(period, now);
            }
        }
    }

    fn open_socket(&mut self, now: Instant) -> ConnectionState<C::Socket> {
        match self.connector.open() {
            Ok(socket) => {
                if let Some(backoff) = self.backoff.as_mut() {
                    backoff.record_success();
                }
                ConnectionState::Opened(socket)
            }
            Err(reason) => {
                let retry_at = self
                    .backoff
                    .as_mut()
                    .and_then(|backoff| backoff.next_sleep(now))
                    .map(|delay| now + delay);
                match retry_at {
                    Some(_) => self.diagnostics.warn(format_args!(
                        "failed to create socket for {}: {reason}; retrying",
                        self.config.target
                    )),
                    None => self.diagnostics.warn(format_args!(
                        "failed to create socket for {}: {reason}; giving up, {} records stranded",
                        self.config.target,
                        self.buffer.len()
                    )),
                }
                ConnectionState::Crashed(Crash { reason, retry_at })
            }
        }
    }

    fn connect(&mut self, mut socket: C::Socket) -> ConnectionState<C::Socket> {
        match self
            .connector
            .connect(&mut socket, self.config.connect_timeout)
        {
            Ok(()) => {
                self.diagnostics
                    .info(format_args!("connected to viewer at {}", self.config.target));
                ConnectionState::Connected(socket)
            }
            Err(err) => {
                self.diagnostics.warn(format_args!(
                    "failed to connect to viewer at {}: {err}",
                    self.config.target
                ));
                ConnectionState::Opened(socket)
            }
        }
    }

    /// Send the format handshake. A failure is reported but not fatal: the
    /// viewer then decodes records with its default format.
    fn negotiate(&mut self, mut socket: C::Socket) -> ConnectionState<C::Socket> {
        let command = format_command(self.config.format);
        let sent = frame_payload(&command, self.config.max_frame_size)
            .map_err(io::Error::from)
            .and_then(|frame| write_frame(&mut socket, &frame));
        if let Err(err) = sent {
            self.diagnostics
                .warn(format_args!("failed to send format handshake: {err}"));
        }
        ConnectionState::Running(socket)
    }

    fn ship_batch(&mut self, mut socket: C::Socket) -> ConnectionState<C::Socket> {
        let mut consumed = 0;
        let mut failure = None;
        for record in self.buffer.head(self.config.batch_size) {
            let frame =
                match encode_record_frame(record, self.config.format, self.config.max_frame_size) {
                    Ok(frame) => frame,
                    Err(err) => {
                        self.diagnostics
                            .warn(format_args!("dropping undeliverable record: {err}"));
                        consumed += 1;
                        continue;
                    }
                };
            if let Err(err) = write_frame(&mut socket, &frame) {
                failure = Some(err);
                break;
            }
            consumed += 1;
        }
        self.buffer.discard_front(consumed);

        match failure {
            None => ConnectionState::Running(socket),
            Some(err) => {
                self.diagnostics.warn(format_args!(
                    "send to viewer failed: {err}; reconnecting with {} records pending",
                    self.buffer.len()
                ));
                drop(socket);
                ConnectionState::Closed
            }
        }
    }

    fn recover(&mut self, crash: Crash, now: Instant) -> ConnectionState<C::Socket> {
        match crash.retry_at {
            Some(at) if now >= at => {
                self.diagnostics
                    .info(format_args!("retrying socket creation after: {}", crash.reason));
                ConnectionState::Closed
            }
            _ => ConnectionState::Crashed(crash),
        }
    }

    /// Write out every buffered record on the live connection.
    ///
    /// Without a running connection this warns and returns at once, leaving
    /// the buffer untouched. Otherwise each record is attempted once, send
    /// errors are counted but do not stop the pass, and the buffer is
    /// emptied afterwards regardless of the outcome.
    pub fn flush(&mut self) -> FlushReport {
        let phase = self.state.phase();
        let ConnectionState::Running(socket) = &mut self.state else {
            let pending = self.buffer.len();
            self.diagnostics.warn(format_args!(
                "flush requested while {phase}; {pending} records were not sent"
            ));
            return FlushReport::Disconnected { pending };
        };

        let mut delivered = 0;
        let mut failed = 0;
        for record in self.buffer.iter() {
            let sent =
                encode_record_frame(record, self.config.format, self.config.max_frame_size)
                    .and_then(|frame| write_frame(socket, &frame));
            match sent {
                Ok(()) => delivered += 1,
                Err(_) => failed += 1,
            }
            if !self.config.flush_pause.is_zero() {
                thread::sleep(self.config.flush_pause);
            }
        }
        self.buffer.clear();
        if failed > 0 {
            self.diagnostics
                .warn(format_args!("flush lost {failed} of {} records", delivered + failed));
        }
        FlushReport::Drained { delivered, failed }
    }

    /// Stop ticking, flush once, and close any open socket.
    pub fn teardown(&mut self) -> FlushReport {
        self.timer.cancel();
        let report = self.flush();
        self.state = ConnectionState::Closed;
        report
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
