//! Scripted transport used to drive the state machine in tests.

use std::{
    io::{self, Cursor, Write},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use serde_json::Value;

use crate::{diagnostics::Diagnostics, level::Level, log_record::LogRecord};

use super::{
    config::ViewerHandlerConfig,
    control::parse_command,
    frame::read_frame,
    transport::Connector,
};

#[derive(Default)]
struct Script {
    open_failures: usize,
    connect_failures: usize,
    opens: usize,
    write_budget: Option<usize>,
    wire: Vec<u8>,
}

/// Connector whose failures are scripted by the test.
///
/// Clones share the same script, so a test keeps one clone to steer and
/// inspect the connector after handing another to a driver.
#[derive(Clone, Default)]
pub(crate) struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    /// Fail the next `count` socket creations.
    pub(crate) fn fail_opens(&self, count: usize) {
        self.script.lock().open_failures = count;
    }

    /// Fail the next `count` connect attempts.
    pub(crate) fn fail_connects(&self, count: usize) {
        self.script.lock().connect_failures = count;
    }

    /// Allow `budget` more successful writes, or unlimited writes for `None`.
    pub(crate) fn allow_writes(&self, budget: Option<usize>) {
        self.script.lock().write_budget = budget;
    }

    pub(crate) fn opens(&self) -> usize {
        self.script.lock().opens
    }

    /// Every frame written so far, in order.
    pub(crate) fn frames(&self) -> Vec<Vec<u8>> {
        let wire = self.script.lock().wire.clone();
        let mut cursor = Cursor::new(wire);
        let mut frames = Vec::new();
        while let Some(frame) = read_frame(&mut cursor, usize::MAX).expect("well-formed wire") {
            frames.push(frame);
        }
        frames
    }

    /// Messages of the record frames written so far, skipping commands.
    pub(crate) fn messages(&self) -> Vec<String> {
        record_messages(&self.frames())
    }
}

pub(crate) struct ScriptedSocket {
    script: Arc<Mutex<Script>>,
}

impl Write for ScriptedSocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut script = self.script.lock();
        match script.write_budget.as_mut() {
            Some(0) => return Err(io::ErrorKind::BrokenPipe.into()),
            Some(budget) => *budget -= 1,
            None => {}
        }
        script.wire.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Connector for ScriptedConnector {
    type Socket = ScriptedSocket;

    fn open(&mut self) -> io::Result<ScriptedSocket> {
        let mut script = self.script.lock();
        if script.open_failures > 0 {
            script.open_failures -= 1;
            return Err(io::Error::other("socket table exhausted"));
        }
        script.opens += 1;
        Ok(ScriptedSocket {
            script: Arc::clone(&self.script),
        })
    }

    fn connect(&mut self, _socket: &mut ScriptedSocket, _timeout: Duration) -> io::Result<()> {
        let mut script = self.script.lock();
        if script.connect_failures > 0 {
            script.connect_failures -= 1;
            return Err(io::ErrorKind::ConnectionRefused.into());
        }
        Ok(())
    }
}

/// Quiet, fast configuration for state machine tests.
pub(crate) fn test_config() -> ViewerHandlerConfig {
    ViewerHandlerConfig {
        reconnect_interval: Duration::from_millis(40),
        worker_interval: Duration::from_millis(5),
        flush_pause: Duration::ZERO,
        recovery: None,
        diagnostics: Diagnostics::disabled(),
        ..ViewerHandlerConfig::default()
    }
}

pub(crate) fn record(message: &str) -> LogRecord {
    LogRecord::new("test", Level::Info, message)
}

pub(crate) fn decode_payload(payload: &[u8]) -> Value {
    rmp_serde::from_slice(payload).expect("decode msgpack payload")
}

pub(crate) fn record_messages(frames: &[Vec<u8>]) -> Vec<String> {
    frames
        .iter()
        .filter(|frame| parse_command(frame).is_none())
        .map(|frame| {
            decode_payload(frame)["message"]
                .as_str()
                .expect("message field")
                .to_owned()
        })
        .collect()
}
