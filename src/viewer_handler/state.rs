//! Connection lifecycle states.

use std::{fmt, io, time::Instant};

/// Lifecycle of the connection to the viewer.
///
/// Variants holding a socket own it outright. Moving to another variant
/// either hands the socket over or drops (and thereby closes) it.
pub enum ConnectionState<S> {
    /// No socket exists.
    Closed,
    /// A socket exists but is not connected.
    Opened(S),
    /// TCP connected; the format handshake has not been sent.
    Connected(S),
    /// Steadily shipping records.
    Running(S),
    /// Socket creation failed.
    Crashed(Crash),
}

/// Why and until when the worker is crashed.
#[derive(Debug)]
pub struct Crash {
    pub reason: io::Error,
    /// When the next socket creation may be attempted. `None` means never.
    pub retry_at: Option<Instant>,
}

/// Socket-free view of [`ConnectionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Closed,
    Opened,
    Connected,
    Running,
    Crashed,
}

impl<S> ConnectionState<S> {
    pub fn phase(&self) -> Phase {
        match self {
            ConnectionState::Closed => Phase::Closed,
            ConnectionState::Opened(_) => Phase::Opened,
            ConnectionState::Connected(_) => Phase::Connected,
            ConnectionState::Running(_) => Phase::Running,
            ConnectionState::Crashed(_) => Phase::Crashed,
        }
    }

    /// Take the state, leaving `Closed` behind.
    pub fn take(&mut self) -> Self {
        std::mem::replace(self, ConnectionState::Closed)
    }
}

impl<S> Default for ConnectionState<S> {
    fn default() -> Self {
        ConnectionState::Closed
    }
}

impl<S> fmt::Debug for ConnectionState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Crashed(crash) => f.debug_tuple("Crashed").field(crash).finish(),
            other => write!(f, "{:?}", other.phase()),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Closed => "closed",
            Phase::Opened => "opened",
            Phase::Connected => "connected",
            Phase::Running => "running",
            Phase::Crashed => "crashed",
        };
        f.write_str(name)
    }
}
