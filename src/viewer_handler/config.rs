//! Configuration structures consumed by the viewer handler lifecycle.
//!
//! `ViewerHandlerBuilder` constructs these values before passing them to
//! [`ViewerHandler`](super::ViewerHandler) for runtime use.

use std::{fmt, str::FromStr, time::Duration};

use crate::{diagnostics::Diagnostics, rate_limited_warner::DEFAULT_WARN_INTERVAL};

/// Default TCP port a log viewer listens on.
pub const DEFAULT_PORT: u16 = 19996;
/// Default connection timeout applied when establishing sockets.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// Default write timeout applied to socket writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default tick period while not steadily shipping.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(500);
/// Default tick period while in the running state.
pub const DEFAULT_WORKER_INTERVAL: Duration = Duration::from_millis(50);
/// Default number of records sent per running tick.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Default maximum payload size (in bytes) accepted for one frame.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1 << 20; // 1 MiB
/// Default pause between records while flushing.
pub const DEFAULT_FLUSH_PAUSE: Duration = Duration::from_micros(100);
/// Default time a caller waits for a flush acknowledgement.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);
/// Default base delay before retrying after a socket creation failure.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Default maximum delay between socket creation retries.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(10);
/// Default window after which a socket creation failure becomes permanent.
pub const DEFAULT_BACKOFF_DEADLINE: Duration = Duration::from_secs(120);

/// Payload encoding negotiated with the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SerializationFormat {
    #[default]
    MsgPack,
    Json,
}

impl SerializationFormat {
    /// Name advertised in the format handshake.
    pub fn as_str(self) -> &'static str {
        match self {
            SerializationFormat::MsgPack => "msgpack",
            SerializationFormat::Json => "json",
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SerializationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "msgpack" => Ok(Self::MsgPack),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported serialization format: {other}")),
        }
    }
}

/// Address of the remote viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpTarget {
    /// Hostname or IP address to connect to.
    pub host: String,
    pub port: u16,
}

impl TcpTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for TcpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Configuration object describing how to construct a [`ViewerHandler`](super::ViewerHandler).
#[derive(Clone, Debug)]
pub struct ViewerHandlerConfig {
    pub target: TcpTarget,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub reconnect_interval: Duration,
    pub worker_interval: Duration,
    pub batch_size: usize,
    pub format: SerializationFormat,
    pub max_frame_size: usize,
    pub flush_pause: Duration,
    pub flush_timeout: Duration,
    /// Retry policy for socket creation failures; `None` makes them fatal.
    pub recovery: Option<BackoffPolicy>,
    pub diagnostics: Diagnostics,
    pub warn_interval: Duration,
}

impl Default for ViewerHandlerConfig {
    fn default() -> Self {
        Self {
            target: TcpTarget::new("localhost", DEFAULT_PORT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            worker_interval: DEFAULT_WORKER_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            format: SerializationFormat::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            flush_pause: DEFAULT_FLUSH_PAUSE,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            recovery: Some(BackoffPolicy::default()),
            diagnostics: Diagnostics::default(),
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

impl ViewerHandlerConfig {
    /// Override the viewer address.
    pub fn with_target(mut self, host: impl Into<String>, port: u16) -> Self {
        self.target = TcpTarget::new(host, port);
        self
    }
}

/// Exponential backoff policy for recovering from socket creation failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub deadline: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BACKOFF_BASE,
            cap: DEFAULT_BACKOFF_CAP,
            deadline: DEFAULT_BACKOFF_DEADLINE,
        }
    }
}
