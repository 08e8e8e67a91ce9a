//! Asynchronous, self-reconnecting client that ships log records to a remote
//! log viewer over TCP.
//!
//! Records are framed with a four byte big-endian length prefix and encoded
//! as MessagePack (or JSON). A dedicated worker thread owns the connection,
//! buffers records while the viewer is unreachable, and negotiates the
//! payload format after every connect.
//!
//! ```no_run
//! use femtoship::{Level, LogRecord, ViewerHandler};
//!
//! let mut handler = ViewerHandler::new("localhost", 19996);
//! handler
//!     .submit(LogRecord::new("app.db", Level::Info, "pool ready"))
//!     .expect("handler is open");
//! handler.close();
//! ```

pub mod diagnostics;
pub mod file_config;
mod handler;
pub mod handlers;
mod level;
pub mod log_compat;
mod log_record;
mod rate_limited_warner;
pub mod viewer_handler;

pub use diagnostics::{DEFAULT_DIAGNOSTIC_TARGET, Diagnostics};
pub use handler::{Handler, HandlerError};
pub use handlers::{BackoffOverrides, HandlerBuildError, HandlerBuilderTrait, ViewerHandlerBuilder};
pub use level::{Level, ParseLevelError};
pub use log_compat::{ViewerLogAdapter, install_global_logger};
pub use log_record::{LogRecord, RESERVED_KEYS, SourceLocation, is_reserved_key};
pub use viewer_handler::{
    FlushReport, SerializationFormat, TcpTarget, ViewerHandler, ViewerHandlerConfig,
};
