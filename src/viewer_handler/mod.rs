//! Log viewer client.
//!
//! This module defines [`ViewerHandler`], which frames
//! [`LogRecord`](crate::log_record::LogRecord) values and ships them to a
//! remote log viewer over TCP. A single worker thread owns the connection
//! state machine, the pending record buffer, and the drive timer; it
//! reconnects on its own and negotiates the payload format with a control
//! command after every connect.

mod backoff;
pub mod buffer;
mod config;
pub mod control;
pub mod driver;
pub mod frame;
mod handler;
pub mod serialise;
pub mod state;
pub mod timer;
mod transport;
mod worker;

#[cfg(test)]
mod test_support;

pub use config::{
    BackoffPolicy, DEFAULT_BATCH_SIZE, DEFAULT_PORT, SerializationFormat, TcpTarget,
    ViewerHandlerConfig,
};
pub use driver::{Driver, FlushReport};
pub use handler::ViewerHandler;
pub use state::{ConnectionState, Phase};
pub use transport::{Connector, TcpConnector};
