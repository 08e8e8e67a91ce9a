//! Handler builders and associated traits.
//!
//! Builders collect user supplied settings, validate them, and produce a
//! ready-to-use handler. Validation failures surface as
//! [`HandlerBuildError`] before any worker thread is spawned.

use std::io;

use thiserror::Error;

pub mod viewer_builder;

pub use viewer_builder::{BackoffOverrides, ViewerHandlerBuilder};

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// Underlying I/O error whilst loading configuration.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Trait implemented by all handler builders.
pub trait HandlerBuilderTrait: Send + Sync {
    type Handler;

    /// Build the handler instance.
    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError>;
}
