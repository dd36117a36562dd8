//! Error types for the progress display

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    /// The handle cannot be inspected for size or position.
    #[error("{0}")]
    SourceUnsupported(String),

    /// Size or metadata of the handle could not be read.
    #[error("cannot stat source: {0}")]
    SourceStatFailed(#[source] io::Error),

    /// The terminal could not be acquired, drawn to or released.
    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ProgressError>;
