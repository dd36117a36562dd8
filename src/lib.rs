//! Live per-task progress display for processes running many long reads in
//! parallel, plus a bounded worker pool to feed them.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod registry;
pub mod source;

pub use dispatch::bounded_exec;
pub use error::{ProgressError, Result};
pub use registry::{
    ChannelInput, CrosstermInput, CrosstermSurface, HeadlessSurface, InputEvent, InputSource,
    InterruptAction, ProgressEntry, Registry, RegistryConfig, Surface,
};
pub use source::{ProgressHandle, ProgressSource, ReadStatus, SourceKind};
