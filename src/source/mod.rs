//! Progress sources: the per-task status line producers
//!
//! A source is either a [`Spinner`] (elapsed time plus a cycling wheel) or an
//! [`OffsetTracker`] (elapsed time plus percent complete). Which one a task
//! gets is decided by probing the handle passed to the registry, see
//! [`ProgressHandle`].

mod handle;
mod offset;
mod spinner;

use std::time::{Duration, Instant};

use enum_dispatch::enum_dispatch;

pub use handle::{classify, CountingReader, ProgressCounter, ProgressHandle};
pub use offset::{OffsetTracker, PositionSource};
pub use spinner::{Spinner, WHEEL};

/// Common behaviour of every progress source.
#[enum_dispatch]
pub trait ReadStatus {
    /// Render the current status. May advance transient display state.
    fn status(&mut self) -> String;

    /// Freeze the source at the current elapsed time.
    ///
    /// Not idempotent: a second call re-measures the elapsed time.
    fn mark_done(&mut self);

    fn is_done(&self) -> bool;
}

#[enum_dispatch(ReadStatus)]
pub enum ProgressSource {
    Spinner(Spinner),
    Offset(OffsetTracker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Spinner,
    Offset,
}

impl ProgressSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ProgressSource::Spinner(_) => SourceKind::Spinner,
            ProgressSource::Offset(_) => SourceKind::Offset,
        }
    }
}

impl std::fmt::Debug for ProgressSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ProgressSource").field(&self.kind()).finish()
    }
}

/// Wall clock truncated to whole seconds since a fixed start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    #[cfg(test)]
    pub(crate) fn started_at(start: Instant) -> Self {
        Self { start }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        Duration::from_secs(self.start.elapsed().as_secs())
    }

    /// Elapsed time for a finished source, never less than one second.
    pub(crate) fn elapsed_at_least_one_tick(&self) -> Duration {
        self.elapsed().max(Duration::from_secs(1))
    }
}

/// Render a duration as `1h2m3s`, dropping leading zero units.
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}

pub(crate) fn done_line(elapsed: Duration) -> String {
    format!("{} {:6.2}%", format_elapsed(elapsed), 100.0)
}
