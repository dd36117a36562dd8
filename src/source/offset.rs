use std::fs::File;
use std::io::{self, Seek};
use std::time::Duration;

use tracing::debug;

use super::{done_line, format_elapsed, ReadStatus, Stopwatch};
use crate::error::{ProgressError, Result};

/// Something that can report how far a reader has got through its input.
pub trait PositionSource: Send {
    /// Total number of bytes the reader will consume.
    fn size(&mut self) -> io::Result<u64>;

    /// Bytes consumed so far.
    fn position(&mut self) -> io::Result<u64>;
}

/// A duplicated `File` shares its cursor with the original, so the reader's
/// offset is visible here without any cooperation from the reader.
impl PositionSource for File {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }
}

/// Shows percent complete by comparing the current offset against the size.
///
/// The handle is dropped as soon as the tracker is done, so a finished entry
/// holds no file descriptor.
pub struct OffsetTracker {
    // One percent of the total size.
    units: f64,
    handle: Option<Box<dyn PositionSource>>,
    clock: Stopwatch,
    elapsed: Option<Duration>,
}

impl OffsetTracker {
    pub fn new(handle: Box<dyn PositionSource>) -> Result<Self> {
        Self::with_clock(handle, Stopwatch::start())
    }

    pub(crate) fn with_clock(
        mut handle: Box<dyn PositionSource>,
        clock: Stopwatch,
    ) -> Result<Self> {
        let size = handle.size().map_err(ProgressError::SourceStatFailed)?;
        Ok(Self {
            units: size as f64 / 100.0,
            handle: Some(handle),
            clock,
            elapsed: None,
        })
    }

    fn percent(&self, position: u64) -> f64 {
        if self.units == 0.0 {
            return 100.0;
        }
        position as f64 / self.units
    }
}

impl std::fmt::Debug for OffsetTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffsetTracker")
            .field("units", &self.units)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

impl ReadStatus for OffsetTracker {
    fn status(&mut self) -> String {
        if let Some(elapsed) = self.elapsed {
            return done_line(elapsed);
        }
        let position = match self.handle.as_mut() {
            Some(handle) => handle.position(),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "handle released")),
        };
        match position {
            Ok(position) => format!(
                "{} {:6.2}%",
                format_elapsed(self.clock.elapsed()),
                self.percent(position)
            ),
            Err(e) => {
                debug!("position unavailable, marking source done: {}", e);
                self.mark_done();
                self.status()
            }
        }
    }

    fn mark_done(&mut self) {
        self.handle = None;
        self.elapsed = Some(self.clock.elapsed_at_least_one_tick());
    }

    fn is_done(&self) -> bool {
        self.elapsed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    struct FakePosition {
        size: io::Result<u64>,
        position: Arc<AtomicU64>,
        fail_reads: bool,
    }

    impl FakePosition {
        fn new(size: u64) -> (Self, Arc<AtomicU64>) {
            let position = Arc::new(AtomicU64::new(0));
            let fake = Self {
                size: Ok(size),
                position: Arc::clone(&position),
                fail_reads: false,
            };
            (fake, position)
        }
    }

    impl PositionSource for FakePosition {
        fn size(&mut self) -> io::Result<u64> {
            match &self.size {
                Ok(size) => Ok(*size),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }

        fn position(&mut self) -> io::Result<u64> {
            if self.fail_reads {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            Ok(self.position.load(Ordering::SeqCst))
        }
    }

    fn percent_of(status: &str) -> &str {
        status.split_whitespace().last().unwrap()
    }

    #[test]
    fn test_percent_follows_position() {
        let (fake, position) = FakePosition::new(200);
        let mut tracker = OffsetTracker::new(Box::new(fake)).unwrap();

        assert_eq!(percent_of(&tracker.status()), "0.00%");
        position.store(50, Ordering::SeqCst);
        assert_eq!(percent_of(&tracker.status()), "25.00%");
        position.store(200, Ordering::SeqCst);
        assert_eq!(percent_of(&tracker.status()), "100.00%");
        assert!(!tracker.is_done());
    }

    #[test]
    fn test_status_includes_elapsed() {
        let (fake, position) = FakePosition::new(1000);
        position.store(125, Ordering::SeqCst);
        let start = Instant::now() - Duration::from_secs(30);
        let mut tracker =
            OffsetTracker::with_clock(Box::new(fake), Stopwatch::started_at(start)).unwrap();
        assert_eq!(tracker.status(), "30s  12.50%");
    }

    #[test]
    fn test_zero_size_reports_complete() {
        let (fake, _) = FakePosition::new(0);
        let mut tracker = OffsetTracker::new(Box::new(fake)).unwrap();
        assert_eq!(percent_of(&tracker.status()), "100.00%");
    }

    #[test]
    fn test_read_failure_marks_done() {
        let (mut fake, position) = FakePosition::new(100);
        fake.fail_reads = true;
        position.store(10, Ordering::SeqCst);
        let mut tracker = OffsetTracker::new(Box::new(fake)).unwrap();

        assert_eq!(tracker.status(), "1s 100.00%");
        assert!(tracker.is_done());
    }

    #[test]
    fn test_stat_failure() {
        let (mut fake, _) = FakePosition::new(0);
        fake.size = Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));

        let err = OffsetTracker::new(Box::new(fake)).unwrap_err();
        assert!(matches!(err, ProgressError::SourceStatFailed(_)));
    }

    #[test]
    fn test_mark_done_after_partial_read() {
        let (fake, position) = FakePosition::new(400);
        let mut tracker = OffsetTracker::new(Box::new(fake)).unwrap();
        position.store(100, Ordering::SeqCst);
        assert_eq!(percent_of(&tracker.status()), "25.00%");

        tracker.mark_done();
        assert_eq!(percent_of(&tracker.status()), "100.00%");
        assert!(tracker.is_done());
    }

    struct ReleaseFlag {
        released: Arc<AtomicBool>,
    }

    impl PositionSource for ReleaseFlag {
        fn size(&mut self) -> io::Result<u64> {
            Ok(100)
        }

        fn position(&mut self) -> io::Result<u64> {
            Ok(40)
        }
    }

    impl Drop for ReleaseFlag {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_mark_done_releases_handle() {
        let released = Arc::new(AtomicBool::new(false));
        let handle = ReleaseFlag {
            released: Arc::clone(&released),
        };
        let mut tracker = OffsetTracker::new(Box::new(handle)).unwrap();
        assert_eq!(percent_of(&tracker.status()), "40.00%");
        assert!(!released.load(Ordering::SeqCst));

        tracker.mark_done();
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(percent_of(&tracker.status()), "100.00%");
        assert!(tracker.is_done());
    }

    #[test]
    fn test_read_failure_releases_handle() {
        let (mut fake, _) = FakePosition::new(100);
        fake.fail_reads = true;
        let mut tracker = OffsetTracker::new(Box::new(fake)).unwrap();

        tracker.status();
        assert!(tracker.handle.is_none());
    }

    #[test]
    fn test_file_shares_cursor_with_clone() {
        let mut tmp = tempfile::tempfile().unwrap();
        tmp.write_all(&[7u8; 400]).unwrap();
        tmp.rewind().unwrap();

        let mut tracker = OffsetTracker::new(Box::new(tmp.try_clone().unwrap())).unwrap();
        let mut buf = [0u8; 100];
        tmp.read_exact(&mut buf).unwrap();

        assert_eq!(percent_of(&tracker.status()), "25.00%");
    }
}
