//! Handles passed to the registry and how they become progress sources

use std::fs::File;
use std::io::{self, Read};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{OffsetTracker, PositionSource, ProgressSource, Spinner};
use crate::error::ProgressError;

/// What a task hands to the registry so its progress can be shown.
pub enum ProgressHandle {
    /// A readable stream with no notion of position or size, such as a
    /// decompressor. The label names the stream in the error message.
    Opaque(String),
    /// Something that reports size and position.
    Seekable(Box<dyn PositionSource>),
    /// Probing the handle failed before a source could be built.
    Unavailable(io::Error),
    /// Nothing to inspect; show a spinner.
    Untracked,
}

impl ProgressHandle {
    pub fn opaque(label: impl Into<String>) -> Self {
        ProgressHandle::Opaque(label.into())
    }
}

/// Tracks a duplicate of the file's descriptor, which shares its cursor.
/// The duplicate is closed once the entry is completed.
impl From<&File> for ProgressHandle {
    fn from(file: &File) -> Self {
        match file.try_clone() {
            Ok(dup) => ProgressHandle::Seekable(Box::new(dup)),
            Err(e) => ProgressHandle::Unavailable(e),
        }
    }
}

impl From<&ProgressCounter> for ProgressHandle {
    fn from(counter: &ProgressCounter) -> Self {
        ProgressHandle::Seekable(Box::new(counter.clone()))
    }
}

/// Turn a handle into a source. Failures always fall back to a spinner and
/// hand back the error so it can be shown next to the entry.
pub fn classify(handle: ProgressHandle) -> (ProgressSource, Option<ProgressError>) {
    match handle {
        ProgressHandle::Opaque(label) => (
            Spinner::new().into(),
            Some(ProgressError::SourceUnsupported(format!(
                "cannot inspect {}, use wrapped reader",
                label
            ))),
        ),
        ProgressHandle::Seekable(inner) => match OffsetTracker::new(inner) {
            Ok(tracker) => (tracker.into(), None),
            Err(e) => (Spinner::new().into(), Some(e)),
        },
        ProgressHandle::Unavailable(e) => (
            Spinner::new().into(),
            Some(ProgressError::SourceStatFailed(e)),
        ),
        ProgressHandle::Untracked => (Spinner::new().into(), None),
    }
}

/// Shared byte counter for streams that cannot report their own offset.
///
/// Wrap the raw reader in a [`CountingReader`] and register the counter.
#[derive(Debug, Clone)]
pub struct ProgressCounter {
    read: Arc<AtomicU64>,
    total: u64,
}

impl ProgressCounter {
    pub fn new(total: u64) -> Self {
        Self {
            read: Arc::new(AtomicU64::new(0)),
            total,
        }
    }

    pub fn add(&self, n: u64) {
        self.read.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.read.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

impl PositionSource for ProgressCounter {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.total)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.get())
    }
}

/// A reader that records every byte it yields in a [`ProgressCounter`].
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    counter: ProgressCounter,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R, total: u64) -> Self {
        Self {
            inner,
            counter: ProgressCounter::new(total),
        }
    }

    pub fn counter(&self) -> &ProgressCounter {
        &self.counter
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.add(n as u64);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ReadStatus, SourceKind};
    use std::io::Write;

    #[test]
    fn test_opaque_stream_falls_back_to_spinner() {
        let (source, err) = classify(ProgressHandle::opaque("gzip stream"));
        assert_eq!(source.kind(), SourceKind::Spinner);
        let err = err.unwrap();
        assert!(matches!(err, ProgressError::SourceUnsupported(_)));
        assert_eq!(
            err.to_string(),
            "cannot inspect gzip stream, use wrapped reader"
        );
    }

    #[test]
    fn test_file_becomes_offset_tracker() {
        let mut tmp = tempfile::tempfile().unwrap();
        tmp.write_all(b"hello world").unwrap();

        let (source, err) = classify(ProgressHandle::from(&tmp));
        assert_eq!(source.kind(), SourceKind::Offset);
        assert!(err.is_none());
    }

    #[test]
    fn test_unavailable_is_stat_failure() {
        let handle = ProgressHandle::Unavailable(io::Error::new(io::ErrorKind::Other, "gone"));
        let (source, err) = classify(handle);
        assert_eq!(source.kind(), SourceKind::Spinner);
        assert!(matches!(err, Some(ProgressError::SourceStatFailed(_))));
    }

    #[test]
    fn test_untracked_is_spinner_without_error() {
        let (source, err) = classify(ProgressHandle::Untracked);
        assert_eq!(source.kind(), SourceKind::Spinner);
        assert!(err.is_none());
    }

    #[test]
    fn test_counting_reader_drives_tracker() {
        let data = vec![1u8; 1000];
        let mut reader = CountingReader::new(&data[..], data.len() as u64);
        let (mut source, err) = classify(ProgressHandle::from(reader.counter()));
        assert!(err.is_none());
        assert_eq!(source.kind(), SourceKind::Offset);

        let mut buf = [0u8; 250];
        reader.read_exact(&mut buf).unwrap();
        assert!(source.status().ends_with(" 25.00%"));

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert!(source.status().ends_with("100.00%"));
        assert_eq!(reader.counter().get(), 1000);
    }
}
