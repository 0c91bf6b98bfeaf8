//! Simple File Sink - a single target file, no rotation
//!
//! Every record is appended to one file. With `force_flush` set, each record
//! is flushed to the OS right after it is written.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::{
    LogSink, MetricsSnapshot, Result, SinkError, SinkMetrics, flush_handle, write_handle,
};
use crate::lock::{LockPolicy, MultiThreaded, SingleThreaded, SinkLock};
use crate::util::FileHandle;

/// Simple file sink safe for concurrent callers
pub type SimpleFileSinkMt = SimpleFileSink<MultiThreaded>;

/// Simple file sink for a single thread
pub type SimpleFileSinkSt = SimpleFileSink<SingleThreaded>;

/// Sink writing every record to one file
pub struct SimpleFileSink<P: LockPolicy = MultiThreaded> {
    file: P::Lock<FileHandle>,
    path: PathBuf,
    force_flush: AtomicBool,
    metrics: SinkMetrics,
    _policy: PhantomData<P>,
}

impl<P: LockPolicy> SimpleFileSink<P> {
    /// Open `path`, clearing it when `truncate` is set and appending otherwise
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>, truncate: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = FileHandle::open(&path, truncate).map_err(|e| SinkError::open(&path, e))?;

        tracing::debug!(path = %path.display(), truncate, "simple file sink opened");

        Ok(Self {
            file: SinkLock::new(file),
            path,
            force_flush: AtomicBool::new(false),
            metrics: SinkMetrics::new(),
            _policy: PhantomData,
        })
    }

    /// Builder-style variant of [`set_force_flush`](Self::set_force_flush)
    #[must_use]
    pub fn with_force_flush(self, force_flush: bool) -> Self {
        self.set_force_flush(force_flush);
        self
    }

    /// Flush after every record when set
    pub fn set_force_flush(&self, force_flush: bool) {
        self.force_flush.store(force_flush, Ordering::Relaxed);
    }

    /// Whether every record is flushed after it is written
    pub fn force_flush(&self) -> bool {
        self.force_flush.load(Ordering::Relaxed)
    }

    /// Target file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get snapshot of metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<P: LockPolicy> LogSink for SimpleFileSink<P> {
    fn accept(&self, record: &[u8]) -> Result<()> {
        let mut file = self.file.lock();
        write_handle(&mut *file, record, &self.metrics)?;
        if self.force_flush() {
            flush_handle(&mut *file, &self.metrics)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut file = self.file.lock();
        flush_handle(&mut *file, &self.metrics)
    }
}
