//! Rotating File Sink - size-based rotation with a fixed number of backups
//!
//! Records are appended to `base.ext` until the running byte count would
//! exceed `max_size`. The file set is then shifted and the record that
//! crossed the threshold starts a fresh `base.ext`.
//!
//! # File Layout
//!
//! ```text
//! logs/
//! ├── app.log      # live file (index 0)
//! ├── app.1.log    # newest backup
//! ├── app.2.log
//! └── app.3.log    # oldest backup (max_files = 3), evicted on next rotation
//! ```
//!
//! # Rotation
//!
//! ```text
//! close app.log
//! app.3.log -> delete
//! app.2.log -> app.3.log
//! app.1.log -> app.2.log
//! app.log   -> app.1.log
//! reopen app.log (truncated)
//! ```
//!
//! Indices are walked from `max_files` down to 1 so no backup is overwritten
//! before it has been evicted or shifted. A failed step aborts rotation and
//! leaves the set partially shifted; the size counter stays above the limit
//! so the next `accept` runs the same rotation again.

use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::{
    LogSink, MetricsSnapshot, Result, RotationOp, SinkError, SinkMetrics, flush_handle,
    write_handle,
};
use crate::lock::{LockPolicy, MultiThreaded, SingleThreaded, SinkLock};
use crate::util::{FileHandle, FileSystem, OsFileSystem, PathSpec};

/// Extension used when the filename has none
pub const DEFAULT_EXTENSION: &str = "log";

/// Rotating file sink safe for concurrent callers
pub type RotatingFileSinkMt = RotatingFileSink<MultiThreaded>;

/// Rotating file sink for a single thread
pub type RotatingFileSinkSt = RotatingFileSink<SingleThreaded>;

/// State guarded by the sink's lock
struct RotatingState {
    file: FileHandle,
    /// Bytes written to the live file since it was last (re)opened.
    /// Seeded from disk once at construction, never re-synced.
    current_size: u64,
}

/// Sink rotating `base.ext` by size, keeping `max_files` backups
pub struct RotatingFileSink<P: LockPolicy = MultiThreaded> {
    spec: PathSpec,
    max_size: u64,
    max_files: usize,
    state: P::Lock<RotatingState>,
    fs: Arc<dyn FileSystem>,
    metrics: SinkMetrics,
    _policy: PhantomData<P>,
}

impl<P: LockPolicy> RotatingFileSink<P> {
    /// Create a sink for `filename`, split into base name and extension
    ///
    /// `"logs/app.txt"` rotates through `logs/app.1.txt`, `logs/app.2.txt`, ...;
    /// a filename without extension gets `.log`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the live file cannot be opened or sized.
    pub fn new(filename: &str, max_size: u64, max_files: usize) -> Result<Self> {
        Self::with_spec(
            PathSpec::from_filename(filename, DEFAULT_EXTENSION),
            max_size,
            max_files,
        )
    }

    /// Create a sink from an explicit base name and extension (no leading dot)
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the live file cannot be opened or sized.
    pub fn with_base(
        base: impl Into<String>,
        extension: impl Into<String>,
        max_size: u64,
        max_files: usize,
    ) -> Result<Self> {
        Self::with_spec(PathSpec::new(base, extension), max_size, max_files)
    }

    /// Create a sink from a prepared [`PathSpec`]
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the live file cannot be opened or sized.
    pub fn with_spec(spec: PathSpec, max_size: u64, max_files: usize) -> Result<Self> {
        Self::with_file_system(spec, max_size, max_files, Arc::new(OsFileSystem))
    }

    /// Create a sink whose rotation cascade runs through `fs`
    ///
    /// The live file itself is always opened on the real file system.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the live file cannot be opened or sized.
    pub fn with_file_system(
        spec: PathSpec,
        max_size: u64,
        max_files: usize,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let path = Self::calc_filename(&spec, 0);
        let file = FileHandle::open(&path, false).map_err(|e| SinkError::open(&path, e))?;
        let current_size = file.size().map_err(|e| SinkError::open(&path, e))?;

        tracing::debug!(
            path = %path.display(),
            current_size,
            max_size,
            max_files,
            "rotating file sink opened"
        );

        Ok(Self {
            spec,
            max_size,
            max_files,
            state: SinkLock::new(RotatingState { file, current_size }),
            fs,
            metrics: SinkMetrics::new(),
            _policy: PhantomData,
        })
    }

    /// `base.ext` for index 0, `base.{index}.ext` otherwise
    pub fn calc_filename(spec: &PathSpec, index: usize) -> PathBuf {
        spec.indexed(index)
    }

    /// Base name and extension of the file set
    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }

    /// Size threshold in bytes
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Number of backups kept
    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Bytes the sink believes the live file holds
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    /// Get snapshot of metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Close the live file, shift backups up by one, reopen a truncated live file
    fn rotate(&self, file: &mut FileHandle) -> Result<()> {
        let live = file.path().to_path_buf();
        file.close()
            .map_err(|e| self.rotation_failed(RotationOp::Close, &live, &live, e))?;

        for i in (1..=self.max_files).rev() {
            let src = Self::calc_filename(&self.spec, i - 1);
            let target = Self::calc_filename(&self.spec, i);

            if self.fs.exists(&target) {
                self.fs
                    .remove(&target)
                    .map_err(|e| self.rotation_failed(RotationOp::Remove, &src, &target, e))?;
            }
            if self.fs.exists(&src) {
                self.fs
                    .rename(&src, &target)
                    .map_err(|e| self.rotation_failed(RotationOp::Rename, &src, &target, e))?;
            }
        }

        file.reopen(true)
            .map_err(|e| self.rotation_failed(RotationOp::Reopen, &live, &live, e))?;

        self.metrics.rotation();
        tracing::info!(
            path = %live.display(),
            max_files = self.max_files,
            "file rotation completed"
        );
        Ok(())
    }

    fn rotation_failed(
        &self,
        op: RotationOp,
        from: &Path,
        to: &Path,
        source: io::Error,
    ) -> SinkError {
        self.metrics.write_error();
        tracing::warn!(
            op = %op,
            from = %from.display(),
            to = %to.display(),
            error = %source,
            "file rotation failed"
        );
        SinkError::rotation(op, from, to, source)
    }
}

impl<P: LockPolicy> LogSink for RotatingFileSink<P> {
    fn accept(&self, record: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let state = &mut *state;
        let len = record.len() as u64;

        state.current_size = state.current_size.saturating_add(len);
        if state.current_size > self.max_size {
            self.rotate(&mut state.file)?;
            state.current_size = len;
        }

        write_handle(&mut state.file, record, &self.metrics)
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        flush_handle(&mut state.file, &self.metrics)
    }
}
