//! Daily File Sink - time-based rotation at a fixed local time of day
//!
//! Each day at `rotation_hour:rotation_minute` the sink switches to a new
//! file named by its [`FilenameCalculator`]. Previous files stay on disk
//! under their own names; nothing is renamed or deleted.
//!
//! # File Layout
//!
//! ```text
//! logs/
//! ├── app_2025-01-14_00-00.txt
//! ├── app_2025-01-15_00-00.txt
//! └── app_2025-01-16_00-00.txt   # live
//! ```
//!
//! # Rotation
//!
//! The deadline is checked on every `accept` but recomputed only when a
//! rotation fires. The old file is flushed, the new one opened truncated,
//! and only then are the handles swapped. If any step fails the previous
//! handle and deadline stay in place and the next `accept` tries again.

mod filename;
mod schedule;

use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::common::{
    LogSink, MetricsSnapshot, Result, RotationOp, SinkError, SinkMetrics, flush_handle,
    write_handle,
};
use crate::lock::{LockPolicy, MultiThreaded, SingleThreaded, SinkLock};
use crate::util::{FileHandle, PathSpec};

pub use filename::{DateOnlyFilename, FilenameCalculator, TimestampedFilename};
pub use schedule::{Clock, RotationTime, SystemClock};

/// Extension used when the filename has none
pub const DEFAULT_EXTENSION: &str = "txt";

/// Daily file sink safe for concurrent callers
pub type DailyFileSinkMt<C = TimestampedFilename> = DailyFileSink<MultiThreaded, C>;

/// Daily file sink for a single thread
pub type DailyFileSinkSt<C = TimestampedFilename> = DailyFileSink<SingleThreaded, C>;

/// State guarded by the sink's lock
struct DailyState {
    file: FileHandle,
    deadline: DateTime<Local>,
}

/// Sink switching to a new file once a day
pub struct DailyFileSink<P: LockPolicy = MultiThreaded, C: FilenameCalculator = TimestampedFilename>
{
    spec: PathSpec,
    rotation: RotationTime,
    calculator: C,
    clock: Arc<dyn Clock>,
    state: P::Lock<DailyState>,
    metrics: SinkMetrics,
    _policy: PhantomData<P>,
}

impl<P: LockPolicy, C: FilenameCalculator + Default> DailyFileSink<P, C> {
    /// Create a sink for `filename`, split into base name and extension
    ///
    /// A filename without extension gets `.txt`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::InvalidRotationTime`] for an hour above 23 or a
    /// minute above 59 (no file is opened), or [`SinkError::Open`].
    pub fn new(filename: &str, rotation_hour: u32, rotation_minute: u32) -> Result<Self> {
        let rotation = RotationTime::new(rotation_hour, rotation_minute)?;
        Self::with_options(
            PathSpec::from_filename(filename, DEFAULT_EXTENSION),
            rotation,
            C::default(),
            Arc::new(SystemClock),
        )
    }

    /// Create a sink from an explicit base name and extension (no leading dot)
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_base(
        base: impl Into<String>,
        extension: impl Into<String>,
        rotation_hour: u32,
        rotation_minute: u32,
    ) -> Result<Self> {
        let rotation = RotationTime::new(rotation_hour, rotation_minute)?;
        Self::with_options(
            PathSpec::new(base, extension),
            rotation,
            C::default(),
            Arc::new(SystemClock),
        )
    }
}

impl<P: LockPolicy, C: FilenameCalculator> DailyFileSink<P, C> {
    /// Create a sink with an explicit filename calculator and clock
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the first file cannot be opened.
    pub fn with_options(
        spec: PathSpec,
        rotation: RotationTime,
        calculator: C,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let now = clock.now();
        let deadline = rotation.next_after(&now);
        let path = calculator.calc_filename(spec.base(), spec.extension(), &now);
        let file = FileHandle::open(&path, false).map_err(|e| SinkError::open(&path, e))?;

        tracing::debug!(
            path = %path.display(),
            rotation = %rotation,
            deadline = %deadline,
            "daily file sink opened"
        );

        Ok(Self {
            spec,
            rotation,
            calculator,
            clock,
            state: SinkLock::new(DailyState { file, deadline }),
            metrics: SinkMetrics::new(),
            _policy: PhantomData,
        })
    }

    /// Base name and extension the file names are derived from
    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }

    /// Configured time of day
    pub fn rotation_time(&self) -> RotationTime {
        self.rotation
    }

    /// Next instant at or after which `accept` switches files
    pub fn rotation_deadline(&self) -> DateTime<Local> {
        self.state.lock().deadline
    }

    /// Path of the live file
    pub fn current_path(&self) -> PathBuf {
        self.state.lock().file.path().to_path_buf()
    }

    /// Get snapshot of metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Switch to the file for `now` and schedule the next rotation
    fn rotate(&self, state: &mut DailyState, now: &DateTime<Local>) -> Result<()> {
        let old_path = state.file.path().to_path_buf();
        let new_path = self
            .calculator
            .calc_filename(self.spec.base(), self.spec.extension(), now);

        // Same name (e.g. date-only names with a mid-day rotation): keep writing
        if new_path != old_path {
            state
                .file
                .flush()
                .map_err(|e| self.rotation_failed(RotationOp::Close, &old_path, &new_path, e))?;
            let file = FileHandle::open(&new_path, true)
                .map_err(|e| self.rotation_failed(RotationOp::Open, &old_path, &new_path, e))?;
            // Old handle is dropped (and closed) here
            state.file = file;
        }

        state.deadline = self.rotation.next_after(now);
        self.metrics.rotation();

        tracing::info!(
            old_path = %old_path.display(),
            new_path = %new_path.display(),
            deadline = %state.deadline,
            "daily file rotation completed"
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
            "daily file rotation failed"
        );
        SinkError::rotation(op, from, to, source)
    }
}

impl<P: LockPolicy, C: FilenameCalculator> LogSink for DailyFileSink<P, C> {
    fn accept(&self, record: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let state = &mut *state;

        let now = self.clock.now();
        if now >= state.deadline {
            self.rotate(state, &now)?;
        }

        write_handle(&mut state.file, record, &self.metrics)
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        flush_handle(&mut state.file, &self.metrics)
    }
}

#[cfg(test)]
#[path = "daily_test.rs"]
mod daily_test;
