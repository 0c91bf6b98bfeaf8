//! Common types and utilities for file sinks
//!
//! The two-operation sink contract, the error taxonomy and the per-sink
//! counters shared by the simple, rotating and daily sinks.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::util::FileHandle;

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Contract shared by every file sink
///
/// Both operations run entirely inside the sink's lock policy, including any
/// rotation work, so callers never observe a half-rotated file set.
pub trait LogSink {
    /// Append an already-formatted record to the live file
    ///
    /// # Errors
    ///
    /// Returns an error if rotation or the write itself fails.
    fn accept(&self, record: &[u8]) -> Result<()>;

    /// Flush buffered bytes of the live file to the OS
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&self) -> Result<()>;
}

/// Metrics shared by all sink types
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Total records written
    pub records_written: AtomicU64,

    /// Total bytes written
    pub bytes_written: AtomicU64,

    /// Write errors encountered
    pub write_errors: AtomicU64,

    /// Flush operations performed
    pub flush_count: AtomicU64,

    /// Rotations completed
    pub rotations: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            flush_count: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
        }
    }

    /// Record a successfully written record
    #[inline]
    pub fn record_written(&self, bytes: u64) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a failed write, flush or rotation
    #[inline]
    pub fn write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a flush operation
    #[inline]
    pub fn flush(&self) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed rotation
    #[inline]
    pub fn rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_written: self.records_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            flush_count: self.flush_count.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub flush_count: u64,
    pub rotations: u64,
}

/// File-system step that failed while rotating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOp {
    /// Closing the live file before the rename cascade
    Close,
    /// Removing a backup that is about to be overwritten
    Remove,
    /// Shifting a file to the next index
    Rename,
    /// Reopening the live file with truncation
    Reopen,
    /// Opening the next daily file
    Open,
}

impl RotationOp {
    /// Short name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Remove => "remove",
            Self::Rename => "rename",
            Self::Reopen => "reopen",
            Self::Open => "open",
        }
    }
}

impl fmt::Display for RotationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by file sinks
#[derive(Debug, Error)]
pub enum SinkError {
    /// The live file could not be opened at construction
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Daily rotation hour/minute out of range
    #[error("invalid rotation time {hour:02}:{minute:02} (hour must be 0-23, minute 0-59)")]
    InvalidRotationTime { hour: u32, minute: u32 },

    /// Write to the live file failed
    #[error("write to '{}' failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Flush of the live file failed
    #[error("flush of '{}' failed: {source}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rotation step failed; the file set may be partially shifted
    #[error("rotation {op} failed ('{}' -> '{}'): {source}", from.display(), to.display())]
    Rotation {
        op: RotationOp,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file could not be read
    #[error("failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to parse TOML configuration
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SinkError {
    /// Create an open error
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Create a rotation error
    pub fn rotation(
        op: RotationOp,
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Rotation {
            op,
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Create a config file read error
    pub fn config_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// OS error code of the underlying I/O failure, if any
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Self::Open { source, .. }
            | Self::Write { source, .. }
            | Self::Flush { source, .. }
            | Self::Rotation { source, .. }
            | Self::ConfigRead { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

/// Write a record to a live handle, recording the outcome in `metrics`
pub(crate) fn write_handle(
    file: &mut FileHandle,
    record: &[u8],
    metrics: &SinkMetrics,
) -> Result<()> {
    match file.write(record) {
        Ok(()) => {
            metrics.record_written(record.len() as u64);
            Ok(())
        }
        Err(source) => {
            metrics.write_error();
            Err(SinkError::Write {
                path: file.path().to_path_buf(),
                source,
            })
        }
    }
}

/// Flush a live handle, recording the outcome in `metrics`
pub(crate) fn flush_handle(file: &mut FileHandle, metrics: &SinkMetrics) -> Result<()> {
    match file.flush() {
        Ok(()) => {
            metrics.flush();
            Ok(())
        }
        Err(source) => {
            metrics.write_error();
            Err(SinkError::Flush {
                path: file.path().to_path_buf(),
                source,
            })
        }
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
