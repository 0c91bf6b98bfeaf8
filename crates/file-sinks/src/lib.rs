//! Tell - File Sinks
//!
//! File-backed log sinks that persist already-formatted records.
//!
//! # Architecture
//!
//! A sink owns one live file handle and appends each record to it. Rotating
//! sinks decide, under the same lock, whether the record must go to a fresh
//! file first. Formatting, level filtering and async dispatch happen upstream.
//!
//! ```text
//! [Logger] --&[u8]--> [LogSink::accept] --lock--> [rotate?] --> [FileHandle]
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Purpose | Uses Rotation |
//! |------|---------|---------------|
//! | `simple` | Append to one file | No |
//! | `rotating` | Size threshold, numbered backups `base.N.ext` | Yes |
//! | `daily` | Fixed local time of day, dated file names | Yes |
//!
//! Each sink takes a [`LockPolicy`]: [`MultiThreaded`] (the `*Mt` aliases)
//! or [`SingleThreaded`] (the `*St` aliases).
//!
//! # Example
//!
//! ```no_run
//! use tell_file_sinks::{LogSink, RotatingFileSinkMt};
//!
//! let sink = RotatingFileSinkMt::new("logs/app.log", 10 * 1024 * 1024, 3)?;
//! sink.accept(b"service started\n")?;
//! sink.flush()?;
//! # Ok::<(), tell_file_sinks::SinkError>(())
//! ```

// =============================================================================
// Sink implementations (each in its own submodule)
// =============================================================================

/// Simple file sink - append to a single file
pub mod simple;

/// Rotating file sink - size-based rotation with numbered backups
pub mod rotating;

/// Daily file sink - time-based rotation at a fixed local time
pub mod daily;

// =============================================================================
// Shared utilities
// =============================================================================

/// Lock policies (parking_lot mutex or no-op)
pub mod lock;

/// File-system utilities (file handle, base/extension split)
pub mod util;

/// TOML sink configuration
pub mod config;

/// Common types shared by all sinks (contract, errors, metrics)
mod common;

// =============================================================================
// Public re-exports
// =============================================================================

pub use common::{LogSink, MetricsSnapshot, Result, RotationOp, SinkError, SinkMetrics};
pub use lock::{LockPolicy, MultiThreaded, NullLock, SingleThreaded, SinkLock};
pub use util::{FileHandle, FileSystem, OsFileSystem, PathSpec};

// Re-export main sink types for convenience
pub use config::{FileSinkConfig, FileSinksConfig};
pub use daily::{
    Clock, DailyFileSink, DailyFileSinkMt, DailyFileSinkSt, DateOnlyFilename, FilenameCalculator,
    RotationTime, SystemClock, TimestampedFilename,
};
pub use rotating::{RotatingFileSink, RotatingFileSinkMt, RotatingFileSinkSt};
pub use simple::{SimpleFileSink, SimpleFileSinkMt, SimpleFileSinkSt};
