//! File sink configuration
//!
//! TOML-based sink configuration with sensible defaults. The sink kind is
//! selected by the `type` key; every other field falls back to its default.
//!
//! # Example
//!
//! ```toml
//! [sinks.audit]
//! type = "simple"
//! path = "logs/audit.log"
//! force_flush = true
//!
//! [sinks.app]
//! type = "rotating"
//! path = "logs/app.log"
//! max_size = 1048576
//! max_files = 3
//!
//! [sinks.events]
//! type = "daily"
//! path = "logs/events.txt"
//! rotation_hour = 2
//! filename = "date_only"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::common::{LogSink, Result, SinkError};
use crate::daily::{DailyFileSink, DateOnlyFilename, RotationTime, TimestampedFilename};
use crate::lock::{MultiThreaded, SingleThreaded};
use crate::rotating::{self, RotatingFileSink};
use crate::simple::SimpleFileSink;
use crate::util::PathSpec;

/// Default size threshold for rotating sinks (10 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of rotated files kept
pub const DEFAULT_MAX_FILES: usize = 5;

/// Thread-safe sink built from configuration
pub type BoxedSink = Box<dyn LogSink + Send + Sync>;

/// Single-threaded sink built from configuration
pub type BoxedLocalSink = Box<dyn LogSink + Send>;

/// Named file sink instances
///
/// ```toml
/// [sinks.app]
/// type = "rotating"
/// path = "logs/app.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSinksConfig {
    /// Named sink instances
    sinks: HashMap<String, FileSinkConfig>,
}

impl FileSinksConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid TOML, or any
    /// sink fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| SinkError::config_read(path, e))?;
        Self::from_str(&contents)
    }

    /// Get a sink by name
    pub fn get(&self, name: &str) -> Option<&FileSinkConfig> {
        self.sinks.get(name)
    }

    /// Iterate over all sinks
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileSinkConfig)> {
        self.sinks.iter()
    }

    /// Get the number of configured sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if no sinks are configured
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn validate(&self) -> Result<()> {
        for (name, sink) in &self.sinks {
            sink.validate()
                .map_err(|e| SinkError::config(format!("sink '{name}': {e}")))?;
        }
        Ok(())
    }
}

impl FromStr for FileSinksConfig {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for a single file sink
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileSinkConfig {
    /// Append to one file
    Simple(SimpleSinkConfig),

    /// Size-based rotation with numbered backups
    Rotating(RotatingSinkConfig),

    /// New file once a day
    Daily(DailySinkConfig),
}

impl FileSinkConfig {
    /// Load a single sink configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| SinkError::config_read(path, e))?;
        Self::from_str(&contents)
    }

    /// Get the sink type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Rotating(_) => "rotating",
            Self::Daily(_) => "daily",
        }
    }

    /// Validate field values
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Config`] for an empty path or a zero `max_size`,
    /// [`SinkError::InvalidRotationTime`] for an out-of-range rotation time.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Simple(c) => {
                if c.path.as_os_str().is_empty() {
                    return Err(SinkError::config("simple sink requires 'path'"));
                }
            }
            Self::Rotating(c) => {
                if c.path.is_empty() && c.base.is_none() {
                    return Err(SinkError::config("rotating sink requires 'path' or 'base'"));
                }
                if c.max_size == 0 {
                    return Err(SinkError::config("'max_size' must be greater than 0"));
                }
            }
            Self::Daily(c) => {
                if c.path.is_empty() {
                    return Err(SinkError::config("daily sink requires 'path'"));
                }
                RotationTime::new(c.rotation_hour, c.rotation_minute)?;
            }
        }
        Ok(())
    }

    /// Open the configured sink behind a mutex
    ///
    /// # Errors
    ///
    /// Returns error if validation fails or the live file cannot be opened.
    pub fn build(&self) -> Result<BoxedSink> {
        self.validate()?;
        let sink: BoxedSink = match self {
            Self::Simple(c) => Box::new(
                SimpleFileSink::<MultiThreaded>::new(&c.path, c.truncate)?
                    .with_force_flush(c.force_flush),
            ),
            Self::Rotating(c) => Box::new(RotatingFileSink::<MultiThreaded>::with_spec(
                c.spec(),
                c.max_size,
                c.max_files,
            )?),
            Self::Daily(c) => match c.filename {
                DailyFilename::Timestamped => {
                    Box::new(DailyFileSink::<MultiThreaded, TimestampedFilename>::new(
                        &c.path,
                        c.rotation_hour,
                        c.rotation_minute,
                    )?)
                }
                DailyFilename::DateOnly => {
                    Box::new(DailyFileSink::<MultiThreaded, DateOnlyFilename>::new(
                        &c.path,
                        c.rotation_hour,
                        c.rotation_minute,
                    )?)
                }
            },
        };
        Ok(sink)
    }

    /// Open the configured sink without locking, for single-threaded use
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_single_threaded(&self) -> Result<BoxedLocalSink> {
        self.validate()?;
        let sink: BoxedLocalSink = match self {
            Self::Simple(c) => Box::new(
                SimpleFileSink::<SingleThreaded>::new(&c.path, c.truncate)?
                    .with_force_flush(c.force_flush),
            ),
            Self::Rotating(c) => Box::new(RotatingFileSink::<SingleThreaded>::with_spec(
                c.spec(),
                c.max_size,
                c.max_files,
            )?),
            Self::Daily(c) => match c.filename {
                DailyFilename::Timestamped => {
                    Box::new(DailyFileSink::<SingleThreaded, TimestampedFilename>::new(
                        &c.path,
                        c.rotation_hour,
                        c.rotation_minute,
                    )?)
                }
                DailyFilename::DateOnly => {
                    Box::new(DailyFileSink::<SingleThreaded, DateOnlyFilename>::new(
                        &c.path,
                        c.rotation_hour,
                        c.rotation_minute,
                    )?)
                }
            },
        };
        Ok(sink)
    }
}

impl FromStr for FileSinkConfig {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

/// Simple sink configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimpleSinkConfig {
    /// File to append to (used verbatim)
    pub path: PathBuf,

    /// Empty the file on open instead of appending
    pub truncate: bool,

    /// Flush after every record
    pub force_flush: bool,
}

/// Rotating sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RotatingSinkConfig {
    /// Live file name, split into base and extension (`.log` if missing)
    pub path: String,

    /// Explicit base name; overrides `path`
    pub base: Option<String>,

    /// Explicit extension without the dot, used with `base`
    pub extension: Option<String>,

    /// Rotate once the live file would exceed this many bytes
    pub max_size: u64,

    /// Number of rotated files kept besides the live one
    pub max_files: usize,
}

impl Default for RotatingSinkConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            base: None,
            extension: None,
            max_size: DEFAULT_MAX_SIZE,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl RotatingSinkConfig {
    /// Base name and extension the sink will use
    pub fn spec(&self) -> PathSpec {
        match &self.base {
            Some(base) => PathSpec::new(
                base.as_str(),
                self.extension.as_deref().unwrap_or(rotating::DEFAULT_EXTENSION),
            ),
            None => PathSpec::from_filename(&self.path, rotating::DEFAULT_EXTENSION),
        }
    }
}

/// Daily file naming scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyFilename {
    /// `base_YYYY-MM-DD_hh-mm.ext`
    #[default]
    Timestamped,

    /// `base_YYYY-MM-DD.ext`
    DateOnly,
}

/// Daily sink configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DailySinkConfig {
    /// File name, split into base and extension (`.txt` if missing)
    pub path: String,

    /// Local hour of the daily rotation (0-23)
    pub rotation_hour: u32,

    /// Minute of the daily rotation (0-59)
    pub rotation_minute: u32,

    /// Naming scheme for each day's file
    pub filename: DailyFilename,
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
