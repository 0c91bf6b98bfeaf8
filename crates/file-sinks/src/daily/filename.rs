//! Daily file name calculators
//!
//! Pure functions of (base, extension, local time):
//!
//! | Calculator | Name |
//! |------------|------|
//! | [`TimestampedFilename`] (default) | `base_YYYY-MM-DD_hh-mm.ext` |
//! | [`DateOnlyFilename`] | `base_YYYY-MM-DD.ext` |

use std::path::PathBuf;

use chrono::{DateTime, Local};

/// Strategy naming the file that should be live at a given instant
pub trait FilenameCalculator: Send + Sync {
    /// File name for `base` / `extension` at local time `now`
    fn calc_filename(&self, base: &str, extension: &str, now: &DateTime<Local>) -> PathBuf;
}

/// `base_YYYY-MM-DD_hh-mm.ext`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampedFilename;

impl FilenameCalculator for TimestampedFilename {
    fn calc_filename(&self, base: &str, extension: &str, now: &DateTime<Local>) -> PathBuf {
        PathBuf::from(format!(
            "{base}_{}.{extension}",
            now.format("%Y-%m-%d_%H-%M")
        ))
    }
}

/// `base_YYYY-MM-DD.ext`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateOnlyFilename;

impl FilenameCalculator for DateOnlyFilename {
    fn calc_filename(&self, base: &str, extension: &str, now: &DateTime<Local>) -> PathBuf {
        PathBuf::from(format!("{base}_{}.{extension}", now.format("%Y-%m-%d")))
    }
}

impl<F> FilenameCalculator for F
where
    F: Fn(&str, &str, &DateTime<Local>) -> PathBuf + Send + Sync,
{
    fn calc_filename(&self, base: &str, extension: &str, now: &DateTime<Local>) -> PathBuf {
        self(base, extension, now)
    }
}

#[cfg(test)]
#[path = "filename_test.rs"]
mod filename_test;
