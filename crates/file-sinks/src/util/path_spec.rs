//! Base name + extension pair for rotating sinks

use std::fmt;
use std::path::PathBuf;

use super::file_handle::split_extension;

/// Base name and extension a rotating sink derives its file names from
///
/// Computed once at construction and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    base: String,
    extension: String,
}

impl PathSpec {
    /// Build from an explicit base name and extension (no leading dot)
    pub fn new(base: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            extension: extension.into(),
        }
    }

    /// Split a user-supplied filename at the last `.` after the last separator
    ///
    /// Without such a dot the whole filename becomes the base and
    /// `default_extension` is used.
    pub fn from_filename(filename: &str, default_extension: &str) -> Self {
        match split_extension(filename) {
            (base, "") => Self::new(base, default_extension),
            (base, ext) => Self::new(base, &ext[1..]),
        }
    }

    /// Base name, including any directory part
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Extension without the leading dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `base.ext`
    pub fn path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.base, self.extension))
    }

    /// `base.ext` for index 0, `base.{index}.ext` otherwise
    pub fn indexed(&self, index: usize) -> PathBuf {
        if index == 0 {
            self.path()
        } else {
            PathBuf::from(format!("{}.{}.{}", self.base, index, self.extension))
        }
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base, self.extension)
    }
}

#[cfg(test)]
#[path = "path_spec_test.rs"]
mod path_spec_test;
