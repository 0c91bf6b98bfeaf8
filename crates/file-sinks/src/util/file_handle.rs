//! Buffered file handle and path helpers
//!
//! `FileHandle` owns at most one open file. Writes go through a `BufWriter`
//! the way stdio buffers a `FILE*`; `flush` hands them to the OS. Closing
//! flushes first so buffered bytes are never silently dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default write buffer size (8KB, matches stdio `BUFSIZ`)
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Owned handle to a single log file
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileHandle {
    /// Open `path` for writing, creating it and any missing parent directories
    ///
    /// With `truncate` the file is cleared, otherwise writes append.
    pub fn open(path: impl Into<PathBuf>, truncate: bool) -> io::Result<Self> {
        let path = path.into();
        let writer = open_writer(&path, truncate)?;
        Ok(Self {
            path,
            writer: Some(writer),
        })
    }

    /// Close the current file (if open) and open the same path again
    pub fn reopen(&mut self, truncate: bool) -> io::Result<()> {
        self.close()?;
        self.writer = Some(open_writer(&self.path, truncate)?);
        Ok(())
    }

    /// Write all of `bytes`
    pub fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(bytes),
            None => Err(closed_error(&self.path)),
        }
    }

    /// Push buffered bytes to the OS; a closed handle has nothing to flush
    pub fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Current size in bytes, counting bytes still in the write buffer
    ///
    /// Stats the file, so keep it off the hot path.
    pub fn size(&self) -> io::Result<u64> {
        match self.writer.as_ref() {
            Some(writer) => {
                let on_disk = writer.get_ref().metadata()?.len();
                Ok(on_disk + writer.buffer().len() as u64)
            }
            None => Err(closed_error(&self.path)),
        }
    }

    /// Flush and close the file. Closing a closed handle is a no-op.
    ///
    /// The handle is released even if the final flush fails.
    pub fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Whether a file is currently open
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Path of the file this handle targets
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(path = %self.path.display(), error = %e, "flush on close failed");
        }
    }
}

fn open_writer(path: &Path, truncate: bool) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }

    let file = options.open(path)?;
    Ok(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file))
}

fn closed_error(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotConnected,
        format!("file handle for '{}' is closed", path.display()),
    )
}

/// Whether `path` exists on disk
pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

/// Delete the file at `path`
pub fn remove(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

/// Rename `from` to `to`
pub fn rename(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// File-system operations the size-rotation cascade runs
///
/// [`OsFileSystem`] forwards to the free functions above; tests substitute
/// their own to fail individual steps.
pub trait FileSystem: Send + Sync {
    /// Whether `path` exists
    fn exists(&self, path: &Path) -> bool;

    /// Delete the file at `path`
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Rename `from` to `to`
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    #[inline]
    fn exists(&self, path: &Path) -> bool {
        file_exists(path)
    }

    #[inline]
    fn remove(&self, path: &Path) -> io::Result<()> {
        remove(path)
    }

    #[inline]
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        rename(from, to)
    }
}

/// Split a path into `(stem, extension)` at the last `.` after the last separator
///
/// The returned extension keeps its leading dot (`"logs/app.txt"` gives
/// `("logs/app", ".txt")`); when there is none it is empty. A leading dot in
/// the file name (`".hidden"`) is not treated as an extension separator.
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);

    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = name_start + dot;
            (&path[..dot], &path[dot..])
        }
        _ => (path, ""),
    }
}

#[cfg(test)]
#[path = "file_handle_test.rs"]
mod file_handle_test;
