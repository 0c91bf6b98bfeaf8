//! File-system utilities shared by the file sinks
//!
//! - **file_handle**: buffered owned file handle, exists/remove/rename/split helpers and
//!   the [`FileSystem`] seam used by rotation
//! - **path_spec**: base name + extension pair used to derive rotated file names

pub mod file_handle;
pub mod path_spec;

pub use file_handle::{
    DEFAULT_BUFFER_SIZE, FileHandle, FileSystem, OsFileSystem, file_exists, remove, rename,
    split_extension,
};
pub use path_spec::PathSpec;
