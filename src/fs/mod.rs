//! The filesystem contract every backend implements.
//!
//! Backends provide the primitive operations; the composed ones (`copy`,
//! `copy_atomically`, `create_directories`, `delete_recursively`,
//! `list_recursively`, `exists`) come with default bodies built only on
//! those primitives, so any backend gets them for free.

pub mod fallback;
mod metadata;
pub(crate) mod util;

pub use metadata::Metadata;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::FsError;

/// A write stream whose final close can still fail (deferred write-back,
/// full device). Dropping one closes it too, but silently.
pub trait FileSink: Write + Send {
    /// Flush and release the stream, reporting any failure.
    fn close(self) -> Result<(), FsError>;
}

/// Uniform file and directory operations.
///
/// Every call is synchronous and blocks for the duration of the underlying
/// OS work. Paths are never retained beyond a single call.
pub trait FileSystem: Send + Sync {
    /// Stream returned by [`source`](Self::source).
    type Source: Read + Send;
    /// Stream returned by [`sink`](Self::sink) and [`appending_sink`](Self::appending_sink).
    type Sink: FileSink;

    /// The current working directory.
    fn base_directory(&self) -> Result<PathBuf, FsError>;

    /// Where scratch files go. Never fails.
    fn temporary_directory(&self) -> PathBuf;

    /// Children of `dir` (no `.`/`..`), in backend order.
    ///
    /// # Errors
    ///
    /// The directory is missing or unreadable, or enumeration fails midway.
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, FsError>;

    /// Like [`list`](Self::list), but `Ok(None)` if `dir` can't be opened.
    fn list_or_none(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>, FsError>;

    /// Open `file` for reading.
    fn source(&self, file: &Path) -> Result<Self::Source, FsError>;

    /// Open `file` for writing, creating or truncating it.
    fn sink(&self, file: &Path) -> Result<Self::Sink, FsError>;

    /// Open `file` for writing at its end, creating it if needed.
    fn appending_sink(&self, file: &Path) -> Result<Self::Sink, FsError>;

    /// Create a single directory. Fails if it already exists or the parent is missing.
    fn create_directory(&self, dir: &Path) -> Result<(), FsError>;

    /// Rename `source` to `target` atomically. No copy fallback.
    fn atomic_move(&self, source: &Path, target: &Path) -> Result<(), FsError>;

    /// Remove a file or an empty directory.
    fn delete(&self, path: &Path) -> Result<(), FsError>;

    /// Metadata of `path` without following a final symlink; `Ok(None)` if absent.
    fn metadata_or_none(&self, path: &Path) -> Result<Option<Metadata>, FsError>;

    /// Absolute path with `.`, `..` and symlinks resolved. `path` must exist.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError>;

    /// Create a symlink at `source` pointing to `target`.
    fn create_symlink(&self, source: &Path, target: &Path) -> Result<(), FsError>;

    /// Copy the bytes of `source` to `target`; returns the byte count.
    ///
    /// Not atomic: a failure partway leaves `target` partially written.
    fn copy(&self, source: &Path, target: &Path) -> Result<u64, FsError> {
        fallback::copy(self, source, target)
    }

    /// Copy through a temp sibling of `target`, then rename it into place.
    fn copy_atomically(&self, source: &Path, target: &Path) -> Result<u64, FsError> {
        fallback::copy_atomically(self, source, target)
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        Ok(self.metadata_or_none(path)?.is_some())
    }

    /// Create `dir` and any missing ancestors. Succeeds if `dir` already exists.
    fn create_directories(&self, dir: &Path) -> Result<(), FsError> {
        fallback::create_directories(self, dir)
    }

    /// Delete `path` and, for a directory, everything below it. Symlinks are
    /// removed, not followed.
    fn delete_recursively(&self, path: &Path) -> Result<(), FsError> {
        fallback::delete_recursively(self, path)
    }

    /// All descendants of `dir`, parents before children.
    fn list_recursively(&self, dir: &Path) -> Result<Vec<PathBuf>, FsError> {
        fallback::list_recursively(self, dir)
    }
}
