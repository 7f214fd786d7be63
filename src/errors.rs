//! Error type shared by every filesystem backend.
//!
//! There is one failure kind: an I/O failure tagged with the operation and
//! path that produced it. The message is built from the OS error code with a
//! short actionable hint for the common codes, so callers and logs get
//! something better than a bare `os error 2`.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A failed filesystem operation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FsError {
    operation: &'static str,
    path: PathBuf,
    message: String,
    #[source]
    source: io::Error,
}

impl FsError {
    /// Wrap `source` with the operation and path it came from.
    pub fn new(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        let message = build_message(operation, &path, &source);
        Self {
            operation,
            path,
            message,
            source,
        }
    }

    /// Translate an explicit OS error code.
    pub fn from_errno(code: i32, operation: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::new(operation, path, io::Error::from_raw_os_error(code))
    }

    /// Translate the calling thread's current `errno`.
    ///
    /// Call this immediately after the failing native call; anything in
    /// between may overwrite the code.
    pub fn last_os_error(operation: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::new(operation, path, io::Error::last_os_error())
    }

    /// The path cannot be handed to libc (it contains a NUL byte).
    pub fn invalid_path(operation: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::new(
            operation,
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path contains an interior NUL byte"),
        )
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    pub fn raw_os_error(&self) -> Option<i32> {
        self.source.raw_os_error()
    }

    pub fn into_io(self) -> io::Error {
        self.source
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        io::Error::new(err.kind(), err.message)
    }
}

/// Format "op 'path': description" plus a hint and the raw code when known.
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        if let Some(hint) = hint_for_code(code) {
            msg.push_str("; ");
            msg.push_str(hint);
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        // No OS code (synthesized errors, short reads): hint by kind.
        let hint = match e.kind() {
            io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and mode bits."),
            io::ErrorKind::NotFound => Some("path not found; verify it exists."),
            io::ErrorKind::AlreadyExists => Some("already exists; remove it or choose another name."),
            io::ErrorKind::InvalidInput => Some("invalid argument."),
            io::ErrorKind::UnexpectedEof => Some("stream ended early."),
            _ => None,
        };
        if let Some(hint) = hint {
            msg.push_str("; ");
            msg.push_str(hint);
        }
    }

    msg
}

fn hint_for_code(code: i32) -> Option<&'static str> {
    let hint = match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership and mode bits.",
        libc::ENOENT => "path not found; verify it and its parent exist.",
        libc::EEXIST => "already exists; remove it or choose another name.",
        libc::EXDEV => "cross-filesystem; atomic rename not possible.",
        libc::ENOTEMPTY => "directory not empty.",
        libc::ENOTDIR => "a path component is not a directory.",
        libc::EISDIR => "is a directory.",
        libc::EBUSY => "resource busy.",
        libc::ENOSPC => "insufficient space on device.",
        libc::EROFS => "read-only filesystem; cannot write here.",
        libc::ELOOP => "too many symbolic link levels (ELOOP); possible symlink cycle.",
        libc::ENAMETOOLONG => "filename or path too long; shorten path segments.",
        libc::EMFILE => "process file descriptor limit reached; close files or raise limits.",
        libc::ENFILE => "system-wide file table overflow; reduce open files.",
        _ => return None,
    };
    Some(hint)
}
