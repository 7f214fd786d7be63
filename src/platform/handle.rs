//! Owning wrappers around stdio `FILE*` streams.
//!
//! `Source` reads, `Sink` writes. Each owns its stream exclusively and closes
//! it exactly once: explicitly through `close()` (which reports `fclose`
//! failures) or implicitly on drop (which ignores them).

use std::io::{self, Read, Write};
use std::mem;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use libc::FILE;
use tracing::trace;

use super::cstr::path_to_cstring;
use super::errno::{clear_errno, errno};
use crate::errors::FsError;
use crate::fs::FileSink;

/// `fopen` mode for a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    /// Create or truncate (`"w"`).
    Truncate,
    /// Create or append (`"a"`).
    Append,
}

#[derive(Debug)]
struct NativeFile(NonNull<FILE>);

// stdio streams lock internally; moving one to another thread is fine.
unsafe impl Send for NativeFile {}

impl NativeFile {
    fn open(operation: &'static str, path: &Path, mode: &std::ffi::CStr) -> Result<Self, FsError> {
        let c_path = path_to_cstring(operation, path)?;
        // SAFETY: both arguments are valid NUL-terminated strings.
        let file = unsafe { libc::fopen(c_path.as_ptr(), mode.as_ptr()) };
        match NonNull::new(file) {
            Some(file) => Ok(Self(file)),
            None => Err(FsError::last_os_error(operation, path)),
        }
    }

    fn as_ptr(&self) -> *mut FILE {
        self.0.as_ptr()
    }

    fn close(self) -> io::Result<()> {
        let file = self.0;
        mem::forget(self);
        // SAFETY: `file` is open and no longer reachable through `self`.
        if unsafe { libc::fclose(file.as_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for NativeFile {
    fn drop(&mut self) {
        // SAFETY: the stream is open and owned by us; errors cannot be reported here.
        let _ = unsafe { libc::fclose(self.0.as_ptr()) };
    }
}

/// Capture `errno` after a short stdio transfer, then clear the stream's
/// error flag so a later call starts clean.
///
/// When the short transfer still moved bytes, callers return those bytes
/// and park this error for the next call: an `Err` must mean nothing moved.
fn stream_error(file: &NativeFile) -> io::Error {
    let code = errno();
    // SAFETY: stream is open.
    unsafe { libc::clearerr(file.as_ptr()) };
    if code == 0 {
        io::Error::other("stdio stream error")
    } else {
        io::Error::from_raw_os_error(code)
    }
}

/// A file opened for reading.
#[derive(Debug)]
pub struct Source {
    file: NativeFile,
    path: PathBuf,
    pending: Option<io::Error>,
}

impl Source {
    pub(crate) fn open(path: &Path) -> Result<Self, FsError> {
        let file = NativeFile::open("source", path, c"r")?;
        trace!(path = %path.display(), "opened source");
        Ok(Self {
            file,
            path: path.to_path_buf(),
            pending: None,
        })
    }

    /// The path this stream was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the stream, reporting a failing `fclose`.
    pub fn close(self) -> Result<(), FsError> {
        let path = self.path;
        self.file.close().map_err(|e| FsError::new("close", path, e))
    }
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        clear_errno();
        // SAFETY: `buf` is valid for `buf.len()` bytes and the stream is open.
        let n = unsafe { libc::fread(buf.as_mut_ptr().cast(), 1, buf.len(), self.file.as_ptr()) };
        if n < buf.len() && unsafe { libc::ferror(self.file.as_ptr()) } != 0 {
            let err = stream_error(&self.file);
            if n == 0 {
                return Err(err);
            }
            self.pending = Some(err);
        }
        Ok(n)
    }
}

/// A file opened for writing.
#[derive(Debug)]
pub struct Sink {
    file: NativeFile,
    path: PathBuf,
    pending: Option<io::Error>,
}

impl Sink {
    pub(crate) fn open(path: &Path, mode: SinkMode) -> Result<Self, FsError> {
        let (operation, fmode) = match mode {
            SinkMode::Truncate => ("sink", c"w"),
            SinkMode::Append => ("appending_sink", c"a"),
        };
        let file = NativeFile::open(operation, path, fmode)?;
        trace!(path = %path.display(), ?mode, "opened sink");
        Ok(Self {
            file,
            path: path.to_path_buf(),
            pending: None,
        })
    }

    /// The path this stream writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered bytes and close, reporting either failure.
    pub fn close(self) -> Result<(), FsError> {
        let Self { file, path, pending } = self;
        if let Some(err) = pending {
            drop(file);
            return Err(FsError::new("close", path, err));
        }
        file.close().map_err(|e| FsError::new("close", path, e))
    }
}

impl FileSink for Sink {
    fn close(self) -> Result<(), FsError> {
        Sink::close(self)
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        clear_errno();
        // SAFETY: `buf` is valid for `buf.len()` bytes and the stream is open.
        let n = unsafe { libc::fwrite(buf.as_ptr().cast(), 1, buf.len(), self.file.as_ptr()) };
        if n < buf.len() {
            let err = stream_error(&self.file);
            if n == 0 {
                return Err(err);
            }
            self.pending = Some(err);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        clear_errno();
        // SAFETY: stream is open.
        if unsafe { libc::fflush(self.file.as_ptr()) } != 0 {
            return Err(stream_error(&self.file));
        }
        Ok(())
    }
}
