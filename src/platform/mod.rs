//! The POSIX backend and the libc plumbing under it.
//!
//! `errno` and `cstr` are the low-level helpers (thread-local error codes,
//! NUL-terminated buffers); `handle` and `dir` wrap native streams and
//! directory handles; `posix` ties them into a [`FileSystem`](crate::FileSystem).

#[cfg(unix)]
pub mod cstr;
#[cfg(unix)]
mod dir;
#[cfg(unix)]
pub mod errno;
#[cfg(unix)]
mod handle;
#[cfg(unix)]
mod logfile;
#[cfg(unix)]
mod posix;

#[cfg(unix)]
pub use handle::{Sink, SinkMode, Source};
#[cfg(unix)]
pub use logfile::open_log_file_secure_append;
#[cfg(unix)]
pub use posix::{DEFAULT_TEMP_DIR, PosixFileSystem};
