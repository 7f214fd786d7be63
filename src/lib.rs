//! Core library for `posix_fs`.
//!
//! A filesystem abstraction over the POSIX C interface: the [`FileSystem`]
//! trait describes the operations, [`PosixFileSystem`] implements them with
//! libc calls, and every failure is reported as an [`FsError`] carrying the
//! operation, the path and the OS error.
//!
//! ```no_run
//! use posix_fs::{FileSystem, PosixFileSystem};
//! use std::io::Write;
//!
//! let fs = PosixFileSystem::new();
//! let dir = fs.temporary_directory().join("demo");
//! fs.create_directories(&dir)?;
//! fs.sink(&dir.join("a.txt"))?.write_all(b"hello")?;
//! fs.copy(&dir.join("a.txt"), &dir.join("b.txt"))?;
//! for entry in fs.list(&dir)? {
//!     println!("{}", entry.display());
//! }
//! fs.delete_recursively(&dir)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod output;
pub mod platform;

pub use config::{
    Config, LogLevel, config_path, default_config_path, default_log_path, load_config,
    path_has_symlink_ancestor,
};
pub use errors::FsError;
pub use fs::{FileSink, FileSystem, Metadata};
#[cfg(unix)]
pub use platform::{PosixFileSystem, Sink, SinkMode, Source};

/// Convenience imports for callers: `use posix_fs::prelude::*;`
pub mod prelude {
    pub use crate::errors::FsError;
    pub use crate::fs::{FileSink, FileSystem, Metadata};
    #[cfg(unix)]
    pub use crate::platform::PosixFileSystem;
}
