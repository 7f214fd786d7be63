//! Log file opening for the `posixfs` binary.
//!
//! Parents are created through [`PosixFileSystem`], and the file itself is
//! opened append-only with `O_NOFOLLOW`, so a symlink planted at the log path
//! is refused rather than followed. A newly created file is 0600; an
//! existing one keeps its mode.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use super::posix::PosixFileSystem;
use crate::fs::FileSystem;
use crate::fs::util::parent_or_current;

/// Open a log file for appending, creating it (mode 0600) and its parents if needed.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    let backend = PosixFileSystem::with_dir_mode(0o700);
    backend.create_directories(parent_or_current(path))?;
    let existed = backend.exists(path)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .custom_flags(libc::O_NOFOLLOW)
        .open(path)?;
    if !existed {
        // umask only narrows; pin the exact mode on files we created.
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}
