//! [`FileSystem`] backed directly by POSIX libc calls.
//!
//! Every native call is followed immediately by its error check, so the
//! `errno` read in [`FsError::last_os_error`] always belongs to that call.

use std::ffi::CStr;
use std::mem::MaybeUninit;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libc::{c_char, c_int};
use tracing::{debug, trace};

use super::cstr::{NativeBuf, append_until_nul, bytes_to_path, path_to_cstring};
use super::dir;
use super::handle::{Sink, SinkMode, Source};
use crate::errors::FsError;
use crate::fs::{FileSystem, Metadata};

/// Fallback when `$TMPDIR` is unset or empty.
pub const DEFAULT_TEMP_DIR: &str = "/tmp";

const PATH_MAX: usize = libc::PATH_MAX as usize;

/// The POSIX backend. Stateless apart from the mode used for new directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosixFileSystem {
    dir_mode: u32,
}

impl Default for PosixFileSystem {
    fn default() -> Self {
        Self {
            dir_mode: Self::DEFAULT_DIR_MODE,
        }
    }
}

impl PosixFileSystem {
    /// Mode passed to `mkdir`; the process umask still applies.
    pub const DEFAULT_DIR_MODE: u32 = 0o777;

    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose `create_directory` uses `mode` instead of 0o777.
    pub fn with_dir_mode(mode: u32) -> Self {
        Self {
            dir_mode: mode & 0o7777,
        }
    }

    pub fn dir_mode(&self) -> u32 {
        self.dir_mode
    }
}

/// Turn a libc status return into a result, reading `errno` on failure.
fn check(rc: c_int, operation: &'static str, path: &Path) -> Result<(), FsError> {
    if rc == 0 {
        return Ok(());
    }
    let err = FsError::last_os_error(operation, path);
    debug!(op = operation, path = %path.display(), error = %err, "native call failed");
    Err(err)
}

fn system_time(secs: i64, nanos: i64) -> Option<SystemTime> {
    let nanos = u32::try_from(nanos).ok()?;
    if secs >= 0 {
        UNIX_EPOCH.checked_add(Duration::new(secs as u64, nanos))
    } else {
        UNIX_EPOCH
            .checked_sub(Duration::from_secs(secs.unsigned_abs()))?
            .checked_add(Duration::from_nanos(u64::from(nanos)))
    }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn birth_time(stat: &libc::stat) -> Option<SystemTime> {
    system_time(stat.st_birthtime as i64, stat.st_birthtime_nsec as i64)
}

#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd")))]
fn birth_time(_stat: &libc::stat) -> Option<SystemTime> {
    None
}

/// `readlink` into a PATH_MAX buffer. The result is not NUL-terminated; the
/// returned length is the bound.
fn read_link(c_path: &CStr, path: &Path) -> Result<PathBuf, FsError> {
    let mut buf = vec![0 as c_char; PATH_MAX];
    // SAFETY: `buf` is writable for `buf.len()` bytes.
    let n = unsafe { libc::readlink(c_path.as_ptr(), buf.as_mut_ptr(), buf.len()) };
    if n < 0 {
        return Err(FsError::last_os_error("read_link", path));
    }
    link_target(&buf, n as usize, path)
}

/// The first `len` bytes of a `readlink` buffer. A completely filled buffer
/// may hold a truncated target, so it is rejected.
fn link_target(buf: &[c_char], len: usize, path: &Path) -> Result<PathBuf, FsError> {
    if len >= buf.len() {
        return Err(FsError::from_errno(libc::ENAMETOOLONG, "read_link", path));
    }
    let mut bytes = Vec::new();
    append_until_nul(&buf[..len], &mut bytes);
    Ok(bytes_to_path(bytes))
}

impl FileSystem for PosixFileSystem {
    type Source = Source;
    type Sink = Sink;

    fn base_directory(&self) -> Result<PathBuf, FsError> {
        let mut buf = vec![0 as c_char; PATH_MAX];
        // SAFETY: `buf` is writable for `buf.len()` bytes.
        let cwd = unsafe { libc::getcwd(buf.as_mut_ptr(), buf.len()) };
        if cwd.is_null() {
            return Err(FsError::last_os_error("base_directory", "."));
        }
        let mut bytes = Vec::new();
        append_until_nul(&buf, &mut bytes);
        Ok(bytes_to_path(bytes))
    }

    fn temporary_directory(&self) -> PathBuf {
        match std::env::var_os("TMPDIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(DEFAULT_TEMP_DIR),
        }
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, FsError> {
        dir::list(dir)
    }

    fn list_or_none(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>, FsError> {
        dir::list_or_none(dir)
    }

    fn source(&self, file: &Path) -> Result<Source, FsError> {
        Source::open(file)
    }

    fn sink(&self, file: &Path) -> Result<Sink, FsError> {
        Sink::open(file, SinkMode::Truncate)
    }

    fn appending_sink(&self, file: &Path) -> Result<Sink, FsError> {
        Sink::open(file, SinkMode::Append)
    }

    fn create_directory(&self, dir: &Path) -> Result<(), FsError> {
        let c_path = path_to_cstring("create_directory", dir)?;
        // SAFETY: `c_path` is NUL-terminated.
        let rc = unsafe { libc::mkdir(c_path.as_ptr(), self.dir_mode as libc::mode_t) };
        check(rc, "create_directory", dir)?;
        debug!(path = %dir.display(), mode = format_args!("{:o}", self.dir_mode), "created directory");
        Ok(())
    }

    fn atomic_move(&self, source: &Path, target: &Path) -> Result<(), FsError> {
        let c_source = path_to_cstring("atomic_move", source)?;
        let c_target = path_to_cstring("atomic_move", target)?;
        // SAFETY: both paths are NUL-terminated.
        let rc = unsafe { libc::rename(c_source.as_ptr(), c_target.as_ptr()) };
        check(rc, "atomic_move", source)?;
        debug!(src = %source.display(), dest = %target.display(), "renamed atomically");
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<(), FsError> {
        let c_path = path_to_cstring("delete", path)?;
        // SAFETY: `c_path` is NUL-terminated.
        let rc = unsafe { libc::remove(c_path.as_ptr()) };
        check(rc, "delete", path)?;
        debug!(path = %path.display(), "deleted");
        Ok(())
    }

    fn metadata_or_none(&self, path: &Path) -> Result<Option<Metadata>, FsError> {
        let c_path = path_to_cstring("metadata", path)?;
        let mut stat = MaybeUninit::<libc::stat>::uninit();
        // SAFETY: `stat` is a valid out-pointer for one `struct stat`.
        if unsafe { libc::lstat(c_path.as_ptr(), stat.as_mut_ptr()) } != 0 {
            let err = FsError::last_os_error("metadata", path);
            return match err.raw_os_error() {
                Some(libc::ENOENT) | Some(libc::ENOTDIR) => Ok(None),
                _ => Err(err),
            };
        }
        // SAFETY: lstat succeeded and filled the struct.
        let stat = unsafe { stat.assume_init() };

        let kind = stat.st_mode & libc::S_IFMT;
        let symlink_target = if kind == libc::S_IFLNK {
            Some(read_link(&c_path, path)?)
        } else {
            None
        };

        trace!(path = %path.display(), mode = stat.st_mode, "stat");
        Ok(Some(Metadata {
            is_regular_file: kind == libc::S_IFREG,
            is_directory: kind == libc::S_IFDIR,
            symlink_target,
            size: u64::try_from(stat.st_size).ok(),
            created_at: birth_time(&stat),
            last_modified_at: system_time(stat.st_mtime as i64, stat.st_mtime_nsec as i64),
            last_accessed_at: system_time(stat.st_atime as i64, stat.st_atime_nsec as i64),
        }))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        let c_path = path_to_cstring("canonicalize", path)?;
        // SAFETY: a null resolved buffer asks libc to malloc one for us.
        let resolved = unsafe { libc::realpath(c_path.as_ptr(), std::ptr::null_mut()) };
        // SAFETY: realpath's result is malloc'ed and now owned solely by `buf`.
        let Some(buf) = (unsafe { NativeBuf::from_raw(resolved) }) else {
            return Err(FsError::last_os_error("canonicalize", path));
        };
        Ok(bytes_to_path(buf.to_bytes(PATH_MAX)))
    }

    fn create_symlink(&self, source: &Path, target: &Path) -> Result<(), FsError> {
        let c_source = path_to_cstring("create_symlink", source)?;
        let c_target = path_to_cstring("create_symlink", target)?;
        // SAFETY: both paths are NUL-terminated.
        let rc = unsafe { libc::symlink(c_target.as_ptr(), c_source.as_ptr()) };
        check(rc, "create_symlink", source)?;
        debug!(link = %source.display(), target = %target.display(), "created symlink");
        Ok(())
    }
}
