//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors for safety.

use dirs::{config_dir, data_dir};
use std::env;
use std::path::{Path, PathBuf};

use crate::errors::FsError;
use crate::fs::FileSystem;
use crate::platform::PosixFileSystem;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "POSIX_FS_CONFIG";

const APP_DIR: &str = "posix_fs";

/// OS-appropriate default config path (ignores `POSIX_FS_CONFIG`).
pub fn default_config_path() -> Option<PathBuf> {
    match config_dir() {
        Some(base) => Some(base.join(APP_DIR).join("config.xml")),
        None => env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join(APP_DIR)
                .join("config.xml")
        }),
    }
}

/// The config file that will be consulted: `$POSIX_FS_CONFIG` when set and
/// non-empty, otherwise [`default_config_path`].
pub fn config_path() -> Option<PathBuf> {
    match env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => Some(PathBuf::from(p)),
        _ => default_config_path(),
    }
}

/// OS-appropriate default log file path (data dir). Nothing is created.
pub fn default_log_path() -> Option<PathBuf> {
    match data_dir() {
        Some(base) => Some(base.join(APP_DIR).join("posixfs.log")),
        None => env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join(".local")
                .join("share")
                .join(APP_DIR)
                .join("posixfs.log")
        }),
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> Result<bool, FsError> {
    let fs = PosixFileSystem::new();
    let mut p = path.parent();
    while let Some(anc) = p {
        if !anc.as_os_str().is_empty()
            && fs.metadata_or_none(anc)?.is_some_and(|m| m.is_symlink())
        {
            return Ok(true);
        }
        p = anc.parent();
    }
    Ok(false)
}
