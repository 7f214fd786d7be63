use std::path::PathBuf;
use std::time::SystemTime;

/// What a backend knows about a path. Absent facts are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub is_regular_file: bool,
    pub is_directory: bool,
    /// Where a symlink points; `None` for anything else.
    pub symlink_target: Option<PathBuf>,
    /// Size in bytes.
    pub size: Option<u64>,
    pub created_at: Option<SystemTime>,
    pub last_modified_at: Option<SystemTime>,
    pub last_accessed_at: Option<SystemTime>,
}

impl Metadata {
    pub fn is_symlink(&self) -> bool {
        self.symlink_target.is_some()
    }
}
