use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

pub(crate) const TEMP_PREFIX: &str = ".posix_fs.";

/// Hidden sibling name inside `dir` for staged writes.
/// Pattern: .posix_fs.<pid>.<nanos>.<seq>.tmp
pub(crate) fn unique_temp_path(dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("{TEMP_PREFIX}{pid}.{nanos}.{seq}.tmp"))
}

/// Directory a sibling of `path` lives in; `.` for a bare file name.
pub(crate) fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
