//! Directory enumeration over `opendir`/`readdir`/`closedir`.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use tracing::trace;

use super::cstr::{append_until_nul, path_to_cstring};
use super::errno::{clear_errno, errno};
use crate::errors::FsError;

/// An open `DIR*`, closed on drop.
struct DirStream(NonNull<libc::DIR>);

impl DirStream {
    fn open(path: &Path) -> Result<Self, FsError> {
        let c_path = path_to_cstring("list", path)?;
        // SAFETY: `c_path` is NUL-terminated.
        let dir = unsafe { libc::opendir(c_path.as_ptr()) };
        NonNull::new(dir)
            .map(Self)
            .ok_or_else(|| FsError::last_os_error("list", path))
    }

    /// Read the next entry name into `buf`; `Ok(false)` at end of stream.
    ///
    /// `readdir` returns null both at the end and on error; `errno` is
    /// cleared before the call and checked right after to tell them apart.
    fn next_name(&mut self, buf: &mut Vec<u8>) -> Result<bool, i32> {
        clear_errno();
        // SAFETY: the stream is open and only used from this owner.
        let entry = unsafe { libc::readdir(self.0.as_ptr()) };
        if entry.is_null() {
            return match errno() {
                0 => Ok(false),
                code => Err(code),
            };
        }
        buf.clear();
        // SAFETY: a non-null `readdir` result stays valid until the next call on this stream.
        let name = unsafe { &(*entry).d_name };
        append_until_nul(name, buf);
        Ok(true)
    }
}

impl Drop for DirStream {
    fn drop(&mut self) {
        // A failing closedir must not mask the listing result.
        // SAFETY: the stream is open and owned by us.
        let _ = unsafe { libc::closedir(self.0.as_ptr()) };
    }
}

fn is_self_or_parent(name: &[u8]) -> bool {
    name == b"." || name == b".."
}

/// Children of `dir` in OS enumeration order, `.` and `..` excluded.
pub fn list(dir: &Path) -> Result<Vec<PathBuf>, FsError> {
    let stream = DirStream::open(dir)?;
    read_entries(stream, dir)
}

/// Like [`list`], but `Ok(None)` when `dir` cannot be opened.
pub fn list_or_none(dir: &Path) -> Result<Option<Vec<PathBuf>>, FsError> {
    let stream = match DirStream::open(dir) {
        Ok(stream) => stream,
        Err(e) if e.raw_os_error().is_some() => {
            trace!(path = %dir.display(), error = %e, "directory not listable");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    read_entries(stream, dir).map(Some)
}

fn read_entries(mut stream: DirStream, dir: &Path) -> Result<Vec<PathBuf>, FsError> {
    let mut out = Vec::new();
    let mut name = Vec::new();
    loop {
        match stream.next_name(&mut name) {
            Ok(true) => {}
            Ok(false) => break,
            Err(code) => return Err(FsError::from_errno(code, "list", dir)),
        }
        if is_self_or_parent(&name) {
            continue;
        }
        out.push(dir.join(OsStr::from_bytes(&name)));
    }
    trace!(path = %dir.display(), entries = out.len(), "listed directory");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lists_children_without_dot_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join(".hidden"), b"h").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let got: BTreeSet<_> = list(dir.path()).unwrap().into_iter().collect();
        let want: BTreeSet<_> = ["a.txt", ".hidden", "sub"]
            .iter()
            .map(|n| dir.path().join(n))
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let dir = tempdir().unwrap();
        assert!(list(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempdir().unwrap();
        let err = list(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOENT));
        assert_eq!(err.operation(), "list");
    }

    #[test]
    fn listing_a_file_fails_with_enotdir() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("f");
        fs::write(&f, b"").unwrap();
        let err = list(&f).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOTDIR));
    }

    #[test]
    fn list_or_none_missing_is_none() {
        let dir = tempdir().unwrap();
        assert!(list_or_none(&dir.path().join("missing")).unwrap().is_none());
        assert_eq!(list_or_none(dir.path()).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn list_or_none_still_rejects_nul_paths() {
        assert!(list_or_none(Path::new("bad\0dir")).is_err());
    }

    #[test]
    fn self_and_parent_detection() {
        assert!(is_self_or_parent(b"."));
        assert!(is_self_or_parent(b".."));
        assert!(!is_self_or_parent(b"..."));
        assert!(!is_self_or_parent(b".a"));
    }

    #[test]
    fn many_entries_do_not_leak_handles() {
        let dir = tempdir().unwrap();
        for i in 0..50 {
            fs::write(dir.path().join(format!("f{i}")), b"").unwrap();
        }
        // Far more iterations than a typical fd limit would allow if closedir leaked.
        for _ in 0..2_000 {
            assert_eq!(list(dir.path()).unwrap().len(), 50);
        }
    }
}
