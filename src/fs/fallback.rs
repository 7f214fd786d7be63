//! Operations composed from the primitive [`FileSystem`] calls.
//!
//! Nothing here touches the OS directly, so these work for any backend.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::{FileSink, FileSystem};
use super::util::{parent_or_current, unique_temp_path};
use crate::errors::FsError;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Stream `source` into `target` through the backend's own handles.
///
/// Both streams are dropped (and so released) on every exit path. A read
/// failure is attributed to `source`, a write failure to `target`; either way
/// `target` keeps whatever was written before the failure. The sink is closed
/// explicitly, so a write-back failure at close is reported as well.
pub fn copy<F: FileSystem + ?Sized>(fs: &F, source: &Path, target: &Path) -> Result<u64, FsError> {
    let mut reader = fs.source(source)?;
    let mut writer = fs.sink(target)?;

    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FsError::new("copy", source, e)),
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| FsError::new("copy", target, e))?;
        total += n as u64;
    }
    writer.flush().map_err(|e| FsError::new("copy", target, e))?;
    writer.close()?;

    debug!(src = %source.display(), dest = %target.display(), bytes = total, "copied");
    Ok(total)
}

/// Copy into a hidden temp sibling of `target`, then `atomic_move` it over
/// `target`. Observers see either the old target or the complete copy. On
/// failure the temp file is removed best-effort and the original error returned.
pub fn copy_atomically<F: FileSystem + ?Sized>(
    fs: &F,
    source: &Path,
    target: &Path,
) -> Result<u64, FsError> {
    let tmp = unique_temp_path(parent_or_current(target));

    let result = copy(fs, source, &tmp).and_then(|bytes| fs.atomic_move(&tmp, target).map(|()| bytes));

    if result.is_err() {
        if let Err(e) = fs.delete(&tmp) {
            trace!(tmp = %tmp.display(), error = %e, "temp cleanup after failed copy");
        }
    }
    result
}

/// Create `dir` and every missing ancestor, top-down.
pub fn create_directories<F: FileSystem + ?Sized>(fs: &F, dir: &Path) -> Result<(), FsError> {
    let mut missing: Vec<&Path> = Vec::new();
    let mut cur = Some(dir);
    while let Some(p) = cur {
        if p.as_os_str().is_empty() {
            break;
        }
        match fs.metadata_or_none(p)? {
            // A symlink is assumed to lead to a directory; creating below it reports otherwise.
            Some(meta) if meta.is_directory || meta.is_symlink() => break,
            Some(_) => {
                return Err(FsError::new(
                    "create_directories",
                    p,
                    io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"),
                ));
            }
            None => missing.push(p),
        }
        cur = p.parent();
    }

    for p in missing.iter().rev() {
        if let Err(e) = fs.create_directory(p) {
            // Another creator may have won the race.
            if fs.metadata_or_none(p)?.is_some_and(|m| m.is_directory) {
                continue;
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Depth-first delete of `path`. Fails if `path` does not exist.
pub fn delete_recursively<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<(), FsError> {
    let meta = fs.metadata_or_none(path)?.ok_or_else(|| {
        FsError::new("delete_recursively", path, io::Error::from(io::ErrorKind::NotFound))
    })?;
    if meta.is_directory {
        for child in fs.list(path)? {
            delete_recursively(fs, &child)?;
        }
    }
    fs.delete(path)
}

/// Pre-order walk below `dir`; symlinked directories are listed but not entered.
pub fn list_recursively<F: FileSystem + ?Sized>(fs: &F, dir: &Path) -> Result<Vec<PathBuf>, FsError> {
    let mut out = Vec::new();
    let mut stack = fs.list(dir)?;
    stack.reverse();
    while let Some(p) = stack.pop() {
        let is_dir = fs.metadata_or_none(&p)?.is_some_and(|m| m.is_directory);
        if is_dir {
            let mut children = fs.list(&p)?;
            children.reverse();
            stack.extend(children);
        }
        out.push(p);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::util::TEMP_PREFIX;
    use crate::platform::PosixFileSystem;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn copy_reports_byte_count() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a");
        let dst = dir.path().join("b");
        fs::write(&src, vec![7u8; COPY_BUF_SIZE * 2 + 5]).unwrap();

        let n = copy(&PosixFileSystem::new(), &src, &dst).unwrap();
        assert_eq!(n, (COPY_BUF_SIZE * 2 + 5) as u64);
        assert_eq!(fs::read(&src).unwrap(), fs::read(&dst).unwrap());
    }

    #[test]
    fn copy_missing_source_does_not_create_target() {
        let dir = tempdir().unwrap();
        let dst = dir.path().join("b");
        let err = copy(&PosixFileSystem::new(), &dir.path().join("nope"), &dst).unwrap_err();
        assert_eq!(err.operation(), "source");
        assert!(!dst.exists());
    }

    #[test]
    fn copy_atomically_replaces_target_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, b"fresh").unwrap();
        fs::write(&dst, b"stale").unwrap();

        copy_atomically(&PosixFileSystem::new(), &src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"fresh");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.starts_with(TEMP_PREFIX)), "{names:?}");
    }

    #[test]
    fn create_directories_is_idempotent() {
        let dir = tempdir().unwrap();
        let deep = dir.path().join("a/b/c");
        let fsys = PosixFileSystem::new();
        create_directories(&fsys, &deep).unwrap();
        assert!(deep.is_dir());
        create_directories(&fsys, &deep).unwrap();
    }

    #[test]
    fn create_directories_through_a_file_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f"), b"").unwrap();
        let err = create_directories(&PosixFileSystem::new(), &dir.path().join("f/sub")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(err.path(), dir.path().join("f"));
    }

    #[test]
    fn delete_recursively_removes_tree() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("x/y")).unwrap();
        fs::write(root.join("x/y/z.txt"), b"z").unwrap();
        fs::write(root.join("top.txt"), b"t").unwrap();

        delete_recursively(&PosixFileSystem::new(), &root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn delete_recursively_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let err = delete_recursively(&PosixFileSystem::new(), &dir.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn list_recursively_is_preorder() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/f"), b"").unwrap();

        let got = list_recursively(&PosixFileSystem::new(), dir.path()).unwrap();
        assert_eq!(
            got,
            vec![
                dir.path().join("a"),
                dir.path().join("a/b"),
                dir.path().join("a/b/f"),
            ]
        );
    }
}
