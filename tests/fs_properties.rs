use posix_fs::{FileSystem, PosixFileSystem};
use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use walkdir::WalkDir;

fn read_all(fsys: &PosixFileSystem, p: &Path) -> Vec<u8> {
    let mut buf = Vec::new();
    fsys.source(p).unwrap().read_to_end(&mut buf).unwrap();
    buf
}

fn write_file(fsys: &PosixFileSystem, p: &Path, bytes: &[u8]) {
    let mut sink = fsys.sink(p).unwrap();
    sink.write_all(bytes).unwrap();
    sink.close().unwrap();
}

#[test]
fn create_copy_delete_scenario() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let x = root.path().join("x");
    let a = x.join("a.txt");
    let b = x.join("b.txt");

    fsys.create_directory(&x).unwrap();
    write_file(&fsys, &a, b"hello");
    assert_eq!(fsys.list(&x).unwrap(), vec![a.clone()]);

    fsys.copy(&a, &b).unwrap();
    assert_eq!(read_all(&fsys, &b), b"hello");

    fsys.delete(&a).unwrap();
    assert_eq!(fsys.list(&x).unwrap(), vec![b]);
}

#[test]
fn list_matches_independent_enumeration() {
    let root = tempdir().unwrap();
    let dir = root.path();
    for i in 0..50 {
        fs::write(dir.join(format!("file-{i:02}")), b"").unwrap();
    }
    fs::create_dir(dir.join("sub")).unwrap();
    fs::write(dir.join(".hidden"), b"").unwrap();
    fs::write(dir.join("sub/nested"), b"").unwrap();
    std::os::unix::fs::symlink("file-00", dir.join("link")).unwrap();

    let got: BTreeSet<PathBuf> = PosixFileSystem::new().list(dir).unwrap().into_iter().collect();
    let expected: BTreeSet<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .map(|e| e.unwrap().into_path())
        .collect();
    assert_eq!(got, expected);
    assert_eq!(got.len(), 53);
}

#[test]
fn list_never_yields_dot_entries() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    for dir in [root.path().to_path_buf(), root.path().join("empty")] {
        fs::create_dir_all(&dir).unwrap();
        let entries = fsys.list(&dir).unwrap();
        assert!(!entries.contains(&dir.join(".")));
        assert!(!entries.contains(&dir.join("..")));
    }
    assert!(fsys.list(&root.path().join("empty")).unwrap().is_empty());
}

#[test]
fn list_of_missing_or_file_fails_but_list_or_none_is_none() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let missing = root.path().join("missing");
    let file = root.path().join("file");
    fs::write(&file, b"").unwrap();

    let err = fsys.list(&missing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.path(), missing.as_path());
    assert_eq!(fsys.list(&file).unwrap_err().raw_os_error(), Some(libc::ENOTDIR));

    assert_eq!(fsys.list_or_none(&missing).unwrap(), None);
    assert_eq!(fsys.list_or_none(root.path()).unwrap(), Some(vec![file]));
}

#[test]
fn atomic_move_carries_content() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let a = root.path().join("a");
    let b = root.path().join("b");
    write_file(&fsys, &a, b"moved bytes");

    fsys.atomic_move(&a, &b).unwrap();
    assert_eq!(read_all(&fsys, &b), b"moved bytes");
    assert!(!fsys.exists(&a).unwrap());
}

#[test]
fn copy_is_byte_exact_and_leaves_source_alone() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let a = root.path().join("a.bin");
    let b = root.path().join("b.bin");
    let payload: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&a, &payload).unwrap();
    fs::write(&b, b"previous content that is longer than nothing").unwrap();

    let n = fsys.copy(&a, &b).unwrap();
    assert_eq!(n, payload.len() as u64);
    assert_eq!(fs::read(&b).unwrap(), payload);
    assert_eq!(fs::read(&a).unwrap(), payload);
}

#[test]
fn copy_of_empty_file_creates_empty_target() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let a = root.path().join("empty");
    fs::write(&a, b"").unwrap();
    assert_eq!(fsys.copy(&a, &root.path().join("copy")).unwrap(), 0);
    assert_eq!(fs::metadata(root.path().join("copy")).unwrap().len(), 0);
}

#[test]
fn create_directory_is_listed_and_not_repeatable() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let d = root.path().join("d");
    fsys.create_directory(&d).unwrap();
    assert!(fsys.list(root.path()).unwrap().contains(&d));

    let err = fsys.create_directory(&d).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let orphan = root.path().join("no/parent");
    assert_eq!(fsys.create_directory(&orphan).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn delete_then_source_fails() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let f = root.path().join("f");
    let d = root.path().join("d");
    write_file(&fsys, &f, b"");
    fsys.create_directory(&d).unwrap();

    fsys.delete(&f).unwrap();
    fsys.delete(&d).unwrap();
    assert_eq!(fsys.source(&f).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(fsys.delete(&f).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn error_message_names_operation_path_and_code() {
    let root = tempdir().unwrap();
    let missing = root.path().join("nowhere.txt");
    let err = PosixFileSystem::new().source(&missing).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("source"), "{msg}");
    assert!(msg.contains(&missing.display().to_string()), "{msg}");
    assert!(msg.contains(&format!("[os code: {}]", libc::ENOENT)), "{msg}");
    let io_err: std::io::Error = err.into();
    assert_eq!(io_err.kind(), ErrorKind::NotFound);
}

#[test]
fn interior_nul_is_rejected_before_any_call() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    let bad = Path::new(OsStr::from_bytes(b"/tmp/bad\0name"));
    let fsys = PosixFileSystem::new();
    assert_eq!(fsys.create_directory(bad).unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(fsys.list(bad).unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(fsys.sink(bad).unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(fsys.metadata_or_none(bad).unwrap_err().kind(), ErrorKind::InvalidInput);
}

#[test]
fn non_utf8_names_survive_listing() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    let root = tempdir().unwrap();
    let name = OsStr::from_bytes(b"caf\xe9");
    let p = root.path().join(name);
    // Some filesystems (e.g. macOS APFS) refuse non-UTF-8 names.
    if fs::write(&p, b"").is_err() {
        return;
    }
    let listed = PosixFileSystem::new().list(root.path()).unwrap();
    assert_eq!(listed, vec![p]);
}

#[test]
fn metadata_and_canonicalize_through_symlinks() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let base = fsys.canonicalize(root.path()).unwrap();
    assert!(base.is_absolute());

    fs::create_dir(base.join("real")).unwrap();
    fs::write(base.join("real/f"), b"abc").unwrap();
    fsys.create_symlink(&base.join("alias"), Path::new("real")).unwrap();

    let link = fsys.metadata_or_none(&base.join("alias")).unwrap().unwrap();
    assert!(link.is_symlink());
    assert_eq!(link.symlink_target, Some(PathBuf::from("real")));

    let file = fsys.metadata_or_none(&base.join("alias/f")).unwrap().unwrap();
    assert!(file.is_regular_file);
    assert_eq!(file.size, Some(3));

    assert_eq!(
        fsys.canonicalize(&base.join("alias/./../alias/f")).unwrap(),
        base.join("real/f")
    );
}

#[test]
fn recursive_helpers_round_out_the_tree() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let top = root.path().join("top");
    fsys.create_directories(&top.join("a/b")).unwrap();
    write_file(&fsys, &top.join("a/b/leaf"), b"1");
    write_file(&fsys, &top.join("a/sibling"), b"2");

    let walked: BTreeSet<PathBuf> = fsys.list_recursively(&top).unwrap().into_iter().collect();
    let expected: BTreeSet<PathBuf> = WalkDir::new(&top)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap().into_path())
        .collect();
    assert_eq!(walked, expected);

    fsys.delete_recursively(&top).unwrap();
    assert!(!fsys.exists(&top).unwrap());
}

#[cfg(target_os = "linux")]
#[test]
fn copy_into_full_device_blames_target() {
    let root = tempdir().unwrap();
    let fsys = PosixFileSystem::new();
    let full = Path::new("/dev/full");
    for size in [5usize, 300_000] {
        let src = root.path().join(format!("src-{size}"));
        fs::write(&src, vec![b'z'; size]).unwrap();

        let err = fsys.copy(&src, full).unwrap_err();
        assert_eq!(err.operation(), "copy", "size {size}: {err}");
        assert_eq!(err.path(), full);
        assert_eq!(err.raw_os_error(), Some(libc::ENOSPC));
        assert_eq!(fs::read(&src).unwrap().len(), size);
    }
}
