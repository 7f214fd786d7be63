//! Bounded reads of NUL-terminated byte strings handed out by libc.
//!
//! `dirent::d_name`, `getcwd` buffers and `realpath` results carry no length,
//! only a trailing zero byte. Everything here copies up to (never including,
//! never past) that byte, and never takes ownership of the source. Memory
//! that libc allocated on our behalf is owned by [`NativeBuf`] and freed
//! exactly once when it drops.

use libc::c_char;
use std::ffi::{CString, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::errors::FsError;

/// Append bytes of `src` to `dst` up to the first zero byte.
///
/// The slice length is the upper bound: if no terminator is found the whole
/// slice is copied.
pub fn append_until_nul<'a>(src: &[c_char], dst: &'a mut Vec<u8>) -> &'a mut Vec<u8> {
    for &c in src {
        if c == 0 {
            break;
        }
        dst.push(c as u8);
    }
    dst
}

/// Pointer flavour of [`append_until_nul`] for strings without a known array
/// type, reading at most `limit` bytes.
///
/// # Safety
///
/// `src` must be non-null and readable up to its terminator or `limit`
/// bytes, whichever comes first.
pub unsafe fn append_until_nul_ptr(src: *const c_char, limit: usize, dst: &mut Vec<u8>) -> &mut Vec<u8> {
    for i in 0..limit {
        // SAFETY: `i` is before the terminator and below `limit` (caller contract).
        let c = unsafe { *src.add(i) };
        if c == 0 {
            break;
        }
        dst.push(c as u8);
    }
    dst
}

/// Raw bytes to a path, with no UTF-8 requirement.
pub fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(OsString::from_vec(bytes))
}

/// Path to the NUL-terminated form libc expects.
pub(crate) fn path_to_cstring(operation: &'static str, path: &Path) -> Result<CString, FsError> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| FsError::invalid_path(operation, path))
}

/// A C string allocated by libc with `malloc` (e.g. `realpath(p, NULL)`).
pub struct NativeBuf(NonNull<c_char>);

impl NativeBuf {
    /// Take ownership of a pointer returned by libc. `None` for null.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `malloc` (or a libc call documented to use it)
    /// and must not be freed by anyone else.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Copy the string (bounded by `limit`) into an owned byte vector.
    pub fn to_bytes(&self, limit: usize) -> Vec<u8> {
        let mut out = Vec::new();
        // SAFETY: libc returned a NUL-terminated string in this allocation.
        unsafe { append_until_nul_ptr(self.0.as_ptr(), limit, &mut out) };
        out
    }
}

impl Drop for NativeBuf {
    fn drop(&mut self) {
        // SAFETY: we are the only owner and the pointer came from malloc.
        unsafe { libc::free(self.0.as_ptr().cast()) }
    }
}
