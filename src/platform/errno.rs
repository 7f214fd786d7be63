//! Access to the calling thread's `errno`.
//!
//! libc reports failures through this ambient value instead of the return
//! value, so it must be read right after the call that may have set it and
//! before anything else can overwrite it. `readdir` also needs it cleared up
//! front: a null return means either "end of stream" or "error", and only
//! `errno` tells them apart.

use libc::c_int;

/// Current value of `errno` for this thread.
#[inline]
pub fn errno() -> c_int {
    ::errno::errno().0
}

/// Reset `errno` to 0.
#[inline]
pub fn clear_errno() {
    set_errno(0);
}

#[inline]
pub(crate) fn set_errno(value: c_int) {
    ::errno::set_errno(::errno::Errno(value));
}
