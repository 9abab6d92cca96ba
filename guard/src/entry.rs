// The six exported libc symbols. Each one runs the shared decision on the
// requested path, returns the designated failure value with errno = EACCES
// when it is blocked, and otherwise delegates verbatim to the real
// implementation resolved at load time.

use crate::dispatch::dispatch;
use crate::state::guard_state;
use core::ptr::null_mut;
use libc::{c_char, c_int, mode_t, FILE};
use std::ffi::CStr;

unsafe fn cstr_arg<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr))
    }
}

// The kernel only consumes the third open() argument for these flags; in
// every other call the variadic slot holds garbage and must not be forwarded.
fn wants_mode(flags: c_int) -> bool {
    flags & libc::O_CREAT != 0 || (flags & libc::O_TMPFILE) == libc::O_TMPFILE
}

#[no_mangle]
pub unsafe extern "C" fn open(path: *const c_char, flags: c_int, mode: mode_t) -> c_int {
    let state = guard_state();
    dispatch(cstr_arg(path), &state.canonical_blocked, -1, || unsafe {
        state
            .real
            .open
            .call_open(path, flags, wants_mode(flags).then_some(mode))
    })
}

#[no_mangle]
pub unsafe extern "C" fn open64(path: *const c_char, flags: c_int, mode: mode_t) -> c_int {
    let state = guard_state();
    dispatch(cstr_arg(path), &state.canonical_blocked, -1, || unsafe {
        state
            .real
            .open64
            .call_open(path, flags, wants_mode(flags).then_some(mode))
    })
}

#[no_mangle]
pub unsafe extern "C" fn fopen(path: *const c_char, mode: *const c_char) -> *mut FILE {
    let state = guard_state();
    dispatch(cstr_arg(path), &state.canonical_blocked, null_mut(), || unsafe {
        state.real.fopen.call_fopen(path, mode)
    })
}

#[no_mangle]
pub unsafe extern "C" fn fopen64(path: *const c_char, mode: *const c_char) -> *mut FILE {
    let state = guard_state();
    dispatch(cstr_arg(path), &state.canonical_blocked, null_mut(), || unsafe {
        state.real.fopen64.call_fopen(path, mode)
    })
}

#[no_mangle]
pub unsafe extern "C" fn freopen(
    path: *const c_char,
    mode: *const c_char,
    stream: *mut FILE,
) -> *mut FILE {
    let state = guard_state();
    dispatch(cstr_arg(path), &state.canonical_blocked, null_mut(), || unsafe {
        state.real.freopen.call_freopen(path, mode, stream)
    })
}

#[no_mangle]
pub unsafe extern "C" fn freopen64(
    path: *const c_char,
    mode: *const c_char,
    stream: *mut FILE,
) -> *mut FILE {
    let state = guard_state();
    dispatch(cstr_arg(path), &state.canonical_blocked, null_mut(), || unsafe {
        state.real.freopen64.call_freopen(path, mode, stream)
    })
}
