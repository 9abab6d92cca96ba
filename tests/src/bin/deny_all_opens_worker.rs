// Runs with the guard preloaded and checks that every intercepted entry
// point refuses the path given as first argument with EACCES.

use common::common_test_setup;
use libc::{c_char, c_int, FILE};
use log::info;
use std::ffi::CString;

// LFS64 stream variants are not exposed by the libc crate, declare them
// directly against glibc.
extern "C" {
    fn open64(path: *const c_char, flags: c_int, ...) -> c_int;
    fn fopen64(path: *const c_char, mode: *const c_char) -> *mut FILE;
    fn freopen64(path: *const c_char, mode: *const c_char, stream: *mut FILE) -> *mut FILE;
}

fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

fn open_scratch_stream() -> *mut FILE {
    let dev_null = CString::new("/dev/null").unwrap();
    let mode = CString::new("r").unwrap();
    let stream = unsafe { libc::fopen(dev_null.as_ptr(), mode.as_ptr()) };
    assert!(!stream.is_null(), "fopen(/dev/null) failed with errno {}", errno());
    stream
}

fn main() {
    common_test_setup();
    let path = std::env::args()
        .nth(1)
        .expect("usage: deny_all_opens_worker <path>");
    let c_path = CString::new(path.clone()).expect("path contains a null byte");
    let c_mode = CString::new("r").unwrap();

    let res = unsafe { libc::open(c_path.as_ptr(), libc::O_RDONLY) };
    let err = errno();
    assert_eq!((res, err), (-1, libc::EACCES), "open({}) was not denied", path);

    let res = unsafe { open64(c_path.as_ptr(), libc::O_RDONLY) };
    let err = errno();
    assert_eq!((res, err), (-1, libc::EACCES), "open64({}) was not denied", path);

    let stream = unsafe { libc::fopen(c_path.as_ptr(), c_mode.as_ptr()) };
    let err = errno();
    assert!(stream.is_null(), "fopen({}) was not denied", path);
    assert_eq!(err, libc::EACCES, "fopen({}) denied with the wrong errno", path);

    let stream = unsafe { fopen64(c_path.as_ptr(), c_mode.as_ptr()) };
    let err = errno();
    assert!(stream.is_null(), "fopen64({}) was not denied", path);
    assert_eq!(err, libc::EACCES, "fopen64({}) denied with the wrong errno", path);

    let scratch = open_scratch_stream();
    let stream = unsafe { libc::freopen(c_path.as_ptr(), c_mode.as_ptr(), scratch) };
    let err = errno();
    assert!(stream.is_null(), "freopen({}) was not denied", path);
    assert_eq!(err, libc::EACCES, "freopen({}) denied with the wrong errno", path);

    let scratch = open_scratch_stream();
    let stream = unsafe { freopen64(c_path.as_ptr(), c_mode.as_ptr(), scratch) };
    let err = errno();
    assert!(stream.is_null(), "freopen64({}) was not denied", path);
    assert_eq!(err, libc::EACCES, "freopen64({}) denied with the wrong errno", path);

    info!("All six open entry points denied access to {}", path);
}
