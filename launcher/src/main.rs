// Process-replacement shim: re-executes the protected binary with the guard
// library preloaded. Builds a new argument vector (target path substituted
// for argv[0], caller arguments kept in order) and a new environment (the
// caller's environment plus the preload directive), then replaces the
// current process image. Never returns on success.

use core::ptr::null;
use libc::c_char;
use log::error;
use std::ffi::{CString, OsString};
use std::os::unix::ffi::OsStringExt;

/// Binary this launcher always hands control to.
const TARGET_PATH: &str = "/usr/local/sbin/haproxy";

/// Preload artifact injected into the target process.
const GUARD_LIB_PATH: &str = "/usr/local/lib/libpathseal_guard.so";

const PRELOAD_VAR: &[u8] = b"LD_PRELOAD";

fn main() {
    let _ = simple_logger::SimpleLogger::new().init();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let argv = build_argv(TARGET_PATH, std::env::args_os().skip(1))?;
    let envp = build_envp(std::env::vars_os(), GUARD_LIB_PATH)?;
    // Only returns on failure
    Err(exec(&argv, &envp))
}

/// New argument vector: the target binary replaces the launcher's own
/// argv[0], everything after it is forwarded unchanged.
fn build_argv(
    target: &str,
    args: impl Iterator<Item = OsString>,
) -> Result<Vec<CString>, String> {
    let mut argv = vec![CString::new(target).unwrap()];
    for arg in args {
        argv.push(
            CString::new(arg.into_vec())
                .map_err(|_| "Invalid argument: contains a null byte".to_owned())?,
        );
    }
    Ok(argv)
}

/// New environment: a copy of the caller's environment with the preload
/// directive appended. If the loader variable is already set, the guard
/// library is appended to the existing entry instead of emitting a duplicate
/// variable the loader would ignore.
fn build_envp(
    env: impl Iterator<Item = (OsString, OsString)>,
    guard_lib: &str,
) -> Result<Vec<CString>, String> {
    let mut envp = Vec::new();
    let mut preload_set = false;
    for (key, value) in env {
        let key = key.into_vec();
        let merge_preload = key == PRELOAD_VAR;
        let mut entry = key;
        entry.push(b'=');
        entry.extend_from_slice(&value.into_vec());
        if merge_preload {
            entry.push(b':');
            entry.extend_from_slice(guard_lib.as_bytes());
            preload_set = true;
        }
        envp.push(
            CString::new(entry)
                .map_err(|_| "Invalid environment entry: contains a null byte".to_owned())?,
        );
    }
    if !preload_set {
        let mut entry = PRELOAD_VAR.to_vec();
        entry.push(b'=');
        entry.extend_from_slice(guard_lib.as_bytes());
        envp.push(CString::new(entry).unwrap());
    }
    Ok(envp)
}

/// Replace the current process image. Any return from execve() is a failure.
fn exec(argv: &[CString], envp: &[CString]) -> String {
    let argv_ptrs: Vec<*const c_char> = argv
        .iter()
        .map(|x| x.as_ptr())
        .chain(std::iter::once(null()))
        .collect();
    let envp_ptrs: Vec<*const c_char> = envp
        .iter()
        .map(|x| x.as_ptr())
        .chain(std::iter::once(null()))
        .collect();
    unsafe { libc::execve(argv[0].as_ptr(), argv_ptrs.as_ptr(), envp_ptrs.as_ptr()) };
    format!(
        "execve({}) failed with code {}",
        argv[0].to_string_lossy(),
        std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
    )
}
