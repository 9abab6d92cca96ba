use crate::decision::is_blocked;
use std::ffi::CStr;

/// Allow/deny state machine shared by every intercepted entry point.
///
/// `denied` is the entry point's designated failure value (-1 or NULL);
/// `delegate` is invoked only when the request is allowed, and its return
/// value is passed through untouched, including the real implementation's
/// own failures. On denial, errno is set to EACCES and the filesystem is
/// never touched for this path.
///
/// A `None` path is never ours to judge (e.g. freopen(NULL, mode, stream)
/// only changes the stream mode); it always delegates.
pub(crate) fn dispatch<T>(
    path: Option<&CStr>,
    canonical_blocked: &[u8],
    denied: T,
    delegate: impl FnOnce() -> T,
) -> T {
    if let Some(candidate) = path {
        if is_blocked(candidate, canonical_blocked) {
            unsafe {
                *libc::__errno_location() = libc::EACCES;
            }
            return denied;
        }
    }
    delegate()
}
