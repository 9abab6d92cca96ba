use core::ffi::c_void;
use libc::{c_char, c_int, mode_t, FILE};
use std::os::unix::ffi::OsStringExt;
use std::sync::OnceLock;

/// Directory subtree the guard refuses to open, baked in at build time.
pub const BLOCKED_PATH: &str = "/var/run/secrets/kubernetes.io/";

type OpenFn = unsafe extern "C" fn(*const c_char, c_int) -> c_int;
type OpenWithModeFn = unsafe extern "C" fn(*const c_char, c_int, mode_t) -> c_int;
type FopenFn = unsafe extern "C" fn(*const c_char, *const c_char) -> *mut FILE;
type FreopenFn = unsafe extern "C" fn(*const c_char, *const c_char, *mut FILE) -> *mut FILE;

// Address of a real libc entry point, resolved once with dlsym(RTLD_NEXT).
// Null if resolution failed (a deployment bug; callers fail closed).
pub(crate) struct RealFn(*mut c_void);

// Raw symbol addresses are plain immutable data once resolved
unsafe impl Send for RealFn {}
unsafe impl Sync for RealFn {}

impl RealFn {
    fn resolve_next(name: &'static [u8]) -> Self {
        debug_assert_eq!(name.last(), Some(&0));
        Self(unsafe { libc::dlsym(libc::RTLD_NEXT, name.as_ptr() as *const c_char) })
    }

    fn deny_errno() {
        unsafe {
            *libc::__errno_location() = libc::EACCES;
        }
    }

    /// Delegate an open()-family call, forwarding the creation mode only when
    /// the flags say the kernel will consume it. The two typed signatures
    /// replace the C variadic calling convention.
    pub(crate) unsafe fn call_open(
        &self,
        path: *const c_char,
        flags: c_int,
        mode: Option<mode_t>,
    ) -> c_int {
        if self.0.is_null() {
            Self::deny_errno();
            return -1;
        }
        match mode {
            Some(mode) => {
                let real: OpenWithModeFn = core::mem::transmute(self.0);
                real(path, flags, mode)
            }
            None => {
                let real: OpenFn = core::mem::transmute(self.0);
                real(path, flags)
            }
        }
    }

    pub(crate) unsafe fn call_fopen(
        &self,
        path: *const c_char,
        mode: *const c_char,
    ) -> *mut FILE {
        if self.0.is_null() {
            Self::deny_errno();
            return core::ptr::null_mut();
        }
        let real: FopenFn = core::mem::transmute(self.0);
        real(path, mode)
    }

    pub(crate) unsafe fn call_freopen(
        &self,
        path: *const c_char,
        mode: *const c_char,
        stream: *mut FILE,
    ) -> *mut FILE {
        if self.0.is_null() {
            Self::deny_errno();
            return core::ptr::null_mut();
        }
        let real: FreopenFn = core::mem::transmute(self.0);
        real(path, mode, stream)
    }
}

/// Interception table: the real implementation behind each symbol we export.
pub(crate) struct RealFns {
    pub(crate) open: RealFn,
    pub(crate) open64: RealFn,
    pub(crate) fopen: RealFn,
    pub(crate) fopen64: RealFn,
    pub(crate) freopen: RealFn,
    pub(crate) freopen64: RealFn,
}

pub(crate) struct GuardState {
    pub(crate) canonical_blocked: Vec<u8>,
    pub(crate) real: RealFns,
}

static STATE: OnceLock<GuardState> = OnceLock::new();

/// Process-wide immutable guard state. Normally constructed by the load-time
/// hook below, before any application thread exists; the lazy path only
/// matters if an entry point somehow runs first, and produces the same value.
pub(crate) fn guard_state() -> &'static GuardState {
    STATE.get_or_init(GuardState::resolve)
}

impl GuardState {
    fn resolve() -> Self {
        let canonical_blocked = match std::fs::canonicalize(BLOCKED_PATH) {
            Ok(resolved) => resolved.into_os_string().into_vec(),
            // The directory may not exist yet at load time: keep matching the
            // literal configured string rather than running with no prefix at
            // all.
            Err(_) => BLOCKED_PATH.as_bytes().to_vec(),
        };
        Self {
            canonical_blocked,
            real: RealFns {
                open: RealFn::resolve_next(b"open\0"),
                open64: RealFn::resolve_next(b"open64\0"),
                fopen: RealFn::resolve_next(b"fopen\0"),
                fopen64: RealFn::resolve_next(b"fopen64\0"),
                freopen: RealFn::resolve_next(b"freopen\0"),
                freopen64: RealFn::resolve_next(b"freopen64\0"),
            },
        }
    }
}

// Run during the dynamic loader's single-threaded load phase, before the
// host process's entry point, so the state is published before any
// intercepted call can execute.
#[cfg(not(test))]
#[used]
#[link_section = ".init_array"]
static GUARD_INIT: extern "C" fn() = {
    extern "C" fn guard_init() {
        let _ = guard_state();
    }
    guard_init
};
