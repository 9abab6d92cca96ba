// Preload guard that keeps a process from opening files under the
// Kubernetes service account secrets mount. Injected with LD_PRELOAD, it
// overrides the libc open family: every requested path is resolved to its
// canonical form and refused with EACCES if it falls under the blocked
// subtree, otherwise the call is forwarded untouched to the real libc
// implementation.

mod decision;
mod dispatch;
mod state;

// The exported libc symbols would interpose the test harness's own file
// accesses if compiled into the test binary, so they only exist in the
// cdylib build.
#[cfg(not(test))]
mod entry;

pub use state::BLOCKED_PATH;
