use std::ffi::{CStr, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Decide whether a requested path falls under the blocked subtree.
///
/// The candidate is first resolved to its canonical, symlink-free absolute
/// form. When resolution fails (path does not exist yet, dangling symlink,
/// unreadable parent) the literal bytes are compared instead, so a path
/// cannot bypass the check merely by not being resolvable.
///
/// Matching is a plain byte prefix comparison against the canonical blocked
/// prefix. When the blocked directory existed at initialization its canonical
/// form carries no trailing separator, so a sibling whose name merely extends
/// the blocked name is matched too. Known boundary of the byte-prefix rule,
/// kept as-is; see DESIGN.md.
pub(crate) fn is_blocked(candidate: &CStr, canonical_blocked: &[u8]) -> bool {
    let requested = Path::new(OsStr::from_bytes(candidate.to_bytes()));
    match std::fs::canonicalize(requested) {
        Ok(resolved) => resolved.as_os_str().as_bytes().starts_with(canonical_blocked),
        Err(_) => candidate.to_bytes().starts_with(canonical_blocked),
    }
}
