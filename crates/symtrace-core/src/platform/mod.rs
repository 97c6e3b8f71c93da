//! # Platform Layer
//!
//! Access to the C runtime's stack walker and symbol table facility.
//!
//! glibc and macOS both ship `backtrace(3)` and `backtrace_symbols(3)` in
//! their `<execinfo.h>`. Everywhere else capture yields an empty trace and
//! raw resolution reports itself unavailable, so callers degrade instead of
//! failing to build.

#[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
pub mod execinfo;

/// Whether this target has an `<execinfo.h>` implementation.
pub const EXECINFO_AVAILABLE: bool = cfg!(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"));

/// Capture up to `max_frames` return addresses of the calling thread.
#[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
#[inline(never)]
pub(crate) fn capture_addresses(max_frames: usize) -> Vec<crate::types::Address>
{
    execinfo::walk(max_frames)
}

#[cfg(not(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos")))]
pub(crate) fn capture_addresses(_max_frames: usize) -> Vec<crate::types::Address>
{
    Vec::new()
}

/// Describe each address through the loader's symbol table.
///
/// Returns `None` when the facility fails (out of memory) or does not exist.
#[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
pub(crate) fn symbolize_addresses(addresses: &[crate::types::Address]) -> Option<Vec<String>>
{
    execinfo::SymbolArray::new(addresses).map(|symbols| symbols.lines())
}

#[cfg(not(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos")))]
pub(crate) fn symbolize_addresses(_addresses: &[crate::types::Address]) -> Option<Vec<String>>
{
    None
}
