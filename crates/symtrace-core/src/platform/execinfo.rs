//! # `<execinfo.h>` FFI
//!
//! Declarations and RAII ownership for the C runtime's backtrace facility.
//!
//! ## Ownership
//!
//! `backtrace_symbols()` returns a single `malloc()`ed block holding the
//! pointer array and every string it points to. The caller must `free()` that
//! block exactly once and must not free the individual strings.
//! [`SymbolArray`] owns the block, copies the strings out into Rust-owned
//! memory, and frees the block when dropped.
//!
//! ## Safety Notes
//!
//! Neither function is async-signal-safe: the first call to `backtrace()` may
//! load `libgcc_s`, and `backtrace_symbols()` allocates. Do not call into this
//! module from a signal handler.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::ptr::NonNull;

use crate::types::Address;

extern "C" {
    /// Fill `buffer` with up to `size` return addresses; returns how many.
    fn backtrace(buffer: *mut *mut c_void, size: c_int) -> c_int;

    /// Translate return addresses into `module(function+offset) [address]`
    /// descriptors.
    ///
    /// Returns NULL when the allocation fails.
    fn backtrace_symbols(buffer: *const *mut c_void, size: c_int) -> *mut *mut c_char;
}

/// Walk the calling thread's stack, innermost frame first.
///
/// The walk stops early at the bottom of the stack or when the unwinder
/// cannot continue; a short or empty result is not an error.
#[inline(never)]
pub fn walk(max_frames: usize) -> Vec<Address>
{
    let capacity = max_frames.min(c_int::MAX as usize);
    if capacity == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<*mut c_void> = vec![std::ptr::null_mut(); capacity];
    // SAFETY: `buffer` holds `capacity` writable slots.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let depth = unsafe { backtrace(buffer.as_mut_ptr(), capacity as c_int) };
    let depth = usize::try_from(depth).unwrap_or(0).min(capacity);

    buffer[..depth].iter().map(|&ptr| Address::from_ptr(ptr)).collect()
}

/// Owned result of `backtrace_symbols()`.
///
/// Freed exactly once, on drop.
pub struct SymbolArray
{
    strings: NonNull<*mut c_char>,
    len: usize,
}

impl SymbolArray
{
    /// Ask the loader to describe `addresses`.
    ///
    /// Returns `None` if the facility could not allocate its result.
    pub fn new(addresses: &[Address]) -> Option<Self>
    {
        let len = addresses.len().min(c_int::MAX as usize);
        let frames: Vec<*mut c_void> = addresses[..len].iter().map(|addr| addr.as_ptr()).collect();

        // SAFETY: `frames` holds `len` entries; the result is owned by `Self`.
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let raw = unsafe { backtrace_symbols(frames.as_ptr(), len as c_int) };
        NonNull::new(raw).map(|strings| Self { strings, len })
    }

    /// Number of descriptors (equal to the number of addresses requested).
    pub fn len(&self) -> usize
    {
        self.len
    }

    /// Whether no descriptors were requested.
    pub fn is_empty(&self) -> bool
    {
        self.len == 0
    }

    /// Copy every descriptor into an owned `String`.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; a NULL entry becomes an
    /// empty string so the result stays index-aligned with the addresses.
    pub fn lines(&self) -> Vec<String>
    {
        (0..self.len)
            .map(|i| {
                // SAFETY: `strings` points to `len` entries allocated by
                // backtrace_symbols and stays alive until `self` is dropped.
                let entry = unsafe { *self.strings.as_ptr().add(i) };
                if entry.is_null() {
                    String::new()
                } else {
                    // SAFETY: non-NULL entries are NUL-terminated C strings.
                    unsafe { CStr::from_ptr(entry) }.to_string_lossy().into_owned()
                }
            })
            .collect()
    }
}

impl Drop for SymbolArray
{
    fn drop(&mut self)
    {
        // SAFETY: the block came from malloc() inside backtrace_symbols and is
        // freed nowhere else.
        unsafe { libc::free(self.strings.as_ptr().cast()) };
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_backtrace_respects_bound()
    {
        let frames = walk(2);
        assert!(frames.len() <= 2);
        assert!(walk(0).is_empty());
    }

    #[test]
    fn test_symbol_array_is_index_aligned()
    {
        let frames = walk(8);
        if let Some(symbols) = SymbolArray::new(&frames) {
            assert_eq!(symbols.len(), frames.len());
            assert_eq!(symbols.lines().len(), frames.len());
        }
    }
}
