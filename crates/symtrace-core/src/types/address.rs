//! Return-address type.

use std::ffi::c_void;
use std::fmt;

/// Strongly typed code address (one machine word)
///
/// Wraps the raw return addresses produced by stack capture so they cannot be
/// confused with offsets, frame counts, or other integers flowing through the
/// pipeline.
///
/// ## Example
///
/// ```rust
/// use symtrace_core::types::Address;
///
/// let addr = Address::from(0x4005a0);
/// assert_eq!(addr.value(), 0x4005a0);
/// assert_eq!(addr.to_string(), "0x4005a0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// Never a valid return address; unwinding stops when it is reached.
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Build an address from a captured instruction pointer
    pub fn from_ptr(ptr: *const c_void) -> Self
    {
        Address(ptr as usize as u64)
    }

    /// Pointer form, for handing addresses back to the C runtime
    ///
    /// Addresses that do not fit in a pointer (only possible for values that
    /// were never captured on this machine) are truncated.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_ptr(self) -> *mut c_void
    {
        self.0 as usize as *mut c_void
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

/// Formats like `backtrace_symbols(3)` does: lowercase hex, no padding.
impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_display_matches_execinfo_format()
    {
        assert_eq!(Address::new(0x4005a0).to_string(), "0x4005a0");
        assert_eq!(Address::ZERO.to_string(), "0x0");
        assert_eq!(format!("{:#x}", Address::new(0xff)), "0xff");
    }

    #[test]
    fn test_pointer_round_trip()
    {
        let addr = Address::new(0x1000);
        assert_eq!(Address::from_ptr(addr.as_ptr()), addr);
        assert!(Address::ZERO.is_null());
        assert!(!addr.is_null());
    }
}
