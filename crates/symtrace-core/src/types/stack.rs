//! Stack frame types.

use super::Address;

/// One captured call-stack entry.
///
/// Frames are produced innermost-first by [`crate::capture::capture`] and live
/// only as long as the symbolization request that captured them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackFrame
{
    /// Return address of the frame.
    pub address: Address,
}

impl StackFrame
{
    /// Build a frame from a return address.
    pub const fn new(address: Address) -> Self
    {
        Self { address }
    }
}

impl From<Address> for StackFrame
{
    fn from(address: Address) -> Self
    {
        Self::new(address)
    }
}
