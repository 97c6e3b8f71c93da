//! # Stack Capture
//!
//! Collects the raw return addresses of the calling thread.

use tracing::{trace, warn};

use crate::error::SymtraceError;
use crate::platform;
use crate::types::StackFrame;

/// Default frame bound used by [`crate::config::BacktraceOptions`].
pub const DEFAULT_MAX_FRAMES: usize = 100;

/// Capture at most `max_frames` return addresses, innermost frame first.
///
/// Best effort: when the stack cannot be walked (corrupted stack, unsupported
/// platform) the result is short or empty instead of an error, and the
/// rest of the pipeline renders whatever was captured. The innermost frames
/// belong to the capture machinery itself.
///
/// ## Example
///
/// ```rust
/// use symtrace_core::capture::capture;
///
/// let frames = capture(16);
/// assert!(frames.len() <= 16);
/// ```
#[inline(never)]
pub fn capture(max_frames: usize) -> Vec<StackFrame>
{
    if max_frames == 0 {
        return Vec::new();
    }

    let frames: Vec<StackFrame> = platform::capture_addresses(max_frames)
        .into_iter()
        .take_while(|addr| !addr.is_null())
        .map(StackFrame::new)
        .collect();

    if frames.is_empty() {
        warn!(error = %SymtraceError::CaptureUnavailable, "Stack capture returned no frames");
    } else {
        trace!(count = frames.len(), max_frames, "Captured stack");
    }
    frames
}
