//! Raw symbol resolution.
//!
//! Turns captured addresses into the loader's textual descriptors, one per
//! frame, without interpreting them.

use tracing::{debug, warn};

use crate::error::SymtraceError;
use crate::platform;
use crate::types::{RawSymbolLine, StackFrame};

/// Source of raw per-frame symbol descriptors.
///
/// Implementations must return exactly one line per frame, in frame order,
/// or `None` when they cannot describe the frames at all.
pub trait SymbolResolver
{
    fn resolve_raw(&self, frames: &[StackFrame]) -> Option<Vec<RawSymbolLine>>;
}

/// Resolver backed by `backtrace_symbols(3)`.
///
/// Allocates, so it must not run inside a signal handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecinfoResolver;

impl SymbolResolver for ExecinfoResolver
{
    fn resolve_raw(&self, frames: &[StackFrame]) -> Option<Vec<RawSymbolLine>>
    {
        if frames.is_empty() {
            return Some(Vec::new());
        }

        let addresses: Vec<_> = frames.iter().map(|frame| frame.address).collect();
        let Some(lines) = platform::symbolize_addresses(&addresses) else {
            let reason = if platform::EXECINFO_AVAILABLE {
                "backtrace_symbols returned NULL"
            } else {
                "no symbol table facility on this platform"
            };
            warn!(error = %SymtraceError::ResolutionUnavailable(reason.to_string()), "Raw symbol resolution failed");
            return None;
        };

        debug!(count = lines.len(), "Resolved raw symbol lines");
        Some(lines.into_iter().map(RawSymbolLine::new).collect())
    }
}

/// Resolver that replays lines recorded earlier, e.g. by
/// `backtrace_symbols_fd` from a crash handler.
///
/// The frames passed in are ignored; the recorded lines are returned as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedResolver
{
    lines: Vec<RawSymbolLine>,
}

impl FixedResolver
{
    pub fn new<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<RawSymbolLine>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Recorded lines.
    pub fn lines(&self) -> &[RawSymbolLine]
    {
        &self.lines
    }
}

impl SymbolResolver for FixedResolver
{
    fn resolve_raw(&self, _frames: &[StackFrame]) -> Option<Vec<RawSymbolLine>>
    {
        Some(self.lines.clone())
    }
}

/// Resolve `frames` through the process symbol table.
///
/// Shorthand for [`ExecinfoResolver::resolve_raw`].
pub fn resolve_raw(frames: &[StackFrame]) -> Option<Vec<RawSymbolLine>>
{
    ExecinfoResolver.resolve_raw(frames)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::capture::capture;

    #[test]
    fn test_empty_frames_resolve_to_empty_lines()
    {
        assert_eq!(resolve_raw(&[]), Some(Vec::new()));
    }

    #[test]
    fn test_fixed_resolver_replays_lines()
    {
        let resolver = FixedResolver::new(["./prog [0x1]", "./prog [0x2]"]);
        let lines = resolver.resolve_raw(&[]).unwrap();
        assert_eq!(lines, resolver.lines());
        assert_eq!(lines[1].as_str(), "./prog [0x2]");
    }

    #[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
    #[test]
    fn test_lines_are_order_correlated_with_frames()
    {
        let frames = capture(32);
        let lines = resolve_raw(&frames).expect("symbol table available");
        assert_eq!(lines.len(), frames.len());
    }
}
