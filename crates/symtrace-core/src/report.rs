//! # Report Formatting
//!
//! Renders resolved frames as text. Pure: no I/O, same input, same output.
//!
//! ```text
//! 1: foo(int) at 0x4005a0 (./prog)
//! 2: ? at 0x4005c3 (./prog)
//! 3: <raw line the parser did not recognize>
//! ```

use std::fmt;

use crate::types::ResolvedFrame;

/// Line written instead of frames when no descriptors could be produced.
pub const SENTINEL: &str = "(too little memory for backtrace)";

/// One rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameLine
{
    /// Frame whose descriptor was parsed.
    Resolved(ResolvedFrame),
    /// Frame whose descriptor was unrecognized and is printed verbatim.
    Raw
    {
        /// 1-based position in the report.
        index: usize,
        /// The descriptor as the loader produced it.
        text: String,
    },
}

impl FrameLine
{
    /// 1-based position in the report.
    pub fn index(&self) -> usize
    {
        match self {
            FrameLine::Resolved(frame) => frame.index,
            FrameLine::Raw { index, .. } => *index,
        }
    }
}

impl fmt::Display for FrameLine
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            FrameLine::Resolved(frame) => write!(f, "{}: {} at {}", frame.index, frame.display_name, frame.location),
            FrameLine::Raw { index, text } => write!(f, "{index}: {text}"),
        }
    }
}

/// Outcome of one symbolization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report
{
    /// One line per captured frame.
    Frames(Vec<FrameLine>),
    /// The symbol table facility failed; only the sentinel is printed.
    Unavailable,
}

impl Report
{
    /// Frames of the report (empty when unavailable).
    pub fn frames(&self) -> &[FrameLine]
    {
        match self {
            Report::Frames(frames) => frames,
            Report::Unavailable => &[],
        }
    }

    /// Whether the report degraded to the sentinel.
    pub fn is_unavailable(&self) -> bool
    {
        matches!(self, Report::Unavailable)
    }
}

/// Every line, including the last, ends with `\n`.
impl fmt::Display for Report
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Report::Frames(frames) => {
                for frame in frames {
                    writeln!(f, "{frame}")?;
                }
                Ok(())
            }
            Report::Unavailable => writeln!(f, "{SENTINEL}"),
        }
    }
}

/// Render a report to a string.
pub fn format_report(report: &Report) -> String
{
    report.to_string()
}

/// Context line written above a report.
///
/// Built by the caller from its thread and clock collaborators; the
/// formatter only prints it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader
{
    /// Thread that produced the report.
    pub thread: String,
    /// Time the report was produced.
    pub timestamp: String,
}

impl fmt::Display for ReportHeader
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "Backtrace (thread {}, {}):", self.thread, self.timestamp)
    }
}
