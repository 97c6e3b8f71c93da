//! # Symbolizer
//!
//! Drives the pipeline for one request:
//!
//! ```text
//! capture -> resolve_raw -> parse -> { demangle, resolve_location } -> format
//! ```
//!
//! Every failure degrades to text. Per frame:
//!
//! | Stage fails        | Printed instead            |
//! |--------------------|----------------------------|
//! | raw resolution     | `(too little memory for backtrace)`, no frames |
//! | parse              | the raw line               |
//! | no function        | `?`                        |
//! | demangle           | `function+offset`          |
//! | source location    | `<address> (<module>)`     |
//!
//! ## Signal Handlers
//!
//! Resolution allocates and location lookup spawns processes; neither is
//! async-signal-safe. From a crash handler, record the raw lines (for
//! example with `backtrace_symbols_fd`) and symbolize them later in a normal
//! context with [`Symbolizer::symbolize_lines`] or `symtrace symbolize`.

use std::io::Write;

use tracing::{debug, warn};

use crate::capture::capture;
use crate::config::BacktraceOptions;
use crate::error::{SymtraceError, SymtraceResult};
use crate::report::{FrameLine, Report, ReportHeader};
use crate::symbols::{demangle, parse, ExecinfoResolver, LocationResolver, SymbolResolver};
use crate::types::{ParsedSymbol, RawSymbolLine, ResolvedFrame, StackFrame};

/// Turns frames or raw descriptor lines into a [`Report`].
///
/// Holds configuration only; each call is independent.
#[derive(Debug)]
pub struct Symbolizer<R = ExecinfoResolver>
{
    resolver: R,
    locations: LocationResolver,
    resolve_locations: bool,
}

impl Symbolizer<ExecinfoResolver>
{
    /// Symbolizer backed by the process symbol table.
    pub fn new(options: &BacktraceOptions) -> Self
    {
        Self::with_resolver(ExecinfoResolver, options)
    }
}

impl Default for Symbolizer<ExecinfoResolver>
{
    fn default() -> Self
    {
        Self::new(&BacktraceOptions::default())
    }
}

impl<R: SymbolResolver> Symbolizer<R>
{
    /// Symbolizer backed by a custom raw resolver.
    pub fn with_resolver(resolver: R, options: &BacktraceOptions) -> Self
    {
        Self {
            resolver,
            locations: LocationResolver::new(options.location.clone()),
            resolve_locations: options.resolve_locations,
        }
    }

    /// The location resolver, for inspecting how many tools were started.
    pub fn location_resolver(&self) -> &LocationResolver
    {
        &self.locations
    }

    /// Symbolize captured frames.
    ///
    /// Degrades to [`Report::Unavailable`] when the raw resolver fails or
    /// returns a different number of lines than there are frames.
    pub fn symbolize(&self, frames: &[StackFrame]) -> Report
    {
        let Some(lines) = self.resolver.resolve_raw(frames) else {
            return Report::Unavailable;
        };

        if lines.len() != frames.len() {
            let reason = format!("{} lines for {} frames", lines.len(), frames.len());
            warn!(error = %SymtraceError::ResolutionUnavailable(reason), "Discarding misaligned symbol lines");
            return Report::Unavailable;
        }

        self.symbolize_lines(&lines)
    }

    /// Symbolize descriptor lines that were recorded earlier.
    pub fn symbolize_lines(&self, lines: &[RawSymbolLine]) -> Report
    {
        Report::Frames(
            lines
                .iter()
                .enumerate()
                .map(|(i, line)| self.resolve_frame(i + 1, line))
                .collect(),
        )
    }

    fn resolve_frame(&self, index: usize, line: &RawSymbolLine) -> FrameLine
    {
        match parse(line) {
            Ok(parsed) => FrameLine::Resolved(ResolvedFrame {
                index,
                display_name: display_name(&parsed),
                location: self.location(&parsed),
            }),
            Err(err) => {
                debug!(index, line = %line, error = %SymtraceError::Parse(err), "Printing raw symbol line");
                FrameLine::Raw {
                    index,
                    text: line.text.clone(),
                }
            }
        }
    }

    fn location(&self, parsed: &ParsedSymbol) -> String
    {
        // Anonymous frames carry a module-relative offset, which is what the
        // tool needs for position-independent modules.
        let query = match &parsed.symbol {
            Some(symbol) if symbol.is_anonymous() => symbol.offset.as_str(),
            _ => parsed.address.as_str(),
        };

        self.locations
            .resolve(&parsed.module, query, self.resolve_locations)
            .unwrap_or_else(|| parsed.fallback_location())
    }
}

/// Name to print for a parsed frame.
///
/// `?` without a function name, the demangled name when demangling works,
/// `function+offset` otherwise.
pub fn display_name(parsed: &ParsedSymbol) -> String
{
    match &parsed.symbol {
        None => "?".to_string(),
        Some(symbol) if symbol.is_anonymous() => "?".to_string(),
        Some(symbol) => demangle(&symbol.function).unwrap_or_else(|err| {
            debug!(function = %symbol.function, error = %SymtraceError::Demangle(err), "Printing mangled name");
            format!("{}+{}", symbol.function, symbol.offset)
        }),
    }
}

/// Capture the calling thread's stack and symbolize it.
#[inline(never)]
pub fn backtrace_report(options: &BacktraceOptions) -> Report
{
    let frames = capture(options.max_frames);
    Symbolizer::new(options).symbolize(&frames)
}

/// Write the calling thread's backtrace to `out`.
///
/// ## Errors
///
/// Only failures of `out` itself are returned; symbolization problems are
/// already folded into the text.
#[inline(never)]
pub fn write_backtrace<W: Write>(out: &mut W, options: &BacktraceOptions) -> SymtraceResult<()>
{
    let report = backtrace_report(options);
    out.write_all(report.to_string().as_bytes())?;
    out.flush()?;
    Ok(())
}

/// [`write_backtrace`] preceded by a header line.
///
/// ## Errors
///
/// Only failures of `out` itself are returned.
#[inline(never)]
pub fn write_backtrace_with_header<W: Write>(
    out: &mut W,
    options: &BacktraceOptions,
    header: &ReportHeader,
) -> SymtraceResult<()>
{
    let report = backtrace_report(options);
    writeln!(out, "{header}")?;
    out.write_all(report.to_string().as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Print the calling thread's backtrace to standard error.
///
/// A standard error that cannot be written to is ignored.
#[inline(never)]
pub fn print_backtrace(resolve_locations: bool)
{
    let options = BacktraceOptions {
        resolve_locations,
        ..BacktraceOptions::default()
    };
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    if let Err(err) = write_backtrace(&mut out, &options) {
        debug!(error = %err, "Could not write backtrace to stderr");
    }
}
