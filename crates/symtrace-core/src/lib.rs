//! # symtrace-core
//!
//! Backtrace capture and symbolization for crash and diagnostic reports.
//!
//! This crate turns the calling thread's stack into a readable report:
//! - Stack capture through the C runtime's unwinder
//! - Raw symbol descriptors from the loader's symbol table
//! - Parsing of `module(function+offset) [address]` descriptors
//! - C++ and Rust demangling
//! - Optional `file:line` lookup through an external `addr2line` tool
//! - Numbered, one-line-per-frame rendering
//!
//! Nothing in the pipeline panics or returns a hard error because a frame is
//! odd: each stage degrades the frame's text instead. The only error a caller
//! sees is its own output sink failing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symtrace_core::{write_backtrace, BacktraceOptions};
//!
//! let options = BacktraceOptions {
//!     resolve_locations: true,
//!     ..BacktraceOptions::default()
//! };
//! write_backtrace(&mut std::io::stderr(), &options)?;
//! # Ok::<(), symtrace_core::SymtraceError>(())
//! ```
//!
//! ## Platform Support
//!
//! - **Linux (glibc)** and **macOS**: `backtrace(3)` / `backtrace_symbols(3)`.
//!   macOS descriptors use a different layout and are printed verbatim.
//! - **Elsewhere**: capture is empty and resolution reports itself unavailable.
//!
//! ## Why unsafe code is needed
//!
//! Capture and raw resolution call into `<execinfo.h>` and own a `malloc()`ed
//! block returned by it. The FFI is confined to [`platform`]; everything above
//! it is safe Rust.
//!
//! ## Signal safety
//!
//! The pipeline allocates and may spawn processes. It is **not**
//! async-signal-safe; see [`symbolizer`] for how to report from a crash
//! handler.

#![allow(unsafe_code)] // Required for the <execinfo.h> FFI

pub mod capture;
pub mod config;
pub mod error;
pub mod platform;
pub mod prelude;
pub mod report;
pub mod symbolizer;
pub mod symbols;
pub mod types;

pub use capture::capture;
pub use config::{BacktraceOptions, LocationOptions};
// Re-export commonly used types
pub use error::{SymtraceError, SymtraceResult};
pub use report::{format_report, FrameLine, Report, ReportHeader, SENTINEL};
pub use symbolizer::{backtrace_report, print_backtrace, write_backtrace, write_backtrace_with_header, Symbolizer};
pub use types::{Address, ParsedSymbol, RawSymbolLine, ResolvedFrame, StackFrame};
