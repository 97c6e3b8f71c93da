//! # Error Types
//!
//! Error taxonomy for the symbolization pipeline.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! None of these errors escape a backtrace request as a hard failure. Every
//! stage converts its error into a textual fallback for the affected frame (or
//! for the whole report), because the pipeline usually runs while the process
//! is already failing. The types still exist so each stage has an explicit,
//! testable failure contract.

use thiserror::Error;

/// Main error type for the symbolization pipeline
///
/// ## Error Categories
///
/// 1. **Capture errors**: CaptureUnavailable (degrade to an empty trace)
/// 2. **Resolution errors**: ResolutionUnavailable (degrade to the sentinel report)
/// 3. **Per-frame errors**: Parse, Demangle, LocationUnavailable (degrade one frame)
/// 4. **I/O errors**: Io (the caller-supplied sink failed)
#[derive(Error, Debug)]
pub enum SymtraceError
{
    /// Stack unwinding is impossible on this platform or for this stack
    #[error("Stack capture unavailable")]
    CaptureUnavailable,

    /// The symbol table facility is out of memory or missing
    ///
    /// The report degrades to `(too little memory for backtrace)`.
    #[error("Symbol resolution unavailable: {0}")]
    ResolutionUnavailable(String),

    /// A raw symbol line did not match any known shape
    #[error("Unrecognized symbol line: {0}")]
    Parse(#[from] ParseError),

    /// A function name could not be demangled
    #[error("Demangling failed: {0}")]
    Demangle(#[from] DemangleError),

    /// No source location could be produced for a frame
    ///
    /// Covers a missing line-resolution tool, a timeout, or a frame without
    /// debug information.
    #[error("Source location unavailable: {0}")]
    LocationUnavailable(String),

    /// I/O error while writing a report to its sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a raw symbol line fails to parse.
///
/// Recognized shapes are `module(function+offset) [address]` and
/// `module [address]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError
{
    /// A `(` was found without a matching `)`
    #[error("missing closing parenthesis")]
    MissingCloseParen,

    /// The parenthesised part has no `+` separating function and offset
    #[error("missing '+' between function and offset")]
    MissingOffset,

    /// The `[address]` part is not preceded by exactly one space
    #[error("missing space before address")]
    MissingSeparator,

    /// No `[` introduces the address
    #[error("missing opening bracket")]
    MissingOpenBracket,

    /// The address has no closing `]`
    #[error("missing closing bracket")]
    UnterminatedAddress,

    /// Characters follow the closing `]`
    #[error("trailing characters after address")]
    TrailingCharacters,

    /// The brackets contain nothing
    #[error("empty address")]
    EmptyAddress,
}

/// Reasons a symbol name cannot be demangled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DemangleError
{
    /// The name carries no known mangling prefix (plain C identifier)
    #[error("not a mangled name: {0:?}")]
    NotMangled(String),

    /// The name looks mangled but the transform rejected it
    #[error("malformed mangled name {name:?}: {reason}")]
    Malformed
    {
        /// The offending input
        name: String,
        /// Demangler diagnostic
        reason: String,
    },
}

/// Convenience type alias for `Result<T, SymtraceError>`
///
/// ```rust
/// use symtrace_core::error::SymtraceResult;
/// fn foo() -> SymtraceResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type SymtraceResult<T> = std::result::Result<T, SymtraceError>;
