//! # symtrace Utilities
//!
//! Shared utilities, logging, and diagnostic context for symtrace.
//!
//! This crate provides the ambient pieces around the symbolization pipeline:
//! logging infrastructure built on `tracing`, and the clock and thread
//! collaborators used to annotate reports.

pub mod context;
pub mod logging;

pub use context::{thread_label, DiagnosticContext};
// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
