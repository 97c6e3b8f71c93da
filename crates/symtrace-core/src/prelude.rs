//! Common module for library exports

pub use crate::config::{BacktraceOptions, LocationOptions};
pub use crate::error::{DemangleError, ParseError, SymtraceError, SymtraceResult};
pub use crate::report::{FrameLine, Report, ReportHeader};
pub use crate::symbolizer::Symbolizer;
pub use crate::symbols::{demangle, parse, resolve_location, resolve_raw, SymbolResolver};
pub use crate::types::{Address, ParsedSymbol, RawSymbolLine, ResolvedFrame, StackFrame};
