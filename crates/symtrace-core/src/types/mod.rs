//! # Types
//!
//! Data carried between the pipeline stages. Nothing here outlives a single
//! symbolization request.

pub mod address;
pub mod stack;
pub mod symbols;

// Re-export all public types
pub use address::Address;
pub use stack::StackFrame;
pub use symbols::{ParsedSymbol, RawSymbolLine, ResolvedFrame, SymbolLanguage, SymbolOffset};
