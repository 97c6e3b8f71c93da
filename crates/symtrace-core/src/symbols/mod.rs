//! # Symbols
//!
//! Everything between a captured address and a printable frame:
//!
//! - [`resolver`]: raw descriptors from the loader's symbol table
//! - [`parse`](mod@parse): descriptor text to [`ParsedSymbol`](crate::types::ParsedSymbol)
//! - [`demangle`](mod@demangle): mangled names to readable signatures
//! - [`location`]: `file:line` through an external tool
//!
//! Each stage reports failure through its own error or `None`; turning those
//! into fallback text is the job of [`crate::symbolizer`].

pub mod demangle;
pub mod location;
pub mod parse;
pub mod resolver;

pub use demangle::{demangle, language_of};
pub use location::{resolve_location, LocationResolver};
pub use parse::{parse, parse_str};
pub use resolver::{resolve_raw, ExecinfoResolver, FixedResolver, SymbolResolver};
