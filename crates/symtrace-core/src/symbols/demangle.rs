//! Symbol demangling utilities.
//!
//! Turns the mangled names found in symbol lines back into readable
//! signatures and detects which language produced them.
//!
//! ## Symbol Mangling
//!
//! - **Rust**: legacy (`_ZN...17h<hash>E`) and v0 (`_R...`) schemes, handled
//!   by `rustc_demangle` and printed without the trailing hash
//! - **C++**: Itanium ABI mangling (`_Z...`), handled by `cpp_demangle`
//! - **C**: unmangled, reported as [`DemangleError::NotMangled`]
//!
//! ## Buffer Ownership
//!
//! Every call produces a fresh, Rust-owned `String`; there is no shared or
//! caller-provided output buffer. A C demangler that reallocates an undersized
//! output buffer corrupts the heap when handed a static one, so no API here
//! accepts one.

use cpp_demangle::{DemangleOptions, Symbol};
use rustc_demangle::try_demangle;

use crate::error::DemangleError;
use crate::types::SymbolLanguage;

/// Demangle a symbol name.
///
/// ## Example
///
/// ```rust
/// use symtrace_core::symbols::demangle;
///
/// assert_eq!(demangle("_Z3fooi").unwrap(), "foo(int)");
/// assert!(demangle("main").is_err());
/// ```
///
/// ## Errors
///
/// - `NotMangled`: the name has no mangling prefix (plain C, or empty)
/// - `Malformed`: the name has a prefix but is truncated or invalid
pub fn demangle(mangled: &str) -> Result<String, DemangleError>
{
    match language_of(mangled) {
        SymbolLanguage::C => Err(DemangleError::NotMangled(mangled.to_string())),
        SymbolLanguage::Rust => match try_demangle(mangled) {
            Ok(name) => Ok(format!("{name:#}")),
            // A `_ZN...E` name with something hash-like inside can still be plain C++.
            Err(_) if is_itanium(mangled) => demangle_cpp(mangled),
            Err(err) => Err(DemangleError::Malformed {
                name: mangled.to_string(),
                reason: format!("{err:?}"),
            }),
        },
        SymbolLanguage::Cpp => demangle_cpp(mangled),
    }
}

/// Classify a symbol by its mangling prefix.
///
/// Accepts the extra leading underscore Mach-O adds to every symbol.
pub fn language_of(raw: &str) -> SymbolLanguage
{
    let unprefixed = raw.strip_prefix('_').filter(|s| s.starts_with('_')).unwrap_or(raw);
    if unprefixed.starts_with("_R") || has_rust_hash(unprefixed) {
        SymbolLanguage::Rust
    } else if unprefixed.starts_with("_Z") {
        SymbolLanguage::Cpp
    } else {
        SymbolLanguage::C
    }
}

fn demangle_cpp(mangled: &str) -> Result<String, DemangleError>
{
    let itanium = mangled.strip_prefix('_').filter(|s| s.starts_with("_Z")).unwrap_or(mangled);
    let malformed = |reason: String| DemangleError::Malformed {
        name: mangled.to_string(),
        reason,
    };

    let symbol = Symbol::new(itanium).map_err(|err| malformed(err.to_string()))?;
    symbol
        .demangle(&DemangleOptions::default())
        .map_err(|err| malformed(err.to_string()))
}

fn is_itanium(raw: &str) -> bool
{
    raw.starts_with("_Z") || raw.starts_with("__Z")
}

/// `_ZN...17h<16 hex digits>E`, the legacy Rust mangling.
fn has_rust_hash(raw: &str) -> bool
{
    let Some(body) = raw.strip_prefix("_ZN").and_then(|s| s.strip_suffix('E')) else {
        return false;
    };
    // Byte-wise: names may carry non-ASCII identifiers.
    let body = body.as_bytes();
    body.len() >= 19 && {
        let (prefix, hash) = body.split_at(body.len() - 17);
        prefix.ends_with(b"17") && hash[0] == b'h' && hash[1..].iter().all(u8::is_ascii_hexdigit)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_demangle_cpp()
    {
        assert_eq!(demangle("_Z3fooi").unwrap(), "foo(int)");
        assert_eq!(demangle("_ZN3foo3barEv").unwrap(), "foo::bar()");
    }

    #[test]
    fn test_demangle_macho_prefix()
    {
        assert_eq!(demangle("__Z3fooi").unwrap(), "foo(int)");
    }

    #[test]
    fn test_demangle_rust_legacy_drops_hash()
    {
        let name = demangle("_ZN4core3fmt5write17h0123456789abcdefE").unwrap();
        assert_eq!(name, "core::fmt::write");
    }

    #[test]
    fn test_plain_c_is_not_mangled()
    {
        assert!(matches!(demangle("main"), Err(DemangleError::NotMangled(_))));
        assert!(matches!(demangle(""), Err(DemangleError::NotMangled(_))));
    }

    #[test]
    fn test_truncated_name_is_malformed()
    {
        assert!(matches!(demangle("_Z"), Err(DemangleError::Malformed { .. })));
        assert!(matches!(demangle("_Z3fo"), Err(DemangleError::Malformed { .. })));
    }

    #[test]
    fn test_language_detection()
    {
        assert_eq!(language_of("_ZN4core3fmt5write17h0123456789abcdefE"), SymbolLanguage::Rust);
        assert_eq!(language_of("_RNvCs1234_7mycrate3foo"), SymbolLanguage::Rust);
        assert_eq!(language_of("_Z3fooi"), SymbolLanguage::Cpp);
        assert_eq!(language_of("__Z3fooi"), SymbolLanguage::Cpp);
        assert_eq!(language_of("memcpy"), SymbolLanguage::C);
    }

    #[test]
    fn test_non_ascii_names_do_not_panic()
    {
        assert!(demangle("_ZNaé0123456789abcdefE").is_err());
        assert_eq!(language_of("_ZNaé0123456789abcdefE"), SymbolLanguage::Cpp);
        assert_eq!(language_of("_ZN4é17h0123456789abcdefE"), SymbolLanguage::Rust);
    }

    #[test]
    fn test_malformed_rust_name_reports_reason()
    {
        let Err(DemangleError::Malformed { name, reason }) = demangle("_Rgarbage") else {
            panic!("expected a malformed v0 name");
        };
        assert_eq!(name, "_Rgarbage");
        assert!(!reason.is_empty());
    }

    #[test]
    fn test_language_labels()
    {
        assert_eq!(SymbolLanguage::Rust.to_string(), "rust");
        assert_eq!(SymbolLanguage::Cpp.to_string(), "c++");
        assert_eq!(SymbolLanguage::C.to_string(), "c");
    }

    #[test]
    fn test_repeated_calls_do_not_share_buffers()
    {
        let long = demangle("_ZN9namespace5inner10some_classIiE13long_functionEv").unwrap();
        let short = demangle("_Z3fooi").unwrap();
        assert_eq!(short, "foo(int)");
        assert!(long.contains("long_function"));
    }
}
