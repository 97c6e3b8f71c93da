//! Symbol line parsing.
//!
//! `backtrace_symbols()` describes each frame in one of two shapes:
//!
//! ```text
//! ./path/to/the/binary(function+offset) [address]
//! ./path/to/the/binary [address]
//! ```
//!
//! Anything else (other libcs, other operating systems) is rejected with a
//! [`ParseError`], and the caller prints the line untouched.

use crate::error::ParseError;
use crate::types::{ParsedSymbol, RawSymbolLine, SymbolOffset};

/// Parse one raw descriptor.
///
/// ## Example
///
/// ```rust
/// use symtrace_core::symbols::parse;
/// use symtrace_core::types::RawSymbolLine;
///
/// let parsed = parse(&RawSymbolLine::from("./prog(_Z3fooi+0x10) [0x4005a0]")).unwrap();
/// assert_eq!(parsed.module, "./prog");
/// assert_eq!(parsed.function(), Some("_Z3fooi"));
/// assert_eq!(parsed.offset(), Some("0x10"));
/// assert_eq!(parsed.address, "0x4005a0");
/// ```
///
/// ## Errors
///
/// Returns the first deviation from both shapes.
pub fn parse(line: &RawSymbolLine) -> Result<ParsedSymbol, ParseError>
{
    parse_str(line.as_str())
}

/// [`parse`] over a plain string slice.
///
/// ## Errors
///
/// See [`parse`].
pub fn parse_str(text: &str) -> Result<ParsedSymbol, ParseError>
{
    let (module, symbol, rest) = match text.find('(') {
        Some(open) => {
            let inner_start = open + 1;
            let close = text[inner_start..]
                .find(')')
                .map(|i| inner_start + i)
                .ok_or(ParseError::MissingCloseParen)?;
            let (function, offset) = text[inner_start..close]
                .split_once('+')
                .ok_or(ParseError::MissingOffset)?;
            let rest = text[close + 1..]
                .strip_prefix(' ')
                .ok_or(ParseError::MissingSeparator)?;
            let symbol = SymbolOffset {
                function: function.to_string(),
                offset: offset.to_string(),
            };
            (&text[..open], Some(symbol), rest)
        }
        None => {
            let bracket = text.find('[').ok_or(ParseError::MissingOpenBracket)?;
            let module = text[..bracket]
                .strip_suffix(' ')
                .ok_or(ParseError::MissingSeparator)?;
            (module, None, &text[bracket..])
        }
    };

    let address = parse_address(rest)?;

    Ok(ParsedSymbol {
        module: module.to_string(),
        symbol,
        address: address.to_string(),
    })
}

/// `[address]` ending the line.
fn parse_address(rest: &str) -> Result<&str, ParseError>
{
    let inner = rest.strip_prefix('[').ok_or(ParseError::MissingOpenBracket)?;
    let close = inner.find(']').ok_or(ParseError::UnterminatedAddress)?;
    if close + 1 != inner.len() {
        return Err(ParseError::TrailingCharacters);
    }

    let address = &inner[..close];
    if address.is_empty() {
        return Err(ParseError::EmptyAddress);
    }
    Ok(address)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_function_shape()
    {
        let parsed = parse_str("./prog(_Z3fooi+0x10) [0x4005a0]").unwrap();
        assert_eq!(parsed.module, "./prog");
        assert_eq!(parsed.function(), Some("_Z3fooi"));
        assert_eq!(parsed.offset(), Some("0x10"));
        assert_eq!(parsed.address, "0x4005a0");
    }

    #[test]
    fn test_parse_module_only_shape()
    {
        let parsed = parse_str("./prog [0x4005a0]").unwrap();
        assert_eq!(parsed.module, "./prog");
        assert_eq!(parsed.symbol, None);
        assert_eq!(parsed.function(), None);
        assert_eq!(parsed.offset(), None);
        assert_eq!(parsed.address, "0x4005a0");
    }

    #[test]
    fn test_parse_anonymous_pie_offset()
    {
        let parsed = parse_str("/usr/bin/prog(+0x1139) [0x55d0c6a3e139]").unwrap();
        let symbol = parsed.symbol.as_ref().unwrap();
        assert!(symbol.is_anonymous());
        assert_eq!(symbol.offset, "0x1139");
    }

    #[test]
    fn test_parse_offset_keeps_later_plus_signs()
    {
        let parsed = parse_str("lib.so(f+0x1+2) [0x1]").unwrap();
        assert_eq!(parsed.function(), Some("f"));
        assert_eq!(parsed.offset(), Some("0x1+2"));
    }

    #[test]
    fn test_parse_rejects_deviations()
    {
        assert_eq!(parse_str("garbage"), Err(ParseError::MissingOpenBracket));
        assert_eq!(parse_str("./prog(_Z3fooi+0x10 [0x1]"), Err(ParseError::MissingCloseParen));
        assert_eq!(parse_str("./prog(_Z3fooi) [0x1]"), Err(ParseError::MissingOffset));
        assert_eq!(parse_str("./prog(_Z3fooi+0x10)[0x1]"), Err(ParseError::MissingSeparator));
        assert_eq!(parse_str("./prog(_Z3fooi+0x10) 0x1"), Err(ParseError::MissingOpenBracket));
        assert_eq!(parse_str("./prog[0x1]"), Err(ParseError::MissingSeparator));
        assert_eq!(parse_str("./prog [0x1"), Err(ParseError::UnterminatedAddress));
        assert_eq!(parse_str("./prog [0x1] "), Err(ParseError::TrailingCharacters));
        assert_eq!(parse_str("./prog [0x1]]"), Err(ParseError::TrailingCharacters));
        assert_eq!(parse_str("./prog []"), Err(ParseError::EmptyAddress));
    }

    #[test]
    fn test_parse_rejects_macos_layout()
    {
        let line = "0   prog                                0x0000000100003f4c main + 28";
        assert!(parse_str(line).is_err());
    }
}
