//! Tests for symbol line parsing and demangling

use symtrace_core::error::{DemangleError, ParseError};
use symtrace_core::symbols::{demangle, parse, parse_str};
use symtrace_core::types::RawSymbolLine;

const FUNCTION_LINES: &[&str] = &[
    "./prog(_Z3fooi+0x10) [0x4005a0]",
    "/usr/lib/libstdc++.so.6(_ZNSt6thread4joinEv+0x3c) [0x7f1e9b0dc253]",
    "/lib/x86_64-linux-gnu/libc.so.6(__libc_start_main+0xf3) [0x7f1e9ad2c083]",
    "./target/debug/app(+0x4b2e1) [0x5581a7c4b2e1]",
];

const MODULE_LINES: &[&str] = &["./prog [0x4005a0]", "linux-vdso.so.1 [0x7ffd3a9f1000]", "/opt/app/bin/server [0xdeadbeef]"];

#[test]
fn test_function_lines_round_trip()
{
    for line in FUNCTION_LINES {
        let parsed = parse(&RawSymbolLine::from(*line)).unwrap();
        assert!(parsed.function().is_some());
        assert!(parsed.offset().is_some());
        assert_eq!(parsed.to_string(), *line);
    }
}

#[test]
fn test_module_lines_have_no_function()
{
    for line in MODULE_LINES {
        let parsed = parse_str(line).unwrap();
        assert_eq!(parsed.function(), None);
        assert_eq!(parsed.offset(), None);
        assert!(!parsed.address.is_empty());
        assert_eq!(parsed.to_string(), *line);
    }
}

#[test]
fn test_lines_must_end_with_bracket()
{
    for line in FUNCTION_LINES.iter().chain(MODULE_LINES) {
        let truncated = &line[..line.len() - 1];
        assert!(parse_str(truncated).is_err(), "accepted {truncated:?}");

        let trailing = format!("{line}\n");
        assert_eq!(parse_str(&trailing), Err(ParseError::TrailingCharacters));
    }
}

#[test]
fn test_garbage_is_rejected()
{
    assert!(parse_str("garbage").is_err());
    assert!(parse_str("").is_err());
}

#[test]
fn test_demangle_produces_readable_names()
{
    let name = demangle("_ZNSt6thread4joinEv").unwrap();
    assert!(!name.starts_with("_Z"));
    assert_eq!(name, "std::thread::join()");
    assert_eq!(demangle("_Z3fooi").unwrap(), "foo(int)");
}

#[test]
fn test_demangle_rejects_plain_c()
{
    for name in ["main", "__libc_start_main", "memcpy"] {
        assert_eq!(demangle(name), Err(DemangleError::NotMangled(name.to_string())));
    }
}
