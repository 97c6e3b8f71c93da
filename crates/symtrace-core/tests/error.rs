//! Tests for error handling

use symtrace_core::error::{DemangleError, ParseError, SymtraceError, SymtraceResult};

#[test]
fn test_parse_error_display()
{
    let error = SymtraceError::from(ParseError::MissingCloseParen);
    let message = format!("{}", error);
    assert!(message.contains("Unrecognized symbol line"));
    assert!(message.contains("parenthesis"));
}

#[test]
fn test_demangle_error_display()
{
    let error = SymtraceError::from(DemangleError::NotMangled("main".to_string()));
    let message = format!("{}", error);
    assert!(message.contains("Demangling failed"));
    assert!(message.contains("main"));
}

#[test]
fn test_resolution_unavailable_display()
{
    let error = SymtraceError::ResolutionUnavailable("backtrace_symbols returned NULL".to_string());
    let message = format!("{}", error);
    assert!(message.contains("unavailable"));
    assert!(message.contains("NULL"));
}

#[test]
fn test_io_error_conversion()
{
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
    let error: SymtraceError = io.into();
    match error {
        SymtraceError::Io(_) => {
            // Expected: sink failures keep their io::Error
        }
        _ => panic!("Expected Io variant"),
    }
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: SymtraceResult<()> = Ok(());
    let _error_result: SymtraceResult<()> = Err(SymtraceError::CaptureUnavailable);
}
