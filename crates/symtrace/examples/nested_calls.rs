//! Print a backtrace from a few frames deep
//!
//! Build with debug info and run with `--locations` to see file:line
//! resolution through addr2line:
//!
//! ```text
//! cargo run --example nested_calls -- --locations
//! ```

use symtrace_core::{write_backtrace_with_header, BacktraceOptions, ReportHeader};
use symtrace_utils::{init_logging, thread_label, DiagnosticContext};

fn main()
{
    init_logging().expect("Failed to initialize logging");
    let context = DiagnosticContext::new();

    let resolve_locations = std::env::args().any(|arg| arg == "--locations");
    let options = BacktraceOptions {
        resolve_locations,
        ..BacktraceOptions::from_env()
    };

    outer(&context, &options, 3);
}

#[inline(never)]
fn outer(context: &DiagnosticContext, options: &BacktraceOptions, depth: u32)
{
    if depth == 0 {
        report(context, options);
    } else {
        outer(context, options, depth - 1);
    }
}

#[inline(never)]
fn report(context: &DiagnosticContext, options: &BacktraceOptions)
{
    let header = ReportHeader {
        thread: thread_label(),
        timestamp: context.timestamp(),
    };
    let stdout = std::io::stdout();
    write_backtrace_with_header(&mut stdout.lock(), options, &header).expect("stdout closed");
}
