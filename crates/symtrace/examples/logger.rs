//! Example showing the pipeline's log events
//!
//! Run with `RUST_LOG=symtrace_core=debug` to see every fallback the
//! symbolizer takes, or `SYMTRACE_LOG_FORMAT=json` for JSON output.

use symtrace_core::{RawSymbolLine, Symbolizer};
use symtrace_utils::init_logging;

fn main()
{
    init_logging().expect("Failed to initialize logging");

    let recorded = [
        "./prog(_Z3fooi+0x10) [0x4005a0]",
        "./prog(main+0x2a) [0x4005ca]",
        "./prog [0x4004e5]",
        "garbage",
    ];
    let lines: Vec<RawSymbolLine> = recorded.iter().copied().map(RawSymbolLine::from).collect();

    let span = tracing::span!(tracing::Level::INFO, "symbolize_recorded", frames = lines.len());
    let _guard = span.enter();
    print!("{}", Symbolizer::default().symbolize_lines(&lines));
}
