use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use symtrace_core::symbols::{demangle, language_of};
use symtrace_core::{write_backtrace, write_backtrace_with_header, BacktraceOptions, RawSymbolLine, ReportHeader, Symbolizer};
use symtrace_utils::{debug, init_logging, thread_label, DiagnosticContext};

/// Capture, symbolize and render call-stack backtraces.
#[derive(Parser, Debug)]
#[command(name = "symtrace")]
#[command(version)]
#[command(about = "Capture, symbolize and render call-stack backtraces", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Print the backtrace of this process
    Trace
    {
        #[command(flatten)]
        resolve: ResolveArgs,
        /// Maximum number of frames to capture
        #[arg(long)]
        max_frames: Option<usize>,
        /// Print a thread and timestamp line above the report
        #[arg(long, default_value_t = false)]
        header: bool,
    },
    /// Symbolize recorded backtrace_symbols lines (one frame per line)
    Symbolize
    {
        /// File with the recorded lines (reads stdin when omitted)
        file: Option<PathBuf>,
        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Demangle C++ or Rust symbol names
    Demangle
    {
        /// Mangled names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Source-line resolution flags shared by `trace` and `symbolize`.
#[derive(Args, Debug)]
struct ResolveArgs
{
    /// Resolve file:line for each frame with the line-resolution tool
    #[arg(short, long, default_value_t = false)]
    locations: bool,
    /// Line-resolution tool to run (default: addr2line)
    #[arg(long)]
    addr2line: Option<String>,
    /// Longest wait for the tool per frame, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl ResolveArgs
{
    /// Overlay the flags on options read from the environment.
    fn apply(&self, options: &mut BacktraceOptions)
    {
        if self.locations {
            options.resolve_locations = true;
        }
        if let Some(program) = &self.addr2line {
            options.location.program.clone_from(program);
        }
        if let Some(ms) = self.timeout_ms {
            options.location.timeout = Duration::from_millis(ms);
        }
    }
}

fn main()
{
    // Initialize logging (reads from RUST_LOG env var)
    // Defaults to WARN level and Pretty format if not set
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    // Sampled once, before anything else can fail.
    let context = DiagnosticContext::new();

    let cli = Cli::parse();
    if let Err(e) = run_command(cli, &context) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
    debug!(elapsed = ?context.uptime(), "Finished");
}

fn run_command(cli: Cli, context: &DiagnosticContext) -> Result<(), Box<dyn std::error::Error>>
{
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Trace {
            resolve,
            max_frames,
            header,
        } => {
            let mut options = BacktraceOptions::from_env();
            resolve.apply(&mut options);
            if let Some(frames) = max_frames {
                options.max_frames = frames;
            }
            debug!(?options, "Printing backtrace");

            if header {
                let header = ReportHeader {
                    thread: thread_label(),
                    timestamp: context.timestamp(),
                };
                write_backtrace_with_header(&mut out, &options, &header)?;
            } else {
                write_backtrace(&mut out, &options)?;
            }
        }
        Commands::Symbolize { file, resolve } => {
            let mut options = BacktraceOptions::from_env();
            resolve.apply(&mut options);

            let lines = match &file {
                Some(path) => read_lines(BufReader::new(File::open(path)?))?,
                None => read_lines(io::stdin().lock())?,
            };
            debug!(count = lines.len(), source = ?file, "Symbolizing recorded lines");

            let report = Symbolizer::new(&options).symbolize_lines(&lines);
            write!(out, "{report}")?;
        }
        Commands::Demangle { names } => {
            for name in names {
                match demangle(&name) {
                    Ok(demangled) => {
                        debug!(%name, language = %language_of(&name), "Demangled");
                        writeln!(out, "{demangled}")?;
                    }
                    Err(err) => {
                        debug!(%name, error = %err, "Printing name unchanged");
                        writeln!(out, "{name}")?;
                    }
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Non-empty lines, with line terminators removed.
fn read_lines(reader: impl BufRead) -> io::Result<Vec<RawSymbolLine>>
{
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            lines.push(RawSymbolLine::from(line));
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests
{
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid()
    {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_read_lines_skips_blank_lines()
    {
        let input = "./prog [0x1]\r\n\n./prog(_Z3fooi+0x10) [0x2]\n";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert_eq!(
            lines,
            vec![
                RawSymbolLine::from("./prog [0x1]"),
                RawSymbolLine::from("./prog(_Z3fooi+0x10) [0x2]"),
            ]
        );
    }

    #[test]
    fn test_resolve_args_override_options()
    {
        let cli = Cli::parse_from(["symtrace", "symbolize", "-l", "--addr2line", "llvm-addr2line", "--timeout-ms", "100"]);
        let Commands::Symbolize { resolve, file } = cli.command else {
            panic!("expected symbolize");
        };
        assert!(file.is_none());

        let mut options = BacktraceOptions::default();
        resolve.apply(&mut options);
        assert!(options.resolve_locations);
        assert_eq!(options.location.program, "llvm-addr2line");
        assert_eq!(options.location.timeout, Duration::from_millis(100));
    }
}
