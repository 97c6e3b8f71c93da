//! Source location resolution through an external `addr2line`-style tool.
//!
//! The tool is started once per frame as
//! `<program> <base args...> <module> <address>` and is expected to print a
//! single `file:line` line. This is the slow path of the pipeline: it blocks
//! on a child process for every frame, so it is meant for crash and
//! diagnostic reports, not for frequently captured traces.
//!
//! Spawning a process is not async-signal-safe. Never enable location
//! resolution inside a signal handler.

use std::io::{self, Read};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::LocationOptions;
use crate::error::{SymtraceError, SymtraceResult};

/// Interval between checks on a running tool.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs the line-resolution tool with a bounded wait.
///
/// Keeps a count of the processes it has started, which is the only state
/// it carries; concurrent use from several threads is fine.
#[derive(Debug, Default)]
pub struct LocationResolver
{
    options: LocationOptions,
    spawns: AtomicUsize,
}

impl LocationResolver
{
    /// Create a resolver for the given tool settings.
    pub fn new(options: LocationOptions) -> Self
    {
        Self {
            options,
            spawns: AtomicUsize::new(0),
        }
    }

    /// Tool settings in use.
    pub fn options(&self) -> &LocationOptions
    {
        &self.options
    }

    /// Number of tool processes this resolver has tried to start.
    pub fn spawn_count(&self) -> usize
    {
        self.spawns.load(Ordering::Relaxed)
    }

    /// Map `address` inside `module` to a `file:line` string.
    ///
    /// Returns `None` without starting anything when `enabled` is false.
    /// Otherwise returns `None` when the tool is missing, prints nothing,
    /// times out, or answers with an unknown-location marker such as `??:0`.
    pub fn resolve(&self, module: &str, address: &str, enabled: bool) -> Option<String>
    {
        if !enabled {
            return None;
        }

        match self.run(module, address) {
            Ok(location) => Some(location),
            Err(err) => {
                debug!(module, address, error = %err, "Falling back to address and module");
                None
            }
        }
    }

    fn run(&self, module: &str, address: &str) -> SymtraceResult<String>
    {
        let program = &self.options.program;
        let timeout = self.options.timeout;
        let deadline = Instant::now() + timeout;
        self.spawns.fetch_add(1, Ordering::Relaxed);

        let mut child = Command::new(program)
            .args(&self.options.base_args)
            .arg(module)
            .arg(address)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| SymtraceError::LocationUnavailable(format!("failed to start {program}: {err}")))?;

        // Reading first keeps a chatty tool from blocking on a full pipe; once
        // the bounded read is done the pipe is closed and the tool may exit.
        let output = match child.stdout.take() {
            Some(stdout) => read_bounded(stdout, self.options.max_output, timeout),
            None => Ok(Some(Vec::new())),
        };
        let output = match output {
            Ok(Some(output)) => output,
            Ok(None) => {
                reap(&mut child);
                return Err(SymtraceError::LocationUnavailable(format!(
                    "{program} did not finish within {timeout:?}"
                )));
            }
            Err(err) => {
                reap(&mut child);
                return Err(err.into());
            }
        };

        match wait_with_timeout(&mut child, deadline.saturating_duration_since(Instant::now()))? {
            Some(status) => trace!(program = %program, %status, "Line-resolution tool exited"),
            None => trace!(program = %program, "Line-resolution tool killed after answering"),
        }

        let text = String::from_utf8_lossy(&output);
        let line = first_line(&text);
        if line.is_empty() {
            return Err(SymtraceError::LocationUnavailable(format!("{program} printed nothing")));
        }
        if is_unknown_location(line) {
            return Err(SymtraceError::LocationUnavailable(format!("{program} has no line for {address}")));
        }
        Ok(line.to_string())
    }
}

/// Resolve a source location with the default tool settings.
///
/// ## Example
///
/// ```rust
/// use symtrace_core::symbols::resolve_location;
///
/// // Disabled resolution never starts a process.
/// assert_eq!(resolve_location("./prog", "0x4005a0", false), None);
/// ```
pub fn resolve_location(module: &str, address: &str, enabled: bool) -> Option<String>
{
    if !enabled {
        return None;
    }
    LocationResolver::default().resolve(module, address, enabled)
}

/// Read at most `limit` bytes of `stdout`, giving up after `timeout`.
///
/// Returns `Ok(None)` on timeout. The pipe is closed as soon as the read
/// finishes; on timeout the reader thread ends once the tool is killed.
fn read_bounded(stdout: ChildStdout, limit: usize, timeout: Duration) -> io::Result<Option<Vec<u8>>>
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("symtrace-location-reader".to_string())
        .spawn(move || {
            let mut output = Vec::new();
            let result = stdout.take(limit as u64).read_to_end(&mut output).map(|_| output);
            let _ = tx.send(result);
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result.map(Some),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(io::Error::other("location reader thread exited early")),
    }
}

/// Kill and reap a tool that is no longer wanted.
fn reap(child: &mut Child)
{
    // The child may exit on its own between the check and the kill.
    let _ = child.kill();
    let _ = child.wait();
}

/// Wait for `child`, killing it once `timeout` has passed.
///
/// Returns `Ok(None)` on timeout.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>>
{
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            reap(child);
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
    }
}

/// The tool's answer: text up to the first line terminator.
fn first_line(text: &str) -> &str
{
    let line = text.split('\n').next().unwrap_or_default();
    line.strip_suffix('\r').unwrap_or(line)
}

/// `??:0`, `??:?`, or any `file:0`, with or without a ` (discriminator N)` suffix.
fn is_unknown_location(line: &str) -> bool
{
    let line = line.split_once(" (discriminator").map_or(line, |(location, _)| location);
    match line.rsplit_once(':') {
        Some((file, line_no)) => file == "??" || line_no == "0" || line_no == "?",
        None => line.starts_with("??"),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_disabled_never_spawns()
    {
        let resolver = LocationResolver::new(LocationOptions::with_command("definitely-not-a-real-tool", ["-e"]));
        assert_eq!(resolver.resolve("./prog", "0x4005a0", false), None);
        assert_eq!(resolver.spawn_count(), 0);
    }

    #[test]
    fn test_options_are_kept()
    {
        let options = LocationOptions::with_command("llvm-addr2line", ["-e"]).timeout(Duration::from_millis(10));
        let resolver = LocationResolver::new(options.clone());
        assert_eq!(resolver.options(), &options);
    }

    #[test]
    fn test_missing_tool_is_unavailable()
    {
        let resolver = LocationResolver::new(LocationOptions::with_command(
            "symtrace-test-missing-addr2line",
            Vec::<String>::new(),
        ));
        assert_eq!(resolver.resolve("./prog", "0x4005a0", true), None);
        assert_eq!(resolver.spawn_count(), 1);
    }

    #[test]
    fn test_first_line_is_the_answer()
    {
        assert_eq!(first_line("main.cc:42\n"), "main.cc:42");
        assert_eq!(first_line("main.cc:42\r\n"), "main.cc:42");
        assert_eq!(first_line("main.cc:42\nmore.cc:7\n"), "main.cc:42");
        assert_eq!(first_line("main.cc:42"), "main.cc:42");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_unknown_location_markers()
    {
        assert!(is_unknown_location("??:0"));
        assert!(is_unknown_location("??:?"));
        assert!(is_unknown_location("main.cc:0"));
        assert!(is_unknown_location("??"));
        assert!(!is_unknown_location("main.cc:42"));
        assert!(is_unknown_location("foo.c:0 (discriminator 1)"));
        assert!(!is_unknown_location("main.cc:42 (discriminator 2)"));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_output_is_returned()
    {
        let resolver = LocationResolver::new(LocationOptions::with_command(
            "sh",
            ["-c", "echo \"$1@$2:42\"", "sh"],
        ));
        let location = resolver.resolve("./prog", "0x4005a0", true);
        assert_eq!(location.as_deref(), Some("./prog@0x4005a0:42"));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_timeout_falls_back()
    {
        let options = LocationOptions::with_command("sh", ["-c", "sleep 5"]).timeout(Duration::from_millis(50));
        let resolver = LocationResolver::new(options);
        let start = Instant::now();
        assert_eq!(resolver.resolve("./prog", "0x4005a0", true), None);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_large_output_keeps_first_line()
    {
        let options = LocationOptions::with_command("sh", ["-c", "echo foo.cc:12; head -c 200000 /dev/zero", "sh"])
            .timeout(Duration::from_secs(3));
        let resolver = LocationResolver::new(options);
        let start = Instant::now();
        assert_eq!(resolver.resolve("./prog", "0x4005a0", true).as_deref(), Some("foo.cc:12"));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[test]
    fn test_discriminator_zero_falls_back()
    {
        let resolver = LocationResolver::new(LocationOptions::with_command(
            "sh",
            ["-c", "echo 'foo.c:0 (discriminator 1)'", "sh"],
        ));
        assert_eq!(resolver.resolve("./prog", "0x4005a0", true), None);
    }
}
