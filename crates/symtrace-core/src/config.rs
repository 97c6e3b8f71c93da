//! # Configuration
//!
//! Options for a backtrace request.
//!
//! Defaults reproduce the classic behaviour: up to 100 frames, no source
//! lines, `addr2line -s -e <module> <address>` when source lines are wanted.
//!
//! ## Environment Variables
//!
//! [`BacktraceOptions::from_env`] overlays these on the defaults:
//!
//! - `SYMTRACE_MAX_FRAMES`: frame bound (positive integer)
//! - `SYMTRACE_RESOLVE_LOCATIONS`: `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`
//! - `SYMTRACE_ADDR2LINE`: path or name of the line-resolution tool
//! - `SYMTRACE_ADDR2LINE_TIMEOUT_MS`: bounded wait for the tool, in milliseconds
//!
//! Malformed values are logged and ignored.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::capture::DEFAULT_MAX_FRAMES;

/// Default wait for the line-resolution tool.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Default bound on the tool's output, in bytes.
pub const DEFAULT_MAX_OUTPUT: usize = 255;

/// How to run the external address-to-line utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationOptions
{
    /// Program name or path.
    pub program: String,
    /// Arguments placed before the module path and address.
    pub base_args: Vec<String>,
    /// Longest time to wait for the tool before giving up on the frame.
    pub timeout: Duration,
    /// Most bytes of output read from the tool.
    pub max_output: usize,
}

impl Default for LocationOptions
{
    fn default() -> Self
    {
        Self {
            program: "addr2line".to_string(),
            base_args: vec!["-s".to_string(), "-e".to_string()],
            timeout: DEFAULT_LOCATION_TIMEOUT,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }
}

impl LocationOptions
{
    /// Use `program` with the given leading arguments.
    pub fn with_command<I, S>(program: impl Into<String>, base_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            base_args: base_args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Replace the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self
    {
        self.timeout = timeout;
        self
    }
}

/// Options for one backtrace request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacktraceOptions
{
    /// Most frames captured.
    pub max_frames: usize,
    /// Whether to run the line-resolution tool for each frame.
    pub resolve_locations: bool,
    /// Line-resolution tool settings.
    pub location: LocationOptions,
}

impl Default for BacktraceOptions
{
    fn default() -> Self
    {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            resolve_locations: false,
            location: LocationOptions::default(),
        }
    }
}

impl BacktraceOptions
{
    /// Defaults overlaid with the `SYMTRACE_*` environment variables.
    pub fn from_env() -> Self
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// `lookup` receives the environment variable names listed in the module
    /// documentation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self
    {
        let mut options = Self::default();

        if let Some(value) = lookup("SYMTRACE_MAX_FRAMES") {
            match value.trim().parse::<usize>() {
                Ok(frames) if frames > 0 => options.max_frames = frames,
                _ => warn!(value = %value, "Ignoring invalid SYMTRACE_MAX_FRAMES"),
            }
        }

        if let Some(value) = lookup("SYMTRACE_RESOLVE_LOCATIONS") {
            match parse_flag(&value) {
                Some(flag) => options.resolve_locations = flag,
                None => warn!(value = %value, "Ignoring invalid SYMTRACE_RESOLVE_LOCATIONS"),
            }
        }

        if let Some(program) = lookup("SYMTRACE_ADDR2LINE").filter(|p| !p.trim().is_empty()) {
            options.location.program = program;
        }

        if let Some(value) = lookup("SYMTRACE_ADDR2LINE_TIMEOUT_MS") {
            match value.trim().parse::<u64>() {
                Ok(ms) => options.location.timeout = Duration::from_millis(ms),
                Err(err) => warn!(value = %value, error = %err, "Ignoring invalid SYMTRACE_ADDR2LINE_TIMEOUT_MS"),
            }
        }

        options
    }
}

fn parse_flag(value: &str) -> Option<bool>
{
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
    {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults()
    {
        let options = BacktraceOptions::default();
        assert_eq!(options.max_frames, 100);
        assert!(!options.resolve_locations);
        assert_eq!(options.location.program, "addr2line");
        assert_eq!(options.location.base_args, vec!["-s", "-e"]);
        assert_eq!(options.location.timeout, Duration::from_secs(2));
        assert_eq!(options.location.max_output, 255);
    }

    #[test]
    fn test_lookup_overrides()
    {
        let options = BacktraceOptions::from_lookup(lookup_from(&[
            ("SYMTRACE_MAX_FRAMES", "16"),
            ("SYMTRACE_RESOLVE_LOCATIONS", "yes"),
            ("SYMTRACE_ADDR2LINE", "/opt/llvm/bin/llvm-addr2line"),
            ("SYMTRACE_ADDR2LINE_TIMEOUT_MS", "250"),
        ]));
        assert_eq!(options.max_frames, 16);
        assert!(options.resolve_locations);
        assert_eq!(options.location.program, "/opt/llvm/bin/llvm-addr2line");
        assert_eq!(options.location.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_keep_defaults()
    {
        let options = BacktraceOptions::from_lookup(lookup_from(&[
            ("SYMTRACE_MAX_FRAMES", "0"),
            ("SYMTRACE_RESOLVE_LOCATIONS", "maybe"),
            ("SYMTRACE_ADDR2LINE", "  "),
            ("SYMTRACE_ADDR2LINE_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(options, BacktraceOptions::default());
    }
}
