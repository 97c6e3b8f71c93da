//! # Diagnostic Context
//!
//! Clock and thread collaborators for annotating reports.
//!
//! The monotonic clock has no epoch, so wall-clock time for a diagnostic is
//! derived from a baseline pair sampled together at start-up: the wall time
//! of an event is the baseline wall time plus the monotonic time elapsed
//! since the baseline. The pair lives in a [`DiagnosticContext`] created once
//! and passed to whoever needs it, rather than in a process-wide global.
//!
//! Clocks that drift apart over a long run are not corrected.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};

/// Correlated monotonic and wall-clock baseline.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticContext
{
    monotonic: Instant,
    wall: DateTime<Utc>,
}

impl DiagnosticContext
{
    /// Sample both clocks now.
    pub fn new() -> Self
    {
        Self {
            monotonic: Instant::now(),
            wall: Utc::now(),
        }
    }

    /// Use an explicit baseline pair.
    pub fn with_baseline(monotonic: Instant, wall: DateTime<Utc>) -> Self
    {
        Self { monotonic, wall }
    }

    /// Monotonic time since the baseline was taken.
    pub fn uptime(&self) -> Duration
    {
        self.monotonic.elapsed()
    }

    /// Wall-clock time of `instant`, derived from the baseline.
    ///
    /// Instants earlier than the baseline map onto the baseline itself.
    pub fn wall_time_at(&self, instant: Instant) -> DateTime<Utc>
    {
        let elapsed = instant.saturating_duration_since(self.monotonic);
        chrono::Duration::from_std(elapsed)
            .ok()
            .and_then(|delta| self.wall.checked_add_signed(delta))
            .unwrap_or(self.wall)
    }

    /// Current wall-clock time, derived from the baseline.
    pub fn now(&self) -> DateTime<Utc>
    {
        self.wall_time_at(Instant::now())
    }

    /// Current time as RFC 3339 with microseconds, e.g. `2026-10-19T12:00:00.123456Z`.
    pub fn timestamp(&self) -> String
    {
        self.now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl Default for DiagnosticContext
{
    fn default() -> Self
    {
        Self::new()
    }
}

/// Label for the calling thread, e.g. `main (ThreadId(1))`.
///
/// Unnamed threads are labelled `<unnamed>`.
pub fn thread_label() -> String
{
    let current = thread::current();
    let name = current.name().unwrap_or("<unnamed>");
    format!("{name} ({:?})", current.id())
}

#[cfg(test)]
mod tests
{
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_wall_time_follows_monotonic_offset()
    {
        let base = Instant::now();
        let wall = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let context = DiagnosticContext::with_baseline(base, wall);

        let later = base + Duration::from_millis(1500);
        let derived = context.wall_time_at(later);
        assert_eq!(derived, wall + chrono::Duration::milliseconds(1500));
    }

    #[test]
    fn test_instants_before_baseline_clamp()
    {
        let base = Instant::now();
        let wall = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let context = DiagnosticContext::with_baseline(base, wall);
        assert_eq!(context.wall_time_at(base), wall);
    }

    #[test]
    fn test_uptime_counts_from_baseline()
    {
        let base = Instant::now() - Duration::from_millis(200);
        let context = DiagnosticContext::with_baseline(base, Utc::now());
        assert!(context.uptime() >= Duration::from_millis(200));
    }

    #[test]
    fn test_timestamp_is_rfc3339_utc()
    {
        let stamp = DiagnosticContext::new().timestamp();
        assert!(stamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_thread_label_for_named_thread()
    {
        let label = thread::Builder::new()
            .name("reporter".to_string())
            .spawn(thread_label)
            .unwrap()
            .join()
            .unwrap();
        assert!(label.starts_with("reporter (ThreadId("));
    }
}
