//! Time source abstraction
//!
//! History ids, history timestamps, template timestamps and launch stats all
//! read the clock through this trait so tests can pin the time.

use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Wall-clock source
pub trait Clock: Send + Sync + 'static {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since Unix epoch
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// System clock, the default for real runs
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Build from epoch millis; out-of-range values fall back to the epoch
    pub fn from_millis(timestamp_ms: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// History timestamp in local time: `dd.mm.yyyy, HH:MM`
pub fn history_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%d.%m.%Y, %H:%M")
        .to_string()
}

/// RFC 3339 UTC timestamp with millisecond precision
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let t1 = clock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.now_millis() >= t1 + 5);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::from_millis(1_700_000_000_000);
        assert_eq!(clock.now_millis(), 1_700_000_000_000);
        assert_eq!(clock.now_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_iso_timestamp_format() {
        let clock = FixedClock::from_millis(1_700_000_000_123);
        assert_eq!(iso_timestamp(clock.now()), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_history_timestamp_shape() {
        let stamp = history_timestamp(FixedClock::from_millis(1_700_000_000_000).now());
        // dd.mm.yyyy, HH:MM
        assert_eq!(stamp.len(), 17);
        assert_eq!(&stamp[2..3], ".");
        assert_eq!(&stamp[5..6], ".");
        assert_eq!(&stamp[10..12], ", ");
        assert_eq!(&stamp[14..15], ":");
    }
}
