use std::num::NonZeroU32;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Grace period before the first submission window, in minutes.
///
/// Not part of the shareable parameters; only settable programmatically.
pub const DEFAULT_INITIAL_WAIT_MIN: u32 = 30;

/// Default cycle length in minutes.
pub const DEFAULT_INTERVAL_MIN: NonZeroU32 = nonzero(10);

/// Default submission window length in minutes.
pub const DEFAULT_WINDOW_MIN: NonZeroU32 = nonzero(1);

const fn nonzero(value: u32) -> NonZeroU32 {
    match NonZeroU32::new(value) {
        Some(v) => v,
        None => panic!("zero minutes"),
    }
}

pub(crate) const MS_PER_MIN: i64 = 60_000;

/// Submission policy for one exam.
///
/// A plain value: every classification reads one snapshot, and changing a
/// field produces a new snapshot through the `with_*` methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPolicyConfig {
    /// Exam start. `None` means the exam has not been configured.
    pub start: Option<DateTime<Utc>>,
    /// Minutes after `start` before the first window opens.
    pub initial_wait_min: u32,
    /// Length of one submit-then-wait cycle in minutes.
    pub interval_min: NonZeroU32,
    /// Leading part of each cycle, in minutes, during which submission is allowed.
    pub window_min: NonZeroU32,
}

impl ExamPolicyConfig {
    pub fn new(
        start: Option<DateTime<Utc>>,
        initial_wait_min: u32,
        interval_min: NonZeroU32,
        window_min: NonZeroU32,
    ) -> Self {
        Self {
            start,
            initial_wait_min,
            interval_min,
            window_min,
        }
    }

    pub fn with_start(self, start: Option<DateTime<Utc>>) -> Self {
        Self { start, ..self }
    }

    pub fn with_initial_wait(self, initial_wait_min: u32) -> Self {
        Self {
            initial_wait_min,
            ..self
        }
    }

    pub fn with_interval(self, interval_min: NonZeroU32) -> Self {
        Self {
            interval_min,
            ..self
        }
    }

    pub fn with_window(self, window_min: NonZeroU32) -> Self {
        Self { window_min, ..self }
    }

    /// Whether the window fits inside one cycle.
    ///
    /// Classification still works when this is false; every instant after
    /// the initial wait is then inside a window.
    pub fn is_consistent(&self) -> bool {
        self.window_min <= self.interval_min
    }

    pub fn initial_wait(&self) -> Duration {
        Duration::minutes(i64::from(self.initial_wait_min))
    }

    pub fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.interval_min.get()))
    }

    pub fn window(&self) -> Duration {
        Duration::minutes(i64::from(self.window_min.get()))
    }

    /// Earliest window opening at or after `now`.
    ///
    /// Computed from `start` directly, so the result is exact for any exam
    /// length. Returns `None` when no start is configured.
    pub fn next_window_opens(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = self.start?;
        let first_open = start + self.initial_wait();
        if now <= first_open {
            return Some(first_open);
        }

        let since_first_ms = (now - first_open).num_milliseconds();
        let interval_ms = i64::from(self.interval_min.get()) * MS_PER_MIN;
        let cycles = since_first_ms.div_euclid(interval_ms);
        let opening = first_open + Duration::milliseconds(cycles.saturating_mul(interval_ms));
        if opening < now {
            Some(opening + self.interval())
        } else {
            Some(opening)
        }
    }
}

impl Default for ExamPolicyConfig {
    fn default() -> Self {
        Self {
            start: None,
            initial_wait_min: DEFAULT_INITIAL_WAIT_MIN,
            interval_min: DEFAULT_INTERVAL_MIN,
            window_min: DEFAULT_WINDOW_MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, s).unwrap()
    }

    fn nine_oclock() -> ExamPolicyConfig {
        ExamPolicyConfig::default().with_start(Some(at(9, 0, 0)))
    }

    #[test]
    fn defaults_match_published_parameters() {
        let config = ExamPolicyConfig::default();
        assert_eq!(config.start, None);
        assert_eq!(config.initial_wait_min, 30);
        assert_eq!(config.interval_min.get(), 10);
        assert_eq!(config.window_min.get(), 1);
        assert!(config.is_consistent());
    }

    #[test]
    fn builders_replace_one_field() {
        let base = nine_oclock();
        let changed = base.with_interval(nonzero(15));
        assert_eq!(changed.interval_min.get(), 15);
        assert_eq!(changed.start, base.start);
        assert_eq!(changed.window_min, base.window_min);
        assert_eq!(base.interval_min.get(), 10);
    }

    #[test]
    fn window_longer_than_interval_is_inconsistent() {
        let config = nine_oclock().with_window(nonzero(12));
        assert!(!config.is_consistent());
    }

    #[test]
    fn next_window_before_start_is_first_window() {
        let config = nine_oclock();
        assert_eq!(config.next_window_opens(at(8, 0, 0)), Some(at(9, 30, 0)));
        assert_eq!(config.next_window_opens(at(9, 12, 0)), Some(at(9, 30, 0)));
        assert_eq!(config.next_window_opens(at(9, 30, 0)), Some(at(9, 30, 0)));
    }

    #[test]
    fn next_window_inside_cycle_is_next_cycle_start() {
        let config = nine_oclock();
        assert_eq!(config.next_window_opens(at(9, 30, 1)), Some(at(9, 40, 0)));
        assert_eq!(config.next_window_opens(at(9, 39, 59)), Some(at(9, 40, 0)));
        assert_eq!(config.next_window_opens(at(9, 40, 0)), Some(at(9, 40, 0)));
    }

    #[test]
    fn next_window_unset_start() {
        assert_eq!(ExamPolicyConfig::default().next_window_opens(at(9, 0, 0)), None);
    }
}
