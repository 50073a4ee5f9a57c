//! Submission status classification.
//!
//! Every call works from `now - start` alone, in whole milliseconds, so the
//! result for a long-running exam is identical to a fresh computation and
//! never accumulates rounding error across ticks.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::{ExamPolicyConfig, MS_PER_MIN};

pub const NOT_STARTED_MESSAGE: &str = "The exam has not started yet.";
pub const CAN_SUBMIT_MESSAGE: &str = "You may submit now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamState {
    NotStarted,
    Waiting,
    CanSubmit,
}

impl ExamState {
    pub fn label(&self) -> &'static str {
        match self {
            ExamState::NotStarted => "NOT STARTED",
            ExamState::Waiting => "WAITING",
            ExamState::CanSubmit => "CAN SUBMIT",
        }
    }
}

impl fmt::Display for ExamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one classification. Recreated on every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamStatus {
    pub state: ExamState,
    /// Whole minutes until the next window, rounded up. Only set while waiting.
    pub remaining_min: Option<u32>,
    pub message: String,
}

impl ExamStatus {
    fn not_started() -> Self {
        Self {
            state: ExamState::NotStarted,
            remaining_min: None,
            message: NOT_STARTED_MESSAGE.to_string(),
        }
    }

    fn can_submit() -> Self {
        Self {
            state: ExamState::CanSubmit,
            remaining_min: None,
            message: CAN_SUBMIT_MESSAGE.to_string(),
        }
    }

    fn waiting(remaining_min: u32) -> Self {
        Self {
            state: ExamState::Waiting,
            remaining_min: Some(remaining_min),
            message: waiting_message(remaining_min),
        }
    }

    pub fn can_submit_now(&self) -> bool {
        self.state == ExamState::CanSubmit
    }
}

/// "minute" for exactly one, "minutes" otherwise.
pub fn minute_unit(count: u32) -> &'static str {
    if count == 1 {
        "minute"
    } else {
        "minutes"
    }
}

pub fn waiting_message(remaining_min: u32) -> String {
    format!(
        "Next submission window opens in {remaining_min} {}.",
        minute_unit(remaining_min)
    )
}

/// Classify `now` against the policy.
///
/// Windows are closed-open: the instant a window opens is `CanSubmit`, the
/// instant it closes is `Waiting`.
pub fn classify(config: &ExamPolicyConfig, now: DateTime<Utc>) -> ExamStatus {
    let start = match config.start {
        Some(start) if now >= start => start,
        _ => return ExamStatus::not_started(),
    };

    // Truncation keeps sub-millisecond remainders on the earlier side.
    let elapsed_ms = (now - start).num_milliseconds();
    let wait_ms = i64::from(config.initial_wait_min) * MS_PER_MIN;
    if elapsed_ms < wait_ms {
        return ExamStatus::waiting(ceil_minutes(wait_ms - elapsed_ms));
    }

    let interval_ms = i64::from(config.interval_min.get()) * MS_PER_MIN;
    let window_ms = i64::from(config.window_min.get()) * MS_PER_MIN;
    let position_ms = (elapsed_ms - wait_ms).rem_euclid(interval_ms);

    if position_ms < window_ms {
        ExamStatus::can_submit()
    } else {
        ExamStatus::waiting(ceil_minutes(interval_ms - position_ms))
    }
}

fn ceil_minutes(ms: i64) -> u32 {
    let minutes = (ms + MS_PER_MIN - 1).div_euclid(MS_PER_MIN);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
