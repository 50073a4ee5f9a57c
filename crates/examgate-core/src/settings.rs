//! The "apply settings" action.
//!
//! A [`SettingsForm`] holds raw user input. Applying it to the current
//! settings yields a new snapshot; any field that fails validation keeps its
//! prior value.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::params::{accept_duration, accept_interval, accept_start, format_clock_time, ExamSettings};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsForm {
    /// Start time as `HH:MM`.
    pub start: String,
    /// Cycle length in minutes.
    pub interval: String,
    /// Submission window length in minutes.
    pub duration: String,
    pub show: bool,
}

impl SettingsForm {
    /// Pre-fill the form from the current settings, rendering `start` in `tz`.
    pub fn from_settings<Tz: TimeZone>(settings: &ExamSettings, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            start: settings
                .policy
                .start
                .map(|start| format_clock_time(&start.with_timezone(tz)))
                .unwrap_or_default(),
            interval: settings.policy.interval_min.to_string(),
            duration: settings.policy.window_min.to_string(),
            show: settings.show_status,
        }
    }

    /// Validate each field against `prior` and produce the next snapshot.
    pub fn apply<Tz: TimeZone>(&self, prior: &ExamSettings, now: &DateTime<Tz>) -> ExamSettings {
        let mut policy = prior.policy;
        policy = accept_start(policy, &self.start, now);
        policy = accept_interval(policy, &self.interval);
        policy = accept_duration(policy, &self.duration);

        ExamSettings {
            policy,
            show_status: self.show,
        }
    }
}
