use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::ExamSettings;
use crate::policy::ExamState;

/// Notable changes observed by the status loop.
/// Front-ends may log or forward these; each tick still renders regardless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The classified state differs from the previous tick's.
    /// `from` is `None` on the first tick.
    StatusChanged {
        from: Option<ExamState>,
        to: ExamState,
        at: DateTime<Utc>,
    },
    /// New settings replaced the loop's snapshot.
    SettingsApplied {
        settings: ExamSettings,
        at: DateTime<Utc>,
    },
}
