pub mod link;
pub mod status;
pub mod watch;

use chrono::{DateTime, Local, Utc};
use clap::Args;
use examgate_core::params::{parse_clock_time, start_on_date};
use examgate_core::error::Result;
use examgate_core::{CoreError, ExamSettings};
use url::Url;

/// Where the exam settings come from. Neither flag means all defaults.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Exam link whose query carries the settings
    #[arg(long, conflicts_with = "query")]
    pub url: Option<String>,
    /// Raw query string, e.g. "start=09:00&interval=10&duration=1&show=1"
    #[arg(long)]
    pub query: Option<String>,
}

impl SourceArgs {
    pub fn load(&self, now: &DateTime<Local>) -> Result<ExamSettings> {
        if let Some(raw) = &self.url {
            let url = Url::parse(raw)?;
            return Ok(ExamSettings::from_url(&url, now));
        }
        Ok(ExamSettings::from_query(self.query.as_deref().unwrap_or(""), now))
    }
}

/// Read `HH:MM` (today, local time) or an RFC 3339 timestamp.
pub fn parse_instant(value: &str) -> Result<DateTime<Local>> {
    if let Ok(time) = parse_clock_time(value) {
        return start_on_date(time, &Local::now())
            .map(|at| at.with_timezone(&Local))
            .map_err(|_| CoreError::InvalidInstant(value.to_string()));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc).with_timezone(&Local))
        .map_err(|_| CoreError::InvalidInstant(value.to_string()))
}
