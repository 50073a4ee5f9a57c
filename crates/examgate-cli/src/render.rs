//! Terminal output for status frames.

use std::io::Write;

use chrono::{DateTime, Local, Utc};
use examgate_core::{ExamSettings, ExamStatus, StatusFrame, StatusRenderer};
use serde::Serialize;

/// One status line; the `[STATE]` indicator only when the settings show it.
pub fn status_line(settings: &ExamSettings, status: &ExamStatus) -> String {
    if settings.show_status {
        format!("[{}] {}", status.state, status.message)
    } else {
        status.message.clone()
    }
}

/// Prints one timestamped line per tick to stdout.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl StatusRenderer for TerminalRenderer {
    fn render(&mut self, frame: &StatusFrame<'_>) {
        let local = frame.now.with_timezone(&Local);
        let mut stdout = std::io::stdout().lock();
        // A closed pipe must not stop the loop.
        let _ = writeln!(
            stdout,
            "{}  {}",
            local.format("%H:%M:%S"),
            status_line(frame.settings, frame.status)
        );
        let _ = stdout.flush();
    }
}

/// `status --json` output.
#[derive(Debug, Serialize)]
pub struct StatusReport<'a> {
    pub now: DateTime<Utc>,
    #[serde(flatten)]
    pub status: &'a ExamStatus,
    pub show_status: bool,
    pub start: Option<DateTime<Utc>>,
    pub next_window_at: Option<DateTime<Utc>>,
    pub query: String,
}

impl<'a> StatusReport<'a> {
    pub fn new(now: DateTime<Utc>, settings: &ExamSettings, status: &'a ExamStatus) -> Self {
        Self {
            now,
            status,
            show_status: settings.show_status,
            start: settings.policy.start,
            next_window_at: settings.policy.next_window_opens(now),
            query: settings.to_query(&Local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use examgate_core::classify;

    fn settings(show: bool) -> ExamSettings {
        let start = Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap();
        let mut settings = ExamSettings::defaults_at(&start);
        settings.show_status = show;
        settings
    }

    #[test]
    fn indicator_follows_show_flag() {
        let settings = settings(true);
        let now = settings.policy.start.unwrap();
        let status = classify(&settings.policy, now);
        assert_eq!(
            status_line(&settings, &status),
            "[WAITING] Next submission window opens in 30 minutes."
        );

        let hidden = ExamSettings {
            show_status: false,
            ..settings
        };
        assert_eq!(
            status_line(&hidden, &status),
            "Next submission window opens in 30 minutes."
        );
    }

    #[test]
    fn report_flattens_status() {
        let settings = settings(false);
        let now = settings.policy.start.unwrap();
        let status = classify(&settings.policy, now);
        let json = serde_json::to_value(StatusReport::new(now, &settings, &status)).unwrap();
        assert_eq!(json["state"], "waiting");
        assert_eq!(json["remaining_min"], 30);
        assert_eq!(json["next_window_at"], "2026-07-01T09:30:00Z");
    }
}
