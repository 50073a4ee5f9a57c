//! Shareable address parameters.
//!
//! The four parameters below are the only persisted configuration. Each one
//! is validated on its own; a malformed or missing value falls back to the
//! default without affecting the others.
//!
//! | Parameter  | Format                 | Field                 |
//! |------------|------------------------|-----------------------|
//! | `start`    | `HH:MM`, 24-hour       | `policy.start`        |
//! | `interval` | positive integer       | `policy.interval_min` |
//! | `duration` | positive integer       | `policy.window_min`   |
//! | `show`     | `1` / `true` or other  | `show_status`         |

use std::num::NonZeroU32;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded::{self, Serializer, Target};
use url::Url;

use crate::error::ParamError;
use crate::policy::ExamPolicyConfig;

pub const START_PARAM: &str = "start";
pub const INTERVAL_PARAM: &str = "interval";
pub const DURATION_PARAM: &str = "duration";
pub const SHOW_PARAM: &str = "show";

const OWNED_PARAMS: [&str; 4] = [START_PARAM, INTERVAL_PARAM, DURATION_PARAM, SHOW_PARAM];

/// Everything a shared link carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSettings {
    pub policy: ExamPolicyConfig,
    /// Whether the status indicator is displayed.
    pub show_status: bool,
}

impl ExamSettings {
    /// Defaults used when a link carries no parameters: the exam starts `now`.
    pub fn defaults_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self {
            policy: ExamPolicyConfig::default().with_start(Some(now.with_timezone(&Utc))),
            show_status: false,
        }
    }

    /// Parse a raw query string; a leading `?` is ignored.
    ///
    /// `now` supplies the date and time zone in which `start=HH:MM` is read.
    pub fn from_query<Tz: TimeZone>(query: &str, now: &DateTime<Tz>) -> Self {
        Self::defaults_at(now).merge_query(query, now)
    }

    pub fn from_url<Tz: TimeZone>(url: &Url, now: &DateTime<Tz>) -> Self {
        Self::defaults_at(now).overlay(url.query_pairs(), now)
    }

    /// Apply only the parameters present in `query` on top of `self`.
    ///
    /// Absent or malformed parameters keep their current value.
    pub fn merge_query<Tz: TimeZone>(&self, query: &str, now: &DateTime<Tz>) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        self.overlay(form_urlencoded::parse(query.as_bytes()), now)
    }

    fn overlay<Tz: TimeZone>(&self, pairs: form_urlencoded::Parse<'_>, now: &DateTime<Tz>) -> Self {
        let pairs: Vec<(String, String)> = pairs.into_owned().collect();
        // The first occurrence of a repeated parameter is the one read.
        let lookup = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let mut settings = *self;
        if let Some(raw) = lookup(START_PARAM) {
            settings.policy = accept_start(settings.policy, raw, now);
        }
        if let Some(raw) = lookup(INTERVAL_PARAM) {
            settings.policy = accept_interval(settings.policy, raw);
        }
        if let Some(raw) = lookup(DURATION_PARAM) {
            settings.policy = accept_duration(settings.policy, raw);
        }
        if let Some(raw) = lookup(SHOW_PARAM) {
            settings.show_status = parse_flag(raw);
        }
        settings
    }

    /// Canonical query string: `start=HH:MM&interval=N&duration=N&show=1|0`.
    ///
    /// `start` is rendered in `tz` and omitted when the policy has none.
    pub fn to_query<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut serializer = Serializer::new(String::new());
        self.append_params(&mut serializer, tz);
        serializer.finish()
    }

    /// Rewrite the four parameters of `url` in canonical form.
    ///
    /// Unrelated query pairs keep their order; the canonical pairs follow them.
    pub fn write_to_url<Tz: TimeZone>(&self, url: &mut Url, tz: &Tz)
    where
        Tz::Offset: std::fmt::Display,
    {
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !OWNED_PARAMS.contains(&key.as_ref()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut serializer = url.query_pairs_mut();
        serializer.clear();
        serializer.extend_pairs(retained);
        self.append_params(&mut serializer, tz);
    }

    fn append_params<T: Target, Tz: TimeZone>(&self, serializer: &mut Serializer<'_, T>, tz: &Tz)
    where
        Tz::Offset: std::fmt::Display,
    {
        if let Some(start) = self.policy.start {
            serializer.append_pair(START_PARAM, &format_clock_time(&start.with_timezone(tz)));
        }
        serializer
            .append_pair(INTERVAL_PARAM, &self.policy.interval_min.to_string())
            .append_pair(DURATION_PARAM, &self.policy.window_min.to_string())
            .append_pair(SHOW_PARAM, if self.show_status { "1" } else { "0" });
    }
}

/// `HH:MM` rendering of a wall time.
pub fn format_clock_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M").to_string()
}

/// Parse a 24-hour `HH:MM` wall time.
///
/// Hours may be one or two digits; minutes are always two.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, ParamError> {
    let invalid = || ParamError::InvalidTime {
        value: value.to_string(),
    };

    let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
    let well_formed = matches!(hours.len(), 1 | 2)
        && minutes.len() == 2
        && hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(ParamError::TimeOutOfRange { hours, minutes });
    }
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or(ParamError::TimeOutOfRange { hours, minutes })
}

/// Place a wall time on the date of `now`, in `now`'s time zone.
///
/// An ambiguous wall time (DST fold) resolves to its earlier instant.
pub fn start_on_date<Tz: TimeZone>(
    time: NaiveTime,
    now: &DateTime<Tz>,
) -> Result<DateTime<Utc>, ParamError> {
    let date = now.date_naive();
    now.timezone()
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|start| start.with_timezone(&Utc))
        .ok_or(ParamError::NonexistentLocalTime { date, time })
}

/// Parse a positive whole number of minutes. Signs and decimals are rejected.
pub fn parse_minutes(key: &'static str, value: &str) -> Result<NonZeroU32, ParamError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParamError::InvalidMinutes {
            key,
            value: value.to_string(),
        });
    }
    let minutes: u32 = value.parse().map_err(|_| ParamError::InvalidMinutes {
        key,
        value: value.to_string(),
    })?;
    NonZeroU32::new(minutes).ok_or(ParamError::ZeroMinutes { key })
}

/// `1` and `true` (any case) enable a flag; anything else disables it.
pub fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

pub(crate) fn accept_start<Tz: TimeZone>(
    policy: ExamPolicyConfig,
    raw: &str,
    now: &DateTime<Tz>,
) -> ExamPolicyConfig {
    match parse_clock_time(raw).and_then(|time| start_on_date(time, now)) {
        Ok(start) => policy.with_start(Some(start)),
        Err(err) => discard(START_PARAM, &err, policy),
    }
}

pub(crate) fn accept_interval(policy: ExamPolicyConfig, raw: &str) -> ExamPolicyConfig {
    match parse_minutes(INTERVAL_PARAM, raw) {
        Ok(minutes) => policy.with_interval(minutes),
        Err(err) => discard(INTERVAL_PARAM, &err, policy),
    }
}

pub(crate) fn accept_duration(policy: ExamPolicyConfig, raw: &str) -> ExamPolicyConfig {
    match parse_minutes(DURATION_PARAM, raw) {
        Ok(minutes) => policy.with_window(minutes),
        Err(err) => discard(DURATION_PARAM, &err, policy),
    }
}

fn discard(param: &'static str, err: &ParamError, policy: ExamPolicyConfig) -> ExamPolicyConfig {
    tracing::debug!(param, %err, "discarding malformed setting");
    policy
}
