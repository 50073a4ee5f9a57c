//! Status loop implementation.
//!
//! The loop keeps no time of its own. Every tick reads the injected clock,
//! classifies against the current settings snapshot and hands the result to
//! the renderer. Nothing carries over between ticks except the previous
//! state, which is only used to report transitions.
//!
//! ## Usage
//!
//! ```ignore
//! let mut status = StatusLoop::new(settings, SystemClock, TerminalRenderer::default());
//! status.tick();                       // drive manually, or:
//! status.run(period, &Local, updates, shutdown).await;
//! ```

use std::future::Future;
use std::time::Duration as StdDuration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::clock::Clock;
use crate::events::Event;
use crate::params::ExamSettings;
use crate::policy::{classify, ExamState, ExamStatus};
use crate::settings::SettingsForm;

/// Nominal tick period.
pub const DEFAULT_TICK: StdDuration = StdDuration::from_secs(1);

/// Everything a renderer receives for one tick.
#[derive(Debug, Clone, Copy)]
pub struct StatusFrame<'a> {
    pub now: DateTime<Utc>,
    pub settings: &'a ExamSettings,
    pub status: &'a ExamStatus,
}

/// Presentation callback. Owns all formatting and output.
pub trait StatusRenderer {
    fn render(&mut self, frame: &StatusFrame<'_>);
}

impl<F> StatusRenderer for F
where
    F: FnMut(&StatusFrame<'_>),
{
    fn render(&mut self, frame: &StatusFrame<'_>) {
        self(frame)
    }
}

/// Settings change delivered to a running loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    /// Replace the whole snapshot.
    Replace(ExamSettings),
    /// Merge the parameters present in a query string onto the current snapshot.
    Query(String),
}

pub struct StatusLoop<C, R> {
    settings: ExamSettings,
    clock: C,
    renderer: R,
    last_state: Option<ExamState>,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl<C: Clock, R: StatusRenderer> StatusLoop<C, R> {
    pub fn new(settings: ExamSettings, clock: C, renderer: R) -> Self {
        Self {
            settings,
            clock,
            renderer,
            last_state: None,
            events: None,
        }
    }

    /// Forward every event to `sender` in addition to returning it.
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(sender);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &ExamSettings {
        &self.settings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Classify and render once. Returns `Some(Event::StatusChanged)` on a
    /// state transition, including the very first tick.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let status = classify(&self.settings.policy, now);
        self.renderer.render(&StatusFrame {
            now,
            settings: &self.settings,
            status: &status,
        });

        let from = self.last_state.replace(status.state);
        if from == Some(status.state) {
            return None;
        }
        tracing::info!(from = ?from, to = %status.state, "status changed");
        let event = Event::StatusChanged {
            from,
            to: status.state,
            at: now,
        };
        self.emit(&event);
        Some(event)
    }

    /// Replace the settings snapshot and render it immediately.
    ///
    /// Returns the `SettingsApplied` event followed by a `StatusChanged`
    /// event if the new settings moved the state.
    pub fn apply(&mut self, settings: ExamSettings) -> Vec<Event> {
        self.settings = settings;
        tracing::info!(
            interval_min = settings.policy.interval_min.get(),
            window_min = settings.policy.window_min.get(),
            show_status = settings.show_status,
            "settings applied"
        );
        let applied = Event::SettingsApplied {
            settings,
            at: self.clock.now(),
        };
        self.emit(&applied);
        let mut events = vec![applied];
        events.extend(self.tick());
        events
    }

    /// Apply a settings form, reading `HH:MM` in `tz`.
    pub fn apply_form<Tz: TimeZone>(&mut self, form: &SettingsForm, tz: &Tz) -> Vec<Event> {
        let now = self.clock.now().with_timezone(tz);
        let next = form.apply(&self.settings, &now);
        self.apply(next)
    }

    /// Merge a query string onto the current settings, reading `HH:MM` in `tz`.
    pub fn apply_query<Tz: TimeZone>(&mut self, query: &str, tz: &Tz) -> Vec<Event> {
        let now = self.clock.now().with_timezone(tz);
        let next = self.settings.merge_query(query, &now);
        self.apply(next)
    }

    pub fn apply_update<Tz: TimeZone>(&mut self, update: SettingsUpdate, tz: &Tz) -> Vec<Event> {
        match update {
            SettingsUpdate::Replace(settings) => self.apply(settings),
            SettingsUpdate::Query(query) => self.apply_query(&query, tz),
        }
    }

    /// Tick every `period` until `shutdown` resolves.
    ///
    /// Updates received on `updates` are applied between ticks, with `HH:MM`
    /// read in `tz`. A closed channel is ignored; the loop keeps running on
    /// its last snapshot. Returns the number of periodic ticks performed.
    pub async fn run<Tz, F>(
        &mut self,
        period: StdDuration,
        tz: &Tz,
        mut updates: mpsc::Receiver<SettingsUpdate>,
        shutdown: F,
    ) -> u64
    where
        Tz: TimeZone,
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(period.max(StdDuration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(period_ms = period.as_millis() as u64, "status loop started");
        let mut updates_open = true;
        let mut ticks = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                update = updates.recv(), if updates_open => match update {
                    Some(update) => {
                        self.apply_update(update, tz);
                    }
                    None => updates_open = false,
                },
                _ = interval.tick() => {
                    self.tick();
                    ticks += 1;
                }
            }
        }
        tracing::info!(ticks, "status loop stopped");
        ticks
    }

    fn emit(&mut self, event: &Event) {
        let closed = match &self.events {
            Some(sender) => sender.send(event.clone()).is_err(),
            None => false,
        };
        if closed {
            tracing::debug!("event receiver dropped");
            self.events = None;
        }
    }
}
