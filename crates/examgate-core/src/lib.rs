//! # Examgate Core Library
//!
//! Core logic for the Examgate submission-window widget: given an exam start,
//! an initial wait and a recurring submit-then-wait cycle, tell a participant
//! whether they may submit right now and how long until the next window.
//!
//! ## Architecture
//!
//! - **Policy Clock**: a pure classification of `now` against an
//!   [`ExamPolicyConfig`] snapshot
//! - **Parameters**: the shareable query-string form of [`ExamSettings`],
//!   validated field by field with silent fallback
//! - **Status Loop**: a clock-and-renderer driven loop that the caller ticks
//!   manually or runs on a tokio interval
//!
//! ## Key Components
//!
//! - [`classify`]: the status function
//! - [`ExamSettings`]: persisted configuration
//! - [`SettingsForm`]: the "apply settings" action
//! - [`StatusLoop`]: periodic re-evaluation and rendering

pub mod error;
pub mod events;
pub mod params;
pub mod policy;
pub mod settings;
pub mod timer;

pub use error::{CoreError, ParamError};
pub use events::Event;
pub use params::ExamSettings;
pub use policy::{classify, ExamPolicyConfig, ExamState, ExamStatus};
pub use settings::SettingsForm;
pub use timer::{
    Clock, ManualClock, SettingsUpdate, StatusFrame, StatusLoop, StatusRenderer, SystemClock,
};
