mod clock;
mod driver;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{StatusFrame, StatusLoop, SettingsUpdate, StatusRenderer, DEFAULT_TICK};
