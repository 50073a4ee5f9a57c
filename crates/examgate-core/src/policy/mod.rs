mod clock;
mod config;

pub use clock::{
    classify, minute_unit, waiting_message, ExamState, ExamStatus, CAN_SUBMIT_MESSAGE,
    NOT_STARTED_MESSAGE,
};
pub use config::{
    ExamPolicyConfig, DEFAULT_INITIAL_WAIT_MIN, DEFAULT_INTERVAL_MIN, DEFAULT_WINDOW_MIN,
};
