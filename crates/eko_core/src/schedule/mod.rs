//! Date-driven task scheduling: recurrence stepping and the daily reset.

pub mod daily_reset;
pub mod recurrence;

pub use daily_reset::{
    reset_completed_tasks, DailyResetWorker, RolloverDetector, DEFAULT_POLL_INTERVAL,
};
pub use recurrence::{days_in_month, next_due_date, next_occurrence};
