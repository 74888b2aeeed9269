//! Error types for tetrad-core.
//!
//! Only boundary validation fails. Running out of slots or falling back to
//! the heuristic classifier are ordinary results, not errors.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// A scheduled interval whose end does not come after its start.
    #[error("invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Estimated minutes outside the accepted range.
    #[error("invalid duration: {0} minutes (expected 5..=480)")]
    InvalidDuration(i64),

    #[error("invalid priority: {0} (expected 1..=5)")]
    InvalidPriority(i64),

    #[error("task title must be non-empty")]
    EmptyTitle,

    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
