//! Task model: the scheduling view of a task plus the inbound busy snapshot.
//!
//! Storage and ids are owned by callers; the core only fills in
//! classification fields and the scheduled window.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{Result, ScheduleError};

pub const MIN_TASK_MINUTES: i64 = 5;
pub const MAX_TASK_MINUTES: i64 = 480;

/// How to read the 1..=5 priority scale.
///
/// The task model and the heuristic classifier use 1 as the most urgent
/// value. Some upstream producers emit 5 as the most urgent instead; the
/// polarity lets sequencing and slot scoring follow either convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityPolarity {
    #[default]
    LowerIsUrgent,
    HigherIsUrgent,
}

/// Task priority, 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const MOST_URGENT: Priority = Priority(1);
    pub const DEFAULT: Priority = Priority(3);

    pub fn new(value: i64) -> Result<Self> {
        if (1..=5).contains(&value) {
            Ok(Priority(value as u8))
        } else {
            Err(ScheduleError::InvalidPriority(value))
        }
    }

    /// Clamp an arbitrary computed value into range.
    pub fn clamped(value: i64) -> Self {
        Priority(value.clamp(1, 5) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Urgency on a 1..=5 scale where 5 is always the most urgent.
    pub fn urgency(self, polarity: PriorityPolarity) -> u8 {
        match polarity {
            PriorityPolarity::HigherIsUrgent => self.0,
            PriorityPolarity::LowerIsUrgent => 6 - self.0,
        }
    }

    /// Inverse of [`Priority::urgency`]; out-of-range urgency is clamped.
    pub fn from_urgency(urgency: u8, polarity: PriorityPolarity) -> Self {
        let urgency = urgency.clamp(1, 5);
        match polarity {
            PriorityPolarity::HigherIsUrgent => Priority(urgency),
            PriorityPolarity::LowerIsUrgent => Priority(6 - urgency),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

impl TryFrom<i64> for Priority {
    type Error = ScheduleError;

    fn try_from(value: i64) -> Result<Self> {
        Priority::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(p: Priority) -> i64 {
        p.0 as i64
    }
}

pub fn validate_minutes(minutes: i64) -> Result<i64> {
    if (MIN_TASK_MINUTES..=MAX_TASK_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(ScheduleError::InvalidDuration(minutes))
    }
}

/// Caller input before classification; absent fields are filled by intake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub estimated_minutes: Option<i64>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Core task type (scheduling view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub domain: Domain,
    pub priority: Priority,

    /// Minutes, 5..=480.
    pub estimated_minutes: i64,

    /// Set together by [`Task::schedule_at`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_end: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        domain: Domain,
        priority: Priority,
        estimated_minutes: i64,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ScheduleError::EmptyTitle);
        }
        Ok(Self {
            id: id.into(),
            title,
            domain,
            priority,
            estimated_minutes: validate_minutes(estimated_minutes)?,
            scheduled_start: None,
            scheduled_end: None,
        })
    }

    /// Pin the task to `start`; the end follows from the estimate.
    pub fn schedule_at(&mut self, start: NaiveDateTime) {
        self.scheduled_start = Some(start);
        self.scheduled_end = Some(start + Duration::minutes(self.estimated_minutes));
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_start.is_some()
    }

    /// Re-check invariants on a task that arrived from outside (e.g. JSON).
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ScheduleError::EmptyTitle);
        }
        validate_minutes(self.estimated_minutes)?;
        match (self.scheduled_start, self.scheduled_end) {
            (None, None) => Ok(()),
            (Some(start), Some(end)) if end > start => Ok(()),
            (Some(start), Some(end)) => Err(ScheduleError::InvalidInterval { start, end }),
            (Some(start), None) | (None, Some(start)) => Err(ScheduleError::InvalidInterval {
                start,
                end: start,
            }),
        }
    }

    /// Conflict interval for an already-scheduled task.
    pub fn busy_interval(&self) -> Result<Option<BusyInterval>> {
        self.validate()?;
        match (self.scheduled_start, self.scheduled_end) {
            (Some(start), Some(end)) => {
                BusyInterval::new(self.id.clone(), Some(self.domain), start, end).map(Some)
            }
            _ => Ok(None),
        }
    }
}

#[derive(Deserialize)]
struct RawBusyInterval {
    id: String,
    #[serde(default)]
    domain: Option<Domain>,
    scheduled_start: NaiveDateTime,
    scheduled_end: NaiveDateTime,
}

/// An already-occupied window from the persistence snapshot.
///
/// Construction rejects empty or inverted intervals, so synthesis never sees one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBusyInterval")]
pub struct BusyInterval {
    id: String,
    domain: Option<Domain>,
    scheduled_start: NaiveDateTime,
    scheduled_end: NaiveDateTime,
}

impl TryFrom<RawBusyInterval> for BusyInterval {
    type Error = ScheduleError;

    fn try_from(raw: RawBusyInterval) -> Result<Self> {
        BusyInterval::new(raw.id, raw.domain, raw.scheduled_start, raw.scheduled_end)
    }
}

impl BusyInterval {
    pub fn new(
        id: impl Into<String>,
        domain: Option<Domain>,
        scheduled_start: NaiveDateTime,
        scheduled_end: NaiveDateTime,
    ) -> Result<Self> {
        if scheduled_end <= scheduled_start {
            return Err(ScheduleError::InvalidInterval {
                start: scheduled_start,
                end: scheduled_end,
            });
        }
        Ok(Self {
            id: id.into(),
            domain,
            scheduled_start,
            scheduled_end,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn domain(&self) -> Option<Domain> {
        self.domain
    }

    pub fn start(&self) -> NaiveDateTime {
        self.scheduled_start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.scheduled_end
    }

    /// Half-open intersection with `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        !(end <= self.scheduled_start || start >= self.scheduled_end)
    }
}
