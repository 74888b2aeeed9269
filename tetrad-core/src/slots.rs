//! Slot synthesis: candidate 30-minute slots for one calendar day.
//!
//! A day is swept from a fixed three-part template. Each slot is tagged with
//! a domain by its start hour, flagged unavailable when it intersects a busy
//! interval, and dropped entirely when it starts in a meal hour.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::task::BusyInterval;

pub const SLOT_MINUTES: i64 = 30;
pub const LUNCH_HOUR: u32 = 12;
pub const DINNER_HOUR: u32 = 18;

/// A candidate interval a task may occupy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub domain: Domain,
    pub available: bool,
    /// 1-10 expected alertness.
    pub energy_level: u8,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// One part of the daily template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPart {
    pub name: &'static str,
    pub start_hour: u32,
    pub end_hour: u32,
    /// Nominal affinity; slot tagging uses [`Domain::for_hour`] instead.
    pub affinity: [Domain; 2],
    pub energy_level: u8,
}

pub const DAILY_TEMPLATE: [DayPart; 3] = [
    DayPart {
        name: "morning",
        start_hour: 6,
        end_hour: 12,
        affinity: [Domain::Academic, Domain::Income],
        energy_level: 8,
    },
    DayPart {
        name: "afternoon",
        start_hour: 13,
        end_hour: 18,
        affinity: [Domain::Income, Domain::Growth],
        energy_level: 6,
    },
    DayPart {
        name: "evening",
        start_hour: 19,
        end_hour: 22,
        affinity: [Domain::Growth, Domain::Life],
        energy_level: 4,
    },
];

fn at_hour(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN) + Duration::hours(hour as i64)
}

fn is_meal_hour(hour: u32) -> bool {
    hour == LUNCH_HOUR || hour == DINNER_HOUR
}

/// Generates the slots of one day from [`DAILY_TEMPLATE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotSynthesizer;

impl SlotSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Chronological, non-overlapping slots for `day`.
    pub fn synthesize(&self, day: NaiveDate, busy: &[BusyInterval]) -> Vec<TimeSlot> {
        let step = Duration::minutes(SLOT_MINUTES);
        let mut slots = Vec::new();

        for part in &DAILY_TEMPLATE {
            let part_end = at_hour(day, part.end_hour);
            let mut current = at_hour(day, part.start_hour);

            while current < part_end {
                let slot_end = (current + step).min(part_end);
                let hour = current.hour();

                if !is_meal_hour(hour) {
                    let available = !busy.iter().any(|b| b.overlaps(current, slot_end));
                    slots.push(TimeSlot {
                        start: current,
                        end: slot_end,
                        domain: Domain::for_hour(hour),
                        available,
                        energy_level: part.energy_level,
                    });
                }

                current = slot_end;
            }
        }

        slots
    }
}

/// Coalesce touching available slots with the same domain and energy level.
///
/// Slots are expected in chronological order. Unavailable slots are dropped.
pub fn merge_adjacent(slots: &[TimeSlot]) -> Vec<TimeSlot> {
    let mut merged: Vec<TimeSlot> = Vec::new();

    for slot in slots.iter().filter(|s| s.available) {
        match merged.last_mut() {
            Some(last)
                if last.end == slot.start
                    && last.domain == slot.domain
                    && last.energy_level == slot.energy_level =>
            {
                last.end = slot.end;
            }
            _ => merged.push(slot.clone()),
        }
    }

    merged
}
