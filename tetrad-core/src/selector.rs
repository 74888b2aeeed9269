//! Slot selection: score candidate slots for one task and pick the best.
//!
//! Scoring:
//! - +10 when the slot domain matches the task domain
//! - +5 for urgent work (urgency >= 4) in a high-energy slot (>= 7),
//!   else +3 for low-urgency work (urgency <= 2) in a low-energy slot (<= 5)
//! - +8 when the task fills 80-100% of the slot, +5 for 60-80%
//!
//! Ties keep the earliest slot.

use crate::domain::Domain;
use crate::slots::TimeSlot;
use crate::task::{Priority, PriorityPolarity};

#[derive(Debug, Clone, Copy, Default)]
pub struct SlotSelector {
    polarity: PriorityPolarity,
}

impl SlotSelector {
    pub fn new(polarity: PriorityPolarity) -> Self {
        Self { polarity }
    }

    pub fn score(&self, task_duration: i64, domain: Domain, slot: &TimeSlot, priority: Priority) -> i32 {
        let mut score = 0;

        if slot.domain == domain {
            score += 10;
        }

        let urgency = priority.urgency(self.polarity);
        if urgency >= 4 && slot.energy_level >= 7 {
            score += 5;
        } else if urgency <= 2 && slot.energy_level <= 5 {
            score += 3;
        }

        let utilization = task_duration as f64 / slot.duration_minutes() as f64;
        if (0.8..=1.0).contains(&utilization) {
            score += 8;
        } else if (0.6..0.8).contains(&utilization) {
            score += 5;
        }

        score
    }

    /// Best available slot that can hold `task_duration` minutes, or `None`.
    pub fn select<'a>(
        &self,
        task_duration: i64,
        domain: Domain,
        candidates: &'a [TimeSlot],
        priority: Priority,
    ) -> Option<&'a TimeSlot> {
        let mut best: Option<(&TimeSlot, i32)> = None;

        for slot in candidates
            .iter()
            .filter(|s| s.available && s.duration_minutes() >= task_duration)
        {
            let score = self.score(task_duration, domain, slot, priority);
            match best {
                None => best = Some((slot, score)),
                Some((current, best_score))
                    if score > best_score
                        || (score == best_score && slot.start < current.start) =>
                {
                    best = Some((slot, score))
                }
                _ => {}
            }
        }

        best.map(|(slot, _)| slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn slot(h: u32, minutes: i64, domain: Domain, energy: u8) -> TimeSlot {
        let start = at(h, 0);
        TimeSlot {
            start,
            end: start + chrono::Duration::minutes(minutes),
            domain,
            available: true,
            energy_level: energy,
        }
    }

    fn p(v: i64) -> Priority {
        Priority::new(v).unwrap()
    }

    fn source_scale() -> SlotSelector {
        SlotSelector::new(PriorityPolarity::HigherIsUrgent)
    }

    #[test]
    fn test_no_candidates_returns_none() {
        assert!(SlotSelector::default().select(30, Domain::Life, &[], p(3)).is_none());
    }

    #[test]
    fn test_filters_unavailable_and_too_short() {
        let mut busy = slot(8, 60, Domain::Academic, 8);
        busy.available = false;
        let short = slot(9, 30, Domain::Academic, 8);
        let candidates = vec![busy, short];
        assert!(source_scale().select(45, Domain::Academic, &candidates, p(3)).is_none());
    }

    #[test]
    fn test_domain_match_wins() {
        let candidates = vec![slot(8, 30, Domain::Academic, 8), slot(14, 30, Domain::Growth, 6)];
        let best = source_scale().select(30, Domain::Growth, &candidates, p(3)).unwrap();
        assert_eq!(best.start, at(14, 0));
    }

    #[test]
    fn test_score_components() {
        let sel = source_scale();
        let s = slot(8, 30, Domain::Academic, 8);
        // domain + high-energy urgent + full utilization
        assert_eq!(sel.score(30, Domain::Academic, &s, p(5)), 10 + 5 + 8);
        // 20/30 = 0.67 utilization
        assert_eq!(sel.score(20, Domain::Income, &s, p(3)), 5);
        // 15/30 = 0.5 utilization, low urgency in a high-energy slot: nothing
        assert_eq!(sel.score(15, Domain::Income, &s, p(1)), 0);

        let evening = slot(20, 30, Domain::Life, 4);
        assert_eq!(sel.score(30, Domain::Life, &evening, p(2)), 10 + 3 + 8);
    }

    #[test]
    fn test_polarity_flips_energy_rule() {
        let s = slot(8, 30, Domain::Academic, 8);
        let lower = SlotSelector::new(PriorityPolarity::LowerIsUrgent);
        assert_eq!(lower.score(30, Domain::Academic, &s, p(1)), 10 + 5 + 8);
        assert_eq!(lower.score(30, Domain::Academic, &s, p(5)), 10 + 8);
    }

    #[test]
    fn test_ties_keep_earliest_slot() {
        let candidates = vec![slot(15, 30, Domain::Growth, 6), slot(14, 30, Domain::Growth, 6)];
        let best = source_scale().select(30, Domain::Growth, &candidates, p(3)).unwrap();
        assert_eq!(best.start, at(14, 0));

        let ordered = vec![slot(14, 30, Domain::Growth, 6), slot(15, 30, Domain::Growth, 6)];
        let best = source_scale().select(30, Domain::Growth, &ordered, p(3)).unwrap();
        assert_eq!(best.start, at(14, 0));
    }

    #[test]
    fn test_prefers_tighter_fit() {
        let candidates = vec![slot(14, 120, Domain::Growth, 6), slot(16, 60, Domain::Growth, 6)];
        let best = source_scale().select(50, Domain::Growth, &candidates, p(3)).unwrap();
        assert_eq!(best.start, at(16, 0));
    }
}
