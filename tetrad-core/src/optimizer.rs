//! Schedule optimizer: multi-day free-slot search, domain-grouped sequencing,
//! and a greedy planner that ties classification, selection and quality together.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, info, warn};

use crate::config::TetradConfig;
use crate::domain::Domain;
use crate::quality::{ScheduleItem, ScheduleQuality, schedule_quality};
use crate::selector::SlotSelector;
use crate::slots::{SlotSynthesizer, TimeSlot, merge_adjacent};
use crate::task::{BusyInterval, PriorityPolarity, Task};

/// Label of a block in the daily 4 x 4h model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Sleep,
    Academic,
    Income,
    Growth,
    Life,
}

impl From<Domain> for BlockKind {
    fn from(d: Domain) -> Self {
        match d {
            Domain::Academic => BlockKind::Academic,
            Domain::Income => BlockKind::Income,
            Domain::Growth => BlockKind::Growth,
            Domain::Life => BlockKind::Life,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    #[serde(rename = "domain")]
    pub kind: BlockKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub hours: i64,
}

/// Quality of the tasks placed on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyQuality {
    pub date: NaiveDate,
    pub quality: ScheduleQuality,
}

/// Result of [`ScheduleOptimizer::plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutcome {
    /// Chronological.
    pub scheduled: Vec<Task>,
    /// No slot was found in the range; in sequencing order.
    pub unscheduled: Vec<Task>,
    /// Cumulative over the whole range. Balance is measured against the
    /// single-day domain target, so multi-day plans should read `daily_quality`.
    pub quality: ScheduleQuality,
    /// One entry per day that received at least one task, chronological.
    pub daily_quality: Vec<DailyQuality>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleOptimizer {
    synthesizer: SlotSynthesizer,
    selector: SlotSelector,
    polarity: PriorityPolarity,
}

impl ScheduleOptimizer {
    pub fn new(polarity: PriorityPolarity) -> Self {
        Self {
            synthesizer: SlotSynthesizer::new(),
            selector: SlotSelector::new(polarity),
            polarity,
        }
    }

    pub fn from_config(cfg: &TetradConfig) -> Self {
        Self::new(cfg.scheduling.priority_polarity)
    }

    pub fn selector(&self) -> &SlotSelector {
        &self.selector
    }

    /// Available slots across `[start_date, end_date]`, chronological.
    ///
    /// Days are synthesized in parallel and concatenated by day index.
    pub fn find_free_slots(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        busy: &[BusyInterval],
    ) -> Vec<TimeSlot> {
        let span = (end_date - start_date).num_days();
        if span < 0 {
            return Vec::new();
        }
        let day_count = span as usize + 1;
        let synthesizer = self.synthesizer;

        let per_day: Vec<Vec<TimeSlot>> = (0..day_count)
            .into_par_iter()
            .map(|offset| {
                let day = start_date + Duration::days(offset as i64);
                synthesizer
                    .synthesize(day, busy)
                    .into_iter()
                    .filter(|s| s.available)
                    .collect()
            })
            .collect();

        per_day.into_iter().flatten().collect()
    }

    /// Group by domain (academic, income, growth, life), most urgent first
    /// within each group. Stable for equal urgency.
    pub fn optimize_sequence(&self, tasks: Vec<Task>) -> Vec<Task> {
        let mut groups: [Vec<Task>; 4] = Default::default();
        for task in tasks {
            groups[task.domain.index()].push(task);
        }
        for group in groups.iter_mut() {
            group.sort_by_key(|t| Reverse(t.priority.urgency(self.polarity)));
        }
        groups.into_iter().flatten().collect()
    }

    pub fn schedule_quality(&self, items: &[ScheduleItem]) -> ScheduleQuality {
        schedule_quality(items)
    }

    /// The fixed daily block model, starting with the night before.
    pub fn time_blocks(&self, date: NaiveDate) -> Vec<TimeBlock> {
        let at = |hour: i64| date.and_time(NaiveTime::MIN) + Duration::hours(hour);

        let mut blocks = vec![TimeBlock {
            kind: BlockKind::Sleep,
            start: at(-2),
            end: at(6),
            hours: 8,
        }];
        for (i, domain) in Domain::ALL.iter().enumerate() {
            let start = 6 + 4 * i as i64;
            blocks.push(TimeBlock {
                kind: (*domain).into(),
                start: at(start),
                end: at(start + 4),
                hours: 4,
            });
        }
        blocks
    }

    /// Sequence `tasks`, then greedily place each one in the best free window.
    ///
    /// Tasks that already carry a schedule are kept as-is and block their
    /// interval. Adjacent free slots are merged so tasks longer than one
    /// slot can still be placed.
    pub fn plan(
        &self,
        tasks: Vec<Task>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        busy: &[BusyInterval],
    ) -> PlanOutcome {
        let mut busy = busy.to_vec();
        let (mut scheduled, pending): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(Task::is_scheduled);

        scheduled.retain(|t| match t.busy_interval() {
            Ok(Some(interval)) => {
                busy.push(interval);
                true
            }
            Ok(None) => true,
            Err(e) => {
                warn!(task = %t.id, error = %e, "dropping pre-scheduled task with invalid interval");
                false
            }
        });

        let mut windows = merge_adjacent(&self.find_free_slots(start_date, end_date, &busy));
        let mut unscheduled = Vec::new();

        for mut task in self.optimize_sequence(pending) {
            let chosen = self
                .selector
                .select(task.estimated_minutes, task.domain, &windows, task.priority)
                .map(|w| w.start);

            let Some(start) = chosen else {
                warn!(
                    task = %task.id,
                    domain = %task.domain,
                    minutes = task.estimated_minutes,
                    "no slot available"
                );
                unscheduled.push(task);
                continue;
            };

            task.schedule_at(start);
            debug!(task = %task.id, start = %start, minutes = task.estimated_minutes, "assigned slot");

            if let Some(idx) = windows.iter().position(|w| w.start == start) {
                let used_until = start + Duration::minutes(task.estimated_minutes);
                if used_until >= windows[idx].end {
                    windows.remove(idx);
                } else {
                    windows[idx].start = used_until;
                }
            }

            scheduled.push(task);
        }

        scheduled.sort_by_key(|t| t.scheduled_start);
        let items: Vec<ScheduleItem> = scheduled.iter().map(ScheduleItem::from).collect();
        let quality = schedule_quality(&items);
        let daily_quality = quality_by_day(&scheduled);

        info!(
            scheduled = scheduled.len(),
            unscheduled = unscheduled.len(),
            quality = quality.quality_score,
            "plan complete"
        );

        PlanOutcome {
            scheduled,
            unscheduled,
            quality,
            daily_quality,
        }
    }
}

/// Per-day quality of chronologically sorted, scheduled tasks.
fn quality_by_day(scheduled: &[Task]) -> Vec<DailyQuality> {
    let mut days: Vec<(NaiveDate, Vec<ScheduleItem>)> = Vec::new();
    for task in scheduled {
        let Some(start) = task.scheduled_start else {
            continue;
        };
        let date = start.date();
        match days.last_mut() {
            Some((d, items)) if *d == date => items.push(task.into()),
            _ => days.push((date, vec![task.into()])),
        }
    }

    days.into_iter()
        .map(|(date, items)| DailyQuality {
            date,
            quality: schedule_quality(&items),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn task(id: &str, domain: Domain, priority: i64, minutes: i64) -> Task {
        Task::new(id, id, domain, Priority::new(priority).unwrap(), minutes).unwrap()
    }

    #[test]
    fn test_find_free_slots_range() {
        let opt = ScheduleOptimizer::default();
        let slots = opt.find_free_slots(day(2), day(4), &[]);
        assert_eq!(slots.len(), 28 * 3);
        for pair in slots.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
        assert_eq!(slots[0].start.date(), day(2));
        assert_eq!(slots.last().unwrap().start.date(), day(4));
    }

    #[test]
    fn test_find_free_slots_excludes_busy_and_inverted_range() {
        let opt = ScheduleOptimizer::default();
        let start = day(2).and_hms_opt(6, 0, 0).unwrap();
        let busy = vec![BusyInterval::new("b", None, start, start + Duration::hours(2)).unwrap()];
        let slots = opt.find_free_slots(day(2), day(2), &busy);
        assert_eq!(slots.len(), 24);
        assert!(slots.iter().all(|s| s.available));

        assert!(opt.find_free_slots(day(4), day(2), &[]).is_empty());
    }

    /// Regression test: domain order is fixed regardless of input order.
    #[test]
    fn test_optimize_sequence_domain_order() {
        let opt = ScheduleOptimizer::default();
        let tasks = vec![
            task("l", Domain::Life, 3, 30),
            task("a", Domain::Academic, 3, 30),
            task("i", Domain::Income, 3, 30),
        ];
        let ids: Vec<_> = opt.optimize_sequence(tasks).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "i", "l"]);
    }

    #[test]
    fn test_optimize_sequence_priority_polarity() {
        let tasks = || {
            vec![
                task("p1", Domain::Growth, 1, 30),
                task("p5", Domain::Growth, 5, 30),
                task("p3", Domain::Growth, 3, 30),
            ]
        };

        let lower = ScheduleOptimizer::new(PriorityPolarity::LowerIsUrgent);
        let ids: Vec<_> = lower.optimize_sequence(tasks()).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["p1", "p3", "p5"]);

        let higher = ScheduleOptimizer::new(PriorityPolarity::HigherIsUrgent);
        let ids: Vec<_> = higher.optimize_sequence(tasks()).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["p5", "p3", "p1"]);
    }

    #[test]
    fn test_optimize_sequence_stable_for_equal_priority() {
        let opt = ScheduleOptimizer::default();
        let tasks = vec![
            task("first", Domain::Income, 2, 30),
            task("second", Domain::Income, 2, 30),
        ];
        let ids: Vec<_> = opt.optimize_sequence(tasks).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_time_blocks() {
        let blocks = ScheduleOptimizer::default().time_blocks(day(2));
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0].kind, BlockKind::Sleep);
        assert_eq!(blocks[0].start, day(1).and_hms_opt(22, 0, 0).unwrap());
        assert_eq!(blocks[0].end, day(2).and_hms_opt(6, 0, 0).unwrap());
        assert_eq!(blocks[1].kind, BlockKind::Academic);
        assert_eq!(blocks[4].kind, BlockKind::Life);
        assert_eq!(blocks[4].end, day(2).and_hms_opt(22, 0, 0).unwrap());
        assert_eq!(blocks.iter().map(|b| b.hours).sum::<i64>(), 24);
    }

    #[test]
    fn test_plan_places_tasks_in_matching_domains() {
        let opt = ScheduleOptimizer::default();
        let tasks = vec![
            task("thesis", Domain::Academic, 3, 60),
            task("run", Domain::Growth, 3, 40),
            task("email", Domain::Life, 2, 15),
        ];
        let out = opt.plan(tasks, day(2), day(2), &[]);
        assert!(out.unscheduled.is_empty());
        assert_eq!(out.scheduled.len(), 3);

        for t in &out.scheduled {
            let start = t.scheduled_start.unwrap();
            let end = t.scheduled_end.unwrap();
            assert_eq!(end - start, Duration::minutes(t.estimated_minutes));
            assert_eq!(Domain::for_hour(chrono::Timelike::hour(&start)), t.domain);
        }
        for pair in out.scheduled.windows(2) {
            assert!(pair[0].scheduled_end <= pair[1].scheduled_start);
        }
    }

    #[test]
    fn test_plan_reports_unschedulable() {
        let opt = ScheduleOptimizer::default();
        // Longest window in a day is the 4h academic/growth run; 300 minutes never fits.
        let out = opt.plan(vec![task("marathon", Domain::Growth, 3, 300)], day(2), day(2), &[]);
        assert!(out.scheduled.is_empty());
        assert_eq!(out.unscheduled.len(), 1);
        assert_eq!(out.quality, ScheduleQuality::zero());
    }

    /// Regression test: an inverted pre-scheduled interval never reaches the schedule.
    #[test]
    fn test_plan_drops_prescheduled_task_with_invalid_interval() {
        let json = r#"{"id":"broken","title":"stale import","domain":"academic","priority":3,
            "estimated_minutes":60,"scheduled_start":"2026-03-02T09:00:00","scheduled_end":"2026-03-02T08:00:00"}"#;
        let broken: Task = serde_json::from_str(json).unwrap();
        assert!(broken.validate().is_err());

        let opt = ScheduleOptimizer::default();
        let out = opt.plan(vec![broken, task("ok", Domain::Academic, 3, 30)], day(2), day(2), &[]);
        assert!(out.scheduled.iter().all(|t| t.id != "broken"));
        assert!(out.unscheduled.iter().all(|t| t.id != "broken"));
        assert_eq!(out.scheduled.len(), 1);
        // The inverted interval does not block the morning either.
        assert_eq!(out.scheduled[0].scheduled_start, day(2).and_hms_opt(6, 0, 0));
    }

    #[test]
    fn test_plan_reports_quality_per_day() {
        let opt = ScheduleOptimizer::default();
        let tasks = vec![
            task("mon", Domain::Academic, 3, 240),
            task("tue", Domain::Academic, 3, 240),
        ];
        let out = opt.plan(tasks, day(2), day(3), &[]);
        assert_eq!(out.scheduled.len(), 2);

        let dates: Vec<_> = out.daily_quality.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day(2), day(3)]);
        for d in &out.daily_quality {
            // 240 academic minutes hits one of four daily targets.
            assert!((d.quality.balance_score - 0.25).abs() < 1e-9);
            assert_eq!(d.quality.domain_distribution[&Domain::Academic], 240);
        }
        // Cumulative view overshoots the single-day target.
        assert_eq!(out.quality.balance_score, 0.0);
        assert_eq!(out.quality.domain_distribution[&Domain::Academic], 480);
    }

    #[test]
    fn test_plan_keeps_prescheduled_tasks_and_avoids_them() {
        let opt = ScheduleOptimizer::default();
        let mut fixed = task("fixed", Domain::Academic, 3, 240);
        fixed.schedule_at(day(2).and_hms_opt(6, 0, 0).unwrap());

        let out = opt.plan(
            vec![fixed.clone(), task("more", Domain::Academic, 3, 30)],
            day(2),
            day(2),
            &[],
        );
        assert_eq!(out.scheduled.len(), 2);
        assert_eq!(out.scheduled[0], fixed);
        assert!(out.scheduled[1].scheduled_start.unwrap() >= fixed.scheduled_end.unwrap());
    }
}
