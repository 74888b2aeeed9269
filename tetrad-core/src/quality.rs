//! Schedule-quality metrics: domain balance, switch cost, efficiency.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Domain, switch_cost};
use crate::task::Task;

/// Daily minutes each domain should ideally receive (4 x 4h model).
pub const TARGET_DOMAIN_MINUTES: i64 = 240;
/// Worst-case switch cost per transition used to normalize efficiency.
pub const MAX_SWITCH_COST: i64 = 20;

/// One entry of an ordered schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub domain: Domain,
    pub duration_minutes: i64,
}

impl From<&Task> for ScheduleItem {
    fn from(task: &Task) -> Self {
        Self {
            domain: task.domain,
            duration_minutes: task.estimated_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleQuality {
    pub quality_score: f64,
    pub balance_score: f64,
    pub efficiency_score: f64,
    pub switch_cost_total: i64,
    pub domain_distribution: BTreeMap<Domain, i64>,
}

impl ScheduleQuality {
    pub fn zero() -> Self {
        Self {
            quality_score: 0.0,
            balance_score: 0.0,
            efficiency_score: 0.0,
            switch_cost_total: 0,
            domain_distribution: BTreeMap::new(),
        }
    }
}

/// Total switch cost over adjacent pairs, in order.
pub fn total_switch_cost(items: &[ScheduleItem]) -> i64 {
    items
        .windows(2)
        .map(|pair| switch_cost(pair[0].domain, pair[1].domain))
        .sum()
}

pub fn schedule_quality(items: &[ScheduleItem]) -> ScheduleQuality {
    if items.is_empty() {
        return ScheduleQuality::zero();
    }

    let mut distribution: BTreeMap<Domain, i64> = Domain::ALL.iter().map(|d| (*d, 0)).collect();
    for item in items {
        *distribution.entry(item.domain).or_insert(0) += item.duration_minutes;
    }

    let target = TARGET_DOMAIN_MINUTES as f64;
    let balance_score = distribution
        .values()
        .map(|minutes| (1.0 - (*minutes as f64 - target).abs() / target).max(0.0))
        .sum::<f64>()
        / distribution.len() as f64;

    let switch_cost_total = total_switch_cost(items);
    let transitions = (items.len() as i64 - 1).max(1);
    let efficiency_score =
        (1.0 - switch_cost_total as f64 / (transitions * MAX_SWITCH_COST) as f64).max(0.0);

    ScheduleQuality {
        quality_score: 0.5 * balance_score + 0.5 * efficiency_score,
        balance_score,
        efficiency_score,
        switch_cost_total,
        domain_distribution: distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(domain: Domain, minutes: i64) -> ScheduleItem {
        ScheduleItem {
            domain,
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_empty_schedule_is_zero() {
        let q = schedule_quality(&[]);
        assert_eq!(q, ScheduleQuality::zero());
    }

    /// Regression test: academic -> life costs exactly 20 minutes.
    #[test]
    fn test_academic_to_life_switch_cost() {
        let items = [item(Domain::Academic, 30), item(Domain::Life, 30)];
        let q = schedule_quality(&items);
        assert_eq!(q.switch_cost_total, 20);
        assert_eq!(q.efficiency_score, 0.0);
    }

    #[test]
    fn test_same_domain_adjacency_is_free() {
        let items = [item(Domain::Growth, 30), item(Domain::Growth, 45)];
        let q = schedule_quality(&items);
        assert_eq!(q.switch_cost_total, 0);
        assert_eq!(q.efficiency_score, 1.0);
    }

    #[test]
    fn test_perfect_balance() {
        let items: Vec<_> = Domain::ALL.iter().map(|d| item(*d, 240)).collect();
        let q = schedule_quality(&items);
        assert!((q.balance_score - 1.0).abs() < 1e-9);
        // a->i 10, i->g 10, g->l 10 over 3 transitions of max 20
        assert_eq!(q.switch_cost_total, 30);
        assert!((q.efficiency_score - 0.5).abs() < 1e-9);
        assert!((q.quality_score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_balance_partial_and_overshoot() {
        // academic 120 -> 0.5, income 480 -> 0.0, others 0 -> 0.0
        let items = [item(Domain::Academic, 120), item(Domain::Income, 480)];
        let q = schedule_quality(&items);
        assert!((q.balance_score - 0.125).abs() < 1e-9);
        assert_eq!(q.domain_distribution[&Domain::Growth], 0);
        assert_eq!(q.domain_distribution[&Domain::Income], 480);
    }

    #[test]
    fn test_single_item_efficiency() {
        let q = schedule_quality(&[item(Domain::Life, 30)]);
        assert_eq!(q.switch_cost_total, 0);
        assert_eq!(q.efficiency_score, 1.0);
    }
}
