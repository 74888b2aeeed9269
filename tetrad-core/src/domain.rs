//! Domain catalog: the four fixed life domains and their static metadata.
//!
//! Every day is modelled as four 4-hour blocks (academic, income, growth,
//! life). The tables here are read by every other module and never change
//! for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Academic,
    Income,
    Growth,
    Life,
}

/// Static per-domain metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomainConfig {
    pub domain: Domain,
    /// English display name.
    pub name: &'static str,
    /// Short native label shown in the UI.
    pub label: &'static str,
    /// Hex display color.
    pub color: &'static str,
    /// Subtracted from a computed priority (0..=2). Higher = inherently more urgent.
    pub priority_boost: u8,
    /// Default duration estimate in minutes when nothing in the text says otherwise.
    pub base_minutes: i64,
}

const CATALOG: [DomainConfig; 4] = [
    DomainConfig {
        domain: Domain::Academic,
        name: "Academic",
        label: "学术",
        color: "#4F6BED",
        priority_boost: 0,
        base_minutes: 60,
    },
    DomainConfig {
        domain: Domain::Income,
        name: "Income",
        label: "收入",
        color: "#2E9E5B",
        priority_boost: 1,
        base_minutes: 45,
    },
    DomainConfig {
        domain: Domain::Growth,
        name: "Growth",
        label: "成长",
        color: "#E08A1E",
        priority_boost: 0,
        base_minutes: 40,
    },
    DomainConfig {
        domain: Domain::Life,
        name: "Life",
        label: "生活",
        color: "#C2457A",
        priority_boost: 0,
        base_minutes: 30,
    },
];

impl Domain {
    /// Fixed ordering used for sequencing and reporting.
    pub const ALL: [Domain; 4] = [Domain::Academic, Domain::Income, Domain::Growth, Domain::Life];

    pub fn config(self) -> &'static DomainConfig {
        &CATALOG[self.index()]
    }

    pub fn index(self) -> usize {
        match self {
            Domain::Academic => 0,
            Domain::Income => 1,
            Domain::Growth => 2,
            Domain::Life => 3,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Domain::Academic => "academic",
            Domain::Income => "income",
            Domain::Growth => "growth",
            Domain::Life => "life",
        }
    }

    pub fn priority_boost(self) -> u8 {
        self.config().priority_boost
    }

    pub fn base_minutes(self) -> i64 {
        self.config().base_minutes
    }

    /// Authoritative hour -> domain table used when tagging slots.
    pub fn for_hour(hour: u32) -> Domain {
        match hour {
            6..=9 => Domain::Academic,
            10..=13 => Domain::Income,
            14..=17 => Domain::Growth,
            _ => Domain::Life,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Domain {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "academic" => Ok(Domain::Academic),
            "income" => Ok(Domain::Income),
            "growth" => Ok(Domain::Growth),
            "life" => Ok(Domain::Life),
            other => Err(ScheduleError::UnknownDomain(other.to_string())),
        }
    }
}

/// All four catalog entries in fixed order.
pub fn catalog() -> &'static [DomainConfig; 4] {
    &CATALOG
}

/// Minutes lost when consecutive items switch between two domains.
///
/// Symmetric; same-domain adjacency costs nothing.
pub fn switch_cost(from: Domain, to: Domain) -> i64 {
    use Domain::*;

    let (a, b) = if from <= to { (from, to) } else { (to, from) };
    match (a, b) {
        (Academic, Income) => 10,
        (Academic, Growth) => 15,
        (Academic, Life) => 20,
        (Income, Growth) => 10,
        (Income, Life) => 15,
        (Growth, Life) => 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_all() {
        for (i, d) in Domain::ALL.iter().enumerate() {
            assert_eq!(catalog()[i].domain, *d);
            assert_eq!(d.index(), i);
        }
    }

    #[test]
    fn test_priority_boost_in_range() {
        for entry in catalog() {
            assert!(entry.priority_boost <= 2, "{} boost too large", entry.name);
        }
        assert_eq!(Domain::Income.priority_boost(), 1);
        assert_eq!(Domain::Academic.priority_boost(), 0);
    }

    #[test]
    fn test_hour_table() {
        assert_eq!(Domain::for_hour(6), Domain::Academic);
        assert_eq!(Domain::for_hour(9), Domain::Academic);
        assert_eq!(Domain::for_hour(10), Domain::Income);
        assert_eq!(Domain::for_hour(13), Domain::Income);
        assert_eq!(Domain::for_hour(14), Domain::Growth);
        assert_eq!(Domain::for_hour(17), Domain::Growth);
        assert_eq!(Domain::for_hour(18), Domain::Life);
        assert_eq!(Domain::for_hour(21), Domain::Life);
        assert_eq!(Domain::for_hour(3), Domain::Life);
    }

    #[test]
    fn test_switch_cost_symmetric() {
        for a in Domain::ALL {
            assert_eq!(switch_cost(a, a), 0);
            for b in Domain::ALL {
                assert_eq!(switch_cost(a, b), switch_cost(b, a));
            }
        }
        assert_eq!(switch_cost(Domain::Academic, Domain::Life), 20);
        assert_eq!(switch_cost(Domain::Income, Domain::Growth), 10);
    }

    #[test]
    fn test_parse_domain() {
        assert_eq!("Academic".parse::<Domain>().unwrap(), Domain::Academic);
        assert_eq!(" life ".parse::<Domain>().unwrap(), Domain::Life);
        assert!("sleep".parse::<Domain>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Domain::Growth).unwrap();
        assert_eq!(json, "\"growth\"");
        let d: Domain = serde_json::from_str("\"income\"").unwrap();
        assert_eq!(d, Domain::Income);
    }
}
