//! Runtime configuration shared by the core and its callers.
//!
//! The core never reads files; callers deserialize this (TOML in the CLI)
//! and pass it in.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::task::PriorityPolarity;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TetradConfig {
    #[serde(default)]
    pub classifier: ClassifierSection,
    #[serde(default)]
    pub scheduling: SchedulingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSection {
    /// External hints are used only when their confidence is above this.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingSection {
    #[serde(default)]
    pub priority_polarity: PriorityPolarity,
    /// Days searched by `plan` and `slots` when no range is given.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// IANA zone used to decide what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_confidence_threshold() -> f64 {
    0.6
}

fn default_horizon_days() -> u32 {
    7
}

fn default_timezone() -> String {
    "Asia/Shanghai".to_string()
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl Default for SchedulingSection {
    fn default() -> Self {
        Self {
            priority_polarity: PriorityPolarity::default(),
            horizon_days: default_horizon_days(),
            timezone: default_timezone(),
        }
    }
}

impl TetradConfig {
    pub fn validate(&self) -> Result<()> {
        let t = self.classifier.confidence_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ScheduleError::InvalidConfig(format!(
                "confidence_threshold must be within 0..=1, got {t}"
            )));
        }
        if self.scheduling.horizon_days == 0 {
            return Err(ScheduleError::InvalidConfig(
                "horizon_days must be at least 1".to_string(),
            ));
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.scheduling.timezone.parse::<Tz>().map_err(|_| {
            ScheduleError::InvalidConfig(format!("invalid timezone: {}", self.scheduling.timezone))
        })
    }
}
