//! Intake: turn raw task text into validated tasks.
//!
//! An optional semantic classifier may supply hints. A hint is used only when
//! its confidence is above the configured threshold; otherwise the heuristic
//! classifier fills the field and the resolution records why. Failures of the
//! external classifier are plain values, never panics or early returns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::classifier::HeuristicClassifier;
use crate::config::TetradConfig;
use crate::domain::Domain;
use crate::error::Result;
use crate::task::{
    BusyInterval, MAX_TASK_MINUTES, MIN_TASK_MINUTES, Priority, PriorityPolarity, Task, TaskDraft,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainHint {
    pub domain: Domain,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationHint {
    pub estimated_minutes: i64,
    pub confidence: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierFailure {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    #[error("classifier returned malformed output: {0}")]
    Malformed(String),
}

/// External (e.g. embedding or LLM based) classifier.
pub trait SemanticClassifier {
    fn classify_domain(&self, text: &str) -> std::result::Result<DomainHint, ClassifierFailure>;
    fn estimate_duration(&self, text: &str) -> std::result::Result<DurationHint, ClassifierFailure>;
}

/// Pre-computed hints, e.g. passed on the command line or by an upstream service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedHints {
    pub domain: Option<DomainHint>,
    pub duration: Option<DurationHint>,
}

impl SemanticClassifier for FixedHints {
    fn classify_domain(&self, _text: &str) -> std::result::Result<DomainHint, ClassifierFailure> {
        self.domain
            .clone()
            .ok_or_else(|| ClassifierFailure::Unavailable("no domain hint".to_string()))
    }

    fn estimate_duration(&self, _text: &str) -> std::result::Result<DurationHint, ClassifierFailure> {
        self.duration
            .clone()
            .ok_or_else(|| ClassifierFailure::Unavailable("no duration hint".to_string()))
    }
}

/// Why a field came from the heuristic classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FallbackReason {
    NoClassifier,
    Failed { detail: String },
    LowConfidence { confidence: f64, threshold: f64 },
    OutOfRange { minutes: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ResolutionSource {
    External,
    Heuristic { fallback: FallbackReason },
}

impl ResolutionSource {
    pub fn is_external(&self) -> bool {
        matches!(self, ResolutionSource::External)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub domain: Domain,
    pub priority: Priority,
    pub estimated_minutes: i64,
    pub confidence: f64,
    pub reasoning: String,
    pub domain_source: ResolutionSource,
    pub duration_source: ResolutionSource,
}

struct DomainPick {
    domain: Domain,
    confidence: f64,
    reasoning: String,
    source: ResolutionSource,
}

#[derive(Debug, Clone, Copy)]
pub struct Intake {
    heuristic: HeuristicClassifier,
    threshold: f64,
}

impl Default for Intake {
    fn default() -> Self {
        Self::from_config(&TetradConfig::default())
    }
}

impl Intake {
    pub fn new(threshold: f64) -> Self {
        Self {
            heuristic: HeuristicClassifier::new(),
            threshold,
        }
    }

    /// Threshold and priority polarity both come from `cfg`.
    pub fn from_config(cfg: &TetradConfig) -> Self {
        Self::new(cfg.classifier.confidence_threshold).with_polarity(cfg.scheduling.priority_polarity)
    }

    pub fn with_polarity(mut self, polarity: PriorityPolarity) -> Self {
        self.heuristic = HeuristicClassifier::with_polarity(polarity);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn polarity(&self) -> PriorityPolarity {
        self.heuristic.polarity()
    }

    /// Classify `text`, preferring confident external hints field by field.
    pub fn resolve(&self, text: &str, classifier: Option<&dyn SemanticClassifier>) -> Resolution {
        let pick = self.pick_domain(text, classifier);
        let priority = self.heuristic.priority(text, pick.domain);
        let (estimated_minutes, duration_source) = self.pick_minutes(text, pick.domain, classifier);

        Resolution {
            domain: pick.domain,
            priority,
            estimated_minutes,
            confidence: pick.confidence,
            reasoning: pick.reasoning,
            domain_source: pick.source,
            duration_source,
        }
    }

    /// Fill the absent fields of `draft` and validate the result.
    pub fn complete(
        &self,
        draft: TaskDraft,
        fallback_id: &str,
        classifier: Option<&dyn SemanticClassifier>,
    ) -> Result<Task> {
        let title = draft.title.trim().to_string();
        let domain = match draft.domain {
            Some(d) => d,
            None => self.pick_domain(&title, classifier).domain,
        };
        let priority = draft
            .priority
            .unwrap_or_else(|| self.heuristic.priority(&title, domain));
        let minutes = match draft.estimated_minutes {
            Some(m) => m,
            None => self.pick_minutes(&title, domain, classifier).0,
        };
        let id = draft.id.unwrap_or_else(|| fallback_id.to_string());

        Task::new(id, title, domain, priority, minutes)
    }

    fn pick_domain(&self, text: &str, classifier: Option<&dyn SemanticClassifier>) -> DomainPick {
        let fallback = match classifier.map(|c| c.classify_domain(text)) {
            None => FallbackReason::NoClassifier,
            Some(Ok(hint)) if hint.confidence > self.threshold => {
                return DomainPick {
                    domain: hint.domain,
                    confidence: hint.confidence,
                    reasoning: hint.reasoning,
                    source: ResolutionSource::External,
                };
            }
            Some(Ok(hint)) => FallbackReason::LowConfidence {
                confidence: hint.confidence,
                threshold: self.threshold,
            },
            Some(Err(e)) => FallbackReason::Failed {
                detail: e.to_string(),
            },
        };

        log_fallback("domain", &fallback);
        let matched = self.heuristic.classify_domain(text);
        DomainPick {
            domain: matched.domain,
            confidence: matched.confidence(),
            reasoning: matched.reasoning(),
            source: ResolutionSource::Heuristic { fallback },
        }
    }

    fn pick_minutes(
        &self,
        text: &str,
        domain: Domain,
        classifier: Option<&dyn SemanticClassifier>,
    ) -> (i64, ResolutionSource) {
        let fallback = match classifier.map(|c| c.estimate_duration(text)) {
            None => FallbackReason::NoClassifier,
            Some(Ok(hint))
                if hint.confidence > self.threshold
                    && (MIN_TASK_MINUTES..=MAX_TASK_MINUTES).contains(&hint.estimated_minutes) =>
            {
                return (hint.estimated_minutes, ResolutionSource::External);
            }
            Some(Ok(hint)) if hint.confidence > self.threshold => FallbackReason::OutOfRange {
                minutes: hint.estimated_minutes,
            },
            Some(Ok(hint)) => FallbackReason::LowConfidence {
                confidence: hint.confidence,
                threshold: self.threshold,
            },
            Some(Err(e)) => FallbackReason::Failed {
                detail: e.to_string(),
            },
        };

        log_fallback("duration", &fallback);
        (
            self.heuristic.minutes(text, domain),
            ResolutionSource::Heuristic { fallback },
        )
    }
}

fn log_fallback(field: &str, reason: &FallbackReason) {
    match reason {
        FallbackReason::NoClassifier => debug!(field, "no external classifier; using heuristic"),
        other => info!(field, reason = ?other, "classification fallback to heuristic"),
    }
}

/// One draft per non-empty line.
pub fn split_task_lines(text: &str) -> Vec<TaskDraft> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(TaskDraft::new)
        .collect()
}

/// Storage seam for callers that keep tasks between calls.
pub trait TaskRepository {
    fn get(&self, id: &str) -> Option<Task>;
    /// Insert or replace; returns the previous value.
    fn put(&mut self, task: Task) -> Option<Task>;
    fn delete(&mut self, id: &str) -> Option<Task>;
    fn list(&self) -> Vec<Task>;

    /// Conflict intervals of every scheduled task.
    fn busy_snapshot(&self) -> Result<Vec<BusyInterval>> {
        let mut out = Vec::new();
        for task in self.list() {
            if let Some(interval) = task.busy_interval()? {
                out.push(interval);
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: BTreeMap<String, Task>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn get(&self, id: &str) -> Option<Task> {
        self.tasks.get(id).cloned()
    }

    fn put(&mut self, task: Task) -> Option<Task> {
        self.tasks.insert(task.id.clone(), task)
    }

    fn delete(&mut self, id: &str) -> Option<Task> {
        self.tasks.remove(id)
    }

    fn list(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }
}
