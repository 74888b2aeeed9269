//! tetrad-core: slot synthesis, slot scoring, sequencing and heuristic
//! classification for the four-domain (academic / income / growth / life)
//! daily model.
//!
//! Everything here is a pure function of its inputs. Persistence, transport
//! and any model-based classifier live with the caller.

pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod intake;
pub mod optimizer;
pub mod quality;
pub mod selector;
pub mod slots;
pub mod task;
pub mod time;

pub use classifier::{Classification, DomainMatch, HeuristicClassifier};
pub use config::TetradConfig;
pub use domain::{Domain, DomainConfig, catalog, switch_cost};
pub use error::ScheduleError;
pub use intake::{
    ClassifierFailure, DomainHint, DurationHint, FallbackReason, FixedHints, InMemoryTaskRepository,
    Intake, Resolution, ResolutionSource, SemanticClassifier, TaskRepository, split_task_lines,
};
pub use optimizer::{BlockKind, DailyQuality, PlanOutcome, ScheduleOptimizer, TimeBlock};
pub use quality::{ScheduleItem, ScheduleQuality, schedule_quality};
pub use selector::SlotSelector;
pub use slots::{SlotSynthesizer, TimeSlot, merge_adjacent};
pub use task::{BusyInterval, Priority, PriorityPolarity, Task, TaskDraft};
