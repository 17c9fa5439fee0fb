mod candidate;
pub mod config;
mod controller;
pub mod criteria;
mod error;
pub mod history;
pub mod num;
pub mod sampler;
pub mod schedule;
mod score;
mod service;
mod stats;
pub mod trial;

pub use crate::candidate::{Candidate, Cohort};
pub use crate::config::{Config, EngineConfig, RaceSettings};
pub use crate::controller::{RaceController, RaceReport, RaceRequest, RaceState, StopHandle};
pub use crate::error::{RaceError, ServiceError};
pub use crate::history::{BenchmarkHistory, HistoryEntry};
pub use crate::num::{Normalized, Percent};
pub use crate::sampler::{AggregatedMeasurement, Pacing};
pub use crate::schedule::ProgressFrame;
pub use crate::score::{score, Grade, Mode, ScoredResult};
pub use crate::service::{BenchmarkReport, BenchmarkService};
pub use crate::stats::{RaceStats, RaceStatsTracker};
pub use crate::trial::{TrialOutcome, PENALTY_NS};
