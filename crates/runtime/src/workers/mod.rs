//! Worker tasks that back the runtime orchestration.
//!
//! Each watched arena gets a scheduler (producer), an orchestrator (the
//! single consumer of the arena's queue slot) and a reconciler.

mod metrics;
mod orchestrator;
mod scheduler;

pub use metrics::{MetricsSnapshot, RoundMetrics};
pub use orchestrator::{BattleOrchestrator, OrchestratorConfig, OrchestratorDeps};
pub use scheduler::{Decision, Scheduler, decide};
