//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or infrastructure.

pub mod errors;
pub mod handle;
pub mod providers;
pub mod status;

pub use errors::{ErrorScope, Result, RuntimeError, Stage};
pub use handle::RuntimeHandle;
pub use providers::{FixedMoveProvider, MoveProvider};
pub use status::{AutomationStatus, CommandOutcome, OrchestratorPhase, SkipReason, StatusReport};
