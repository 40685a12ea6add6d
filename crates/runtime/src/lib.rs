//! Runtime orchestration for two-combatant battle arenas.
//!
//! This crate wires together the ledger gateway, the inference collaborator,
//! the move authority and the per-arena worker tasks into a cohesive runtime
//! API. Consumers embed [`Runtime`] to watch arenas, and interact with them
//! through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`inference`] builds prompts and decodes model responses
//! - [`authority`] signs move pairs the way the ledger verifies them
//! - [`queue`] and [`reconciler`] hold the per-arena command slot and view
//! - `workers` keeps the scheduler and orchestrator tasks internal to the crate
pub mod api;
pub mod authority;
pub mod events;
pub mod inference;
pub mod queue;
pub mod reconciler;
pub mod runtime;

mod workers;

pub use api::{
    AutomationStatus, CommandOutcome, ErrorScope, FixedMoveProvider, MoveProvider,
    OrchestratorPhase, Result, RuntimeError, RuntimeHandle, SkipReason, Stage, StatusReport,
};
pub use authority::{AuthorizationError, MoveAuthorizer};
pub use events::{
    ArenaEvent, AutomationEvent, Event, EventBus, RoundEvent, RoundSummary, SideSummary, Topic,
};
pub use inference::{
    HttpMoveProvider, InferenceError, JsonMetadataSource, MoveAdapter, MoveNameCache, NoMetadata,
    WarriorMetadataSource, WarriorProfile,
};
pub use queue::{CommandAck, CommandQueue};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::{Decision, MetricsSnapshot, RoundMetrics, decide};
