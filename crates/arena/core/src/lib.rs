//! Domain model shared by the arena orchestrator crates.
//!
//! `arena-core` defines the vocabulary of a two-combatant battle (arenas,
//! warriors, moves, outcomes) and the pure functions that derive observable
//! state from ledger reads. Nothing in this crate performs I/O: the ledger is
//! the source of truth and every projection here is computed from a
//! [`LedgerSnapshot`].
pub mod combatant;
pub mod command;
pub mod error;
pub mod ids;
pub mod moves;
pub mod outcome;
pub mod state;
pub mod timer;

pub use combatant::{Combatant, ScaledTraits, TRAIT_MAX, Traits};
pub use command::{ArenaAction, ArenaCommand, Origin};
pub use error::{DataError, DataErrorKind};
pub use ids::{ArenaId, InvalidArenaId, Side, WarriorId};
pub use moves::{Move, MoveSelection, SignedMove};
pub use outcome::{HitClass, MoveExecution, RoundOutcome, SideOutcome};
pub use state::{
    ArenaState, ArenaView, BattlePhase, BettingTotals, Damages, InfluenceCosts, LedgerSnapshot,
    Pairing,
};
pub use timer::PhaseTimer;
