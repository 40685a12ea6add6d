//! Event payloads published on each topic.

use std::fmt;

use arena_core::{
    ArenaAction, ArenaCommand, ArenaId, ArenaView, HitClass, MoveSelection, Origin, RoundOutcome,
    Side, WarriorId,
};
use client_blockchain_core::{ObservedEvent, TxHandle};
use serde::{Deserialize, Serialize};

use crate::api::CommandOutcome;
use crate::inference::ResponseShape;

/// Events on [`Topic::Arena`](super::Topic::Arena).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArenaEvent {
    /// The reconciled view changed.
    ViewUpdated { arena: ArenaId, view: ArenaView },

    /// A contract event picked up by incremental reconciliation.
    LedgerEventObserved { arena: ArenaId, event: ObservedEvent },
}

/// Events on [`Topic::Round`](super::Topic::Round).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RoundEvent {
    MovesSelected {
        arena: ArenaId,
        round: u8,
        selection: MoveSelection,
        shape: ResponseShape,
    },

    Submitted {
        arena: ArenaId,
        round: u8,
        tx: TxHandle,
    },

    Settled {
        arena: ArenaId,
        round: u8,
        tx: TxHandle,
        outcome: RoundOutcome,
        summary: RoundSummary,
    },

    /// The round was abandoned without advancing local state.
    Aborted {
        arena: ArenaId,
        round: u8,
        error: String,
    },
}

/// Events on [`Topic::Automation`](super::Topic::Automation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AutomationEvent {
    Enqueued { command: ArenaCommand },

    /// A command was dropped because the arena's slot was busy.
    Duplicate { command: ArenaCommand },

    CommandCompleted {
        arena: ArenaId,
        action: ArenaAction,
        origin: Origin,
        result: Result<CommandOutcome, String>,
    },

    Halted { arena: ArenaId, reason: String },

    Resumed { arena: ArenaId },

    Finished {
        arena: ArenaId,
        winner: Option<Side>,
    },
}

/// One side of a settled round, rendered with display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSummary {
    pub warrior: WarriorId,
    pub warrior_name: String,
    pub move_name: String,
    pub hit: HitClass,
    pub damage_to_opponent: u64,
    pub self_recovery: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub a: SideSummary,
    pub b: SideSummary,
}

impl fmt::Display for SideSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} used {}: {}", self.warrior_name, self.move_name, self.hit)?;
        if self.damage_to_opponent > 0 {
            write!(f, ", {} damage", self.damage_to_opponent)?;
        }
        if self.self_recovery > 0 {
            write!(f, ", recovered {}", self.self_recovery)?;
        }
        Ok(())
    }
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.a, self.b)
    }
}

impl RoundSummary {
    pub fn side(&self, side: Side) -> &SideSummary {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// Whether the summary agrees with the decoded outcome it was built from.
    pub fn matches(&self, outcome: &RoundOutcome) -> bool {
        [Side::A, Side::B].into_iter().all(|side| {
            let summary = self.side(side);
            let decoded = outcome.side(side);
            summary.hit == decoded.hit
                && summary.damage_to_opponent == decoded.execution.damage_to_opponent
                && summary.self_recovery == decoded.execution.self_recovery
        })
    }
}
