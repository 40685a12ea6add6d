//! Automation status and command outcomes reported to clients.

use arena_core::ArenaView;
use client_blockchain_core::TxHandle;
use serde::{Deserialize, Serialize};

/// Orchestrator-local phase of one arena.
///
/// Tracks where the orchestrator believes the arena is between ledger reads;
/// the reconciled [`ArenaView`] stays authoritative for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OrchestratorPhase {
    #[default]
    Idle,
    Betting,
    Starting,
    RoundInFlight,
    RoundSettled,
    Finished,
}

/// Automation state of one arena.
///
/// `halted` with a `last_error` means automation stalled and an operator can
/// still drive the arena manually; a finished arena shows up in the view
/// instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationStatus {
    pub phase: OrchestratorPhase,
    pub halted: bool,
    pub last_error: Option<String>,
}

/// Read-only answer to a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub view: ArenaView,
    pub automation: AutomationStatus,
}

/// What executing a command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    /// The transition ran and the ledger advanced.
    Applied,
    /// The command was valid but had nothing to do.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SkipReason {
    #[error("command targets round {expected} but the ledger is at round {actual}")]
    StaleRound { expected: u8, actual: u8 },

    #[error("round {round} already has transaction {tx} in flight")]
    RoundInFlight { round: u8, tx: TxHandle },

    #[error("automation is halted")]
    AutomationHalted,

    #[error("arena is finished")]
    AlreadyFinished,

    #[error("arena already has a command pending or executing")]
    SlotBusy,
}
