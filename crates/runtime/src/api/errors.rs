//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the ledger gateway, the inference collaborator and the
//! move authority so clients can bubble them up with consistent context, and
//! classifies each one by how far its effect reaches.
use std::fmt;

use arena_core::{ArenaAction, ArenaId, DataError};
use client_blockchain_core::{DecodeError, TransactionError, TransportError};
use thiserror::Error;

use crate::authority::AuthorizationError;
use crate::inference::InferenceError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("ledger read failed: {0}")]
    Read(#[from] TransportError),

    #[error("receipt decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("{action} on {arena} confirmed but the ledger did not advance")]
    StateRollback { arena: ArenaId, action: ArenaAction },

    #[error("{stage} timed out")]
    Timeout { stage: Stage },

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("arena {0} is not watched by this runtime")]
    ArenaNotWatched(ArenaId),

    #[error("arena {0} is already watched")]
    ArenaAlreadyWatched(ArenaId),

    #[error("arena {0} is finished")]
    ArenaFinished(ArenaId),

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("runtime channel closed")]
    ChannelClosed,

    #[error("runtime is shutting down")]
    ShuttingDown,

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

/// How far an error's effect reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// The process cannot continue.
    Fatal,
    /// Automation for one arena stops until an operator intervenes.
    Arena,
    /// Only the current command or round is lost; the next tick retries.
    Round,
}

impl RuntimeError {
    pub fn scope(&self) -> ErrorScope {
        match self {
            RuntimeError::Configuration(_)
            | RuntimeError::ChannelClosed
            | RuntimeError::WorkerJoin(_) => ErrorScope::Fatal,

            RuntimeError::StateRollback { .. }
            | RuntimeError::ArenaNotWatched(_)
            | RuntimeError::ArenaAlreadyWatched(_)
            | RuntimeError::ArenaFinished(_)
            | RuntimeError::ShuttingDown => ErrorScope::Arena,

            RuntimeError::Data(_)
            | RuntimeError::Transaction(_)
            | RuntimeError::Read(_)
            | RuntimeError::Decode(_)
            | RuntimeError::Timeout { .. }
            | RuntimeError::Inference(_)
            | RuntimeError::Authorization(_)
            | RuntimeError::InvalidCommand(_)
            | RuntimeError::CommandFailed(_) => ErrorScope::Round,
        }
    }

    /// Whether automation for the arena must halt after this error.
    pub fn halts_automation(&self) -> bool {
        matches!(self, RuntimeError::StateRollback { .. })
    }
}

/// Pipeline stage that ran out of time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Inference,
    Round,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Inference => "inference",
            Stage::Round => "round",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use client_blockchain_core::TxHandle;

    use super::*;

    #[test]
    fn rollback_is_arena_scoped_and_halts() {
        let err = RuntimeError::StateRollback {
            arena: ArenaId::new("0xa1").unwrap(),
            action: ArenaAction::StartGame,
        };
        assert_eq!(err.scope(), ErrorScope::Arena);
        assert!(err.halts_automation());
        assert_eq!(
            err.to_string(),
            "startGame on 0xa1 confirmed but the ledger did not advance"
        );
    }

    #[test]
    fn round_failures_do_not_halt() {
        let timeout = RuntimeError::from(TransactionError::ConfirmationTimeout {
            tx: TxHandle::new("0x01"),
            waited: Duration::from_secs(60),
        });
        assert_eq!(timeout.scope(), ErrorScope::Round);
        assert!(!timeout.halts_automation());

        let shape = RuntimeError::from(DataError::unrecognized_shape("{}"));
        assert_eq!(shape.scope(), ErrorScope::Round);
    }

    #[test]
    fn configuration_is_fatal() {
        let err = RuntimeError::Configuration("GAME_MASTER_PRIVATE_KEY is required".into());
        assert_eq!(err.scope(), ErrorScope::Fatal);
        assert_eq!(Stage::Round.to_string(), "round");
    }
}
