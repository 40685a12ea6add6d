//! Decoded arena contract events and round-outcome classification.

use arena_core::{Move, MoveExecution, RoundOutcome, WarriorId};
use serde::{Deserialize, Serialize};

/// Arena contract event, decoded from a raw log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    RoundOver {
        round: u8,
        damage_a: u64,
        damage_b: u64,
    },
    GameStarted {
        started_at: u64,
    },
    GameFinished {
        winner: WarriorId,
        damage_a: u64,
        damage_b: u64,
    },
    /// One combatant's move. Carries no combatant key: within a `battle`
    /// receipt the first occurrence is combatant A, the second B.
    MoveExecuted {
        executor: String,
        execution: MoveExecution,
    },
    Influenced {
        by: String,
        warrior: WarriorId,
    },
    Defluenced {
        by: String,
        warrior: WarriorId,
    },
    BetPlaced {
        bettor: String,
        warrior: WarriorId,
        multiplier: u64,
    },
}

impl LedgerEvent {
    /// Whether observing this event should trigger a full read sweep.
    pub fn affects_view(&self) -> bool {
        !matches!(self, LedgerEvent::MoveExecuted { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::RoundOver { .. } => "RoundOver",
            LedgerEvent::GameStarted { .. } => "GameStarted",
            LedgerEvent::GameFinished { .. } => "GameFinished",
            LedgerEvent::MoveExecuted { .. } => "MoveExecuted",
            LedgerEvent::Influenced { .. } => "Influenced",
            LedgerEvent::Defluenced { .. } => "Defluenced",
            LedgerEvent::BetPlaced { .. } => "BetPlaced",
        }
    }
}

/// A ledger event together with the block it was observed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedEvent {
    pub block_number: u64,
    pub event: LedgerEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("receipt carries {found} move-executed events, expected 2")]
    MissingMoveEvents { found: usize },

    #[error("unknown move discriminant {0}")]
    UnknownMove(u8),

    #[error("malformed log: {0}")]
    MalformedLog(String),
}

/// Extracts both combatants' outcomes from a settled `battle` receipt.
///
/// Relies only on event order: the first move-executed event belongs to
/// combatant A and the second to combatant B.
pub fn decode_move_outcomes(receipt: &crate::types::Receipt) -> Result<RoundOutcome, DecodeError> {
    let executions: Vec<MoveExecution> = receipt
        .events
        .iter()
        .filter_map(|event| match event {
            LedgerEvent::MoveExecuted { execution, .. } => Some(*execution),
            _ => None,
        })
        .collect();

    match executions.as_slice() {
        [a, b] => Ok(RoundOutcome::from_executions(*a, *b)),
        other => Err(DecodeError::MissingMoveEvents { found: other.len() }),
    }
}

/// Maps a raw move discriminant from a log onto the vocabulary.
pub fn move_from_log(raw: u8) -> Result<Move, DecodeError> {
    Move::from_u8(raw).ok_or(DecodeError::UnknownMove(raw))
}

#[cfg(test)]
mod tests {
    use arena_core::HitClass;

    use super::*;
    use crate::types::{Receipt, TxHandle};

    fn executed(mv: Move, damage: u64, recovery: u64, dodged: bool) -> LedgerEvent {
        LedgerEvent::MoveExecuted {
            executor: "0xgm".into(),
            execution: MoveExecution {
                mv,
                damage_to_opponent: damage,
                self_recovery: recovery,
                dodged,
            },
        }
    }

    fn receipt(events: Vec<LedgerEvent>) -> Receipt {
        Receipt {
            tx: TxHandle::new("0x01"),
            block_number: 7,
            events,
        }
    }

    #[test]
    fn first_event_is_a_second_is_b() {
        let receipt = receipt(vec![
            executed(Move::Strike, 12, 0, false),
            executed(Move::Taunt, 0, 0, false),
            LedgerEvent::RoundOver {
                round: 1,
                damage_a: 0,
                damage_b: 12,
            },
        ]);

        let outcome = decode_move_outcomes(&receipt).unwrap();
        assert_eq!(outcome.a.execution.mv, Move::Strike);
        assert_eq!(outcome.a.hit, HitClass::Hit);
        assert_eq!(outcome.b.execution.mv, Move::Taunt);
        assert_eq!(outcome.b.hit, HitClass::Miss);
    }

    #[test]
    fn recovery_and_dodge_count_as_hits() {
        let receipt = receipt(vec![
            executed(Move::Recover, 0, 5, false),
            executed(Move::Dodge, 0, 0, true),
        ]);
        let outcome = decode_move_outcomes(&receipt).unwrap();
        assert_eq!(outcome.a.hit, HitClass::Hit);
        assert_eq!(outcome.b.hit, HitClass::Hit);
    }

    #[test]
    fn missing_move_events_is_an_error() {
        let receipt = receipt(vec![executed(Move::Strike, 1, 0, false)]);
        assert_eq!(
            decode_move_outcomes(&receipt),
            Err(DecodeError::MissingMoveEvents { found: 1 })
        );
    }

    #[test]
    fn move_discriminant_outside_vocabulary_is_rejected() {
        assert_eq!(move_from_log(3), Ok(Move::Special));
        assert_eq!(move_from_log(9), Err(DecodeError::UnknownMove(9)));
    }
}
