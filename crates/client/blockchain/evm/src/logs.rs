//! Arena log decoding into [`LedgerEvent`]s.

use alloy_primitives::{Address, U256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use arena_core::{MoveExecution, WarriorId};
use client_blockchain_core::events::move_from_log;
use client_blockchain_core::{DecodeError, LedgerEvent, ObservedEvent};
use tracing::warn;

use crate::contract::IArena;

fn malformed(err: alloy_sol_types::Error) -> DecodeError {
    DecodeError::MalformedLog(err.to_string())
}

fn narrow<T: TryFrom<U256>>(value: U256, field: &str) -> Result<T, DecodeError> {
    T::try_from(value)
        .map_err(|_| DecodeError::MalformedLog(format!("{field} {value} is out of range")))
}

fn warrior(value: U256) -> Result<WarriorId, DecodeError> {
    narrow(value, "warrior id").map(WarriorId)
}

/// Decodes one arena log. Logs with an unknown topic yield `Ok(None)`.
pub fn decode_log(log: &Log) -> Result<Option<LedgerEvent>, DecodeError> {
    let data = log.data();
    let event = match log.topic0() {
        Some(&IArena::RoundOver::SIGNATURE_HASH) => {
            let e = IArena::RoundOver::decode_log_data(data).map_err(malformed)?;
            LedgerEvent::RoundOver {
                round: narrow(e.round, "round")?,
                damage_a: narrow(e.damageOnWarriorsOne, "damage")?,
                damage_b: narrow(e.damageOnWarriorsTwo, "damage")?,
            }
        }
        Some(&IArena::GameStarted::SIGNATURE_HASH) => {
            let e = IArena::GameStarted::decode_log_data(data).map_err(malformed)?;
            LedgerEvent::GameStarted {
                started_at: narrow(e.startedAt, "start time")?,
            }
        }
        Some(&IArena::GameFinished::SIGNATURE_HASH) => {
            let e = IArena::GameFinished::decode_log_data(data).map_err(malformed)?;
            LedgerEvent::GameFinished {
                winner: warrior(e.winner)?,
                damage_a: narrow(e.damageOnWarriorsOne, "damage")?,
                damage_b: narrow(e.damageOnWarriorsTwo, "damage")?,
            }
        }
        Some(&IArena::WarriorsMoveExecuted::SIGNATURE_HASH) => {
            let e = IArena::WarriorsMoveExecuted::decode_log_data(data).map_err(malformed)?;
            LedgerEvent::MoveExecuted {
                executor: e.executor.to_string(),
                execution: MoveExecution {
                    mv: move_from_log(e.moveIndex)?,
                    damage_to_opponent: narrow(e.damageOnOpponent, "damage")?,
                    self_recovery: narrow(e.recovery, "recovery")?,
                    dodged: e.dodged,
                },
            }
        }
        Some(&IArena::WarriorsInfluenced::SIGNATURE_HASH) => {
            let e = IArena::WarriorsInfluenced::decode_log_data(data).map_err(malformed)?;
            LedgerEvent::Influenced {
                by: e.influencer.to_string(),
                warrior: warrior(e.warriorsNFTId)?,
            }
        }
        Some(&IArena::WarriorsDefluenced::SIGNATURE_HASH) => {
            let e = IArena::WarriorsDefluenced::decode_log_data(data).map_err(malformed)?;
            LedgerEvent::Defluenced {
                by: e.defluencer.to_string(),
                warrior: warrior(e.warriorsNFTId)?,
            }
        }
        Some(&IArena::BetPlaced::SIGNATURE_HASH) => {
            let e = IArena::BetPlaced::decode_log_data(data).map_err(malformed)?;
            LedgerEvent::BetPlaced {
                bettor: e.bettor.to_string(),
                warrior: warrior(e.warriorsNFTId)?,
                multiplier: narrow(e.multiplier, "multiplier")?,
            }
        }
        _ => return Ok(None),
    };

    Ok(Some(event))
}

/// Decodes one log, logging and dropping it when it cannot be decoded.
fn decode_or_skip(log: &Log) -> Option<LedgerEvent> {
    match decode_log(log) {
        Ok(event) => event,
        Err(err) => {
            warn!(
                address = %log.address(),
                block = ?log.block_number,
                tx = ?log.transaction_hash,
                error = %err,
                "skipping undecodable arena log"
            );
            None
        }
    }
}

/// Decodes the logs a transaction emitted from `emitter`, in order.
///
/// Logs from other contracts are ignored; `None` keeps every log.
pub fn receipt_events(logs: &[Log], emitter: Option<Address>) -> Vec<LedgerEvent> {
    logs.iter()
        .filter(|log| emitter.is_none_or(|address| log.address() == address))
        .filter_map(decode_or_skip)
        .collect()
}

/// Decodes a log range for reconciliation, tagging each event with its block.
pub fn decode_observed(logs: &[Log]) -> Vec<ObservedEvent> {
    logs.iter()
        .filter_map(|log| {
            let event = decode_or_skip(log)?;
            Some(ObservedEvent {
                block_number: log.block_number.unwrap_or_default(),
                event,
            })
        })
        .collect()
}
