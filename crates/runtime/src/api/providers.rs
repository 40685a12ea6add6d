//! Asynchronous abstraction for sourcing combatant moves.
//!
//! Runtime users plug in [`MoveProvider`] implementations so rounds can be
//! decided by a remote model, scripted fixtures, or replayed responses.
use arena_core::MoveSelection;
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::inference::{BattlePrompt, InferenceError};

/// Trait for producing a raw move response for one round.
///
/// Implementations return the response body untouched; shape decoding and
/// token normalization happen in the adapter so every provider gets the same
/// treatment.
#[async_trait]
pub trait MoveProvider: Send + Sync {
    async fn request_moves(&self, prompt: &BattlePrompt) -> Result<Value, InferenceError>;
}

/// A provider that always answers with the same response.
/// Useful for testing or as a deterministic stand-in for the model.
pub struct FixedMoveProvider {
    response: Value,
}

impl FixedMoveProvider {
    pub fn new(response: Value) -> Self {
        Self { response }
    }

    /// Answers with `selection` in the nested per-agent layout.
    pub fn moves(selection: MoveSelection) -> Self {
        Self::new(json!({
            "agent_1": { "move": selection.a.token() },
            "agent_2": { "move": selection.b.token() },
        }))
    }
}

#[async_trait]
impl MoveProvider for FixedMoveProvider {
    async fn request_moves(&self, _prompt: &BattlePrompt) -> Result<Value, InferenceError> {
        Ok(self.response.clone())
    }
}
