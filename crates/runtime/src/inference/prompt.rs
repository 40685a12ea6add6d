//! Request payload sent to the inference service.

use arena_core::{Combatant, DataError, Move, ScaledTraits, WarriorId};
use serde::{Deserialize, Serialize};

const DEFAULT_PERSONALITY: &str = "balanced";

/// One combatant as the model sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentBrief {
    pub warrior_id: WarriorId,
    pub personality: String,
    /// Traits rescaled to `0.0..=100.0`.
    pub traits: ScaledTraits,
    pub damage: u64,
    /// Display names for the vocabulary, same order as [`BattlePrompt::moves`].
    pub move_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattlePrompt {
    pub round: u8,
    pub max_rounds: u8,
    pub agent_1: AgentBrief,
    pub agent_2: AgentBrief,
    /// Canonical move tokens in ledger order.
    pub moves: Vec<&'static str>,
}

impl AgentBrief {
    /// Builds a brief, rejecting traits outside the ledger range.
    pub fn new(
        combatant: &Combatant,
        personality: Option<&str>,
        move_names: Vec<String>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            warrior_id: combatant.id,
            personality: personality.unwrap_or(DEFAULT_PERSONALITY).to_string(),
            traits: combatant.traits.rescaled(combatant.id)?,
            damage: combatant.damage,
            move_names,
        })
    }
}

impl BattlePrompt {
    pub fn new(round: u8, max_rounds: u8, agent_1: AgentBrief, agent_2: AgentBrief) -> Self {
        Self {
            round,
            max_rounds,
            agent_1,
            agent_2,
            moves: Move::vocabulary(),
        }
    }
}
