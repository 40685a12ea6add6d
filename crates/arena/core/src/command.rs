//! Automation commands exchanged between the scheduler, operators and the
//! orchestrator.

use crate::ids::{ArenaId, WarriorId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum ArenaAction {
    Initialize,
    StartGame,
    NextRound,
    Cleanup,
}

/// Who produced a command. Both origins run the exact same transition code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum Origin {
    Automated,
    Manual,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaCommand {
    pub arena: ArenaId,
    pub action: ArenaAction,
    pub origin: Origin,
    /// Round the command targets (`NextRound` only).
    pub round: Option<u8>,
    /// Combatant pairing (`Initialize` only).
    pub warriors_a: Option<WarriorId>,
    pub warriors_b: Option<WarriorId>,
}

impl ArenaCommand {
    fn bare(arena: ArenaId, action: ArenaAction, origin: Origin) -> Self {
        Self {
            arena,
            action,
            origin,
            round: None,
            warriors_a: None,
            warriors_b: None,
        }
    }

    pub fn initialize(arena: ArenaId, a: WarriorId, b: WarriorId, origin: Origin) -> Self {
        Self {
            warriors_a: Some(a),
            warriors_b: Some(b),
            ..Self::bare(arena, ArenaAction::Initialize, origin)
        }
    }

    pub fn start_game(arena: ArenaId, origin: Origin) -> Self {
        Self::bare(arena, ArenaAction::StartGame, origin)
    }

    pub fn next_round(arena: ArenaId, round: u8, origin: Origin) -> Self {
        Self {
            round: Some(round),
            ..Self::bare(arena, ArenaAction::NextRound, origin)
        }
    }

    pub fn cleanup(arena: ArenaId, origin: Origin) -> Self {
        Self::bare(arena, ArenaAction::Cleanup, origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_use_wire_spelling() {
        assert_eq!(ArenaAction::StartGame.to_string(), "startGame");
        assert_eq!("nextRound".parse::<ArenaAction>(), Ok(ArenaAction::NextRound));
    }

    #[test]
    fn constructors_fill_only_relevant_payload() {
        let arena = ArenaId::new("0xa1").unwrap();
        let cmd = ArenaCommand::next_round(arena.clone(), 3, Origin::Automated);
        assert_eq!(cmd.round, Some(3));
        assert_eq!(cmd.warriors_a, None);

        let cmd = ArenaCommand::initialize(arena, WarriorId(4), WarriorId(9), Origin::Manual);
        assert_eq!(cmd.action, ArenaAction::Initialize);
        assert_eq!(cmd.round, None);
        assert_eq!(cmd.warriors_b, Some(WarriorId(9)));
    }
}
