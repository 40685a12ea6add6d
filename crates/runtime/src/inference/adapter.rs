//! Turns combatant state into a decoded move pair.

use std::sync::Arc;
use std::time::Duration;

use arena_core::{Combatant, Move};
use strum::IntoEnumIterator;

use super::metadata::WarriorProfile;
use super::names::MoveNameCache;
use super::prompt::{AgentBrief, BattlePrompt};
use super::shapes::{DecodedMoves, decode_response};
use crate::api::{MoveProvider, Result, RuntimeError, Stage};

/// Builds the prompt, calls the provider under the inference timeout and
/// decodes whatever shape comes back.
pub struct MoveAdapter {
    provider: Arc<dyn MoveProvider>,
    names: Arc<MoveNameCache>,
    timeout: Duration,
}

impl MoveAdapter {
    pub fn new(
        provider: Arc<dyn MoveProvider>,
        names: Arc<MoveNameCache>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            names,
            timeout,
        }
    }

    pub async fn prompt(
        &self,
        round: u8,
        max_rounds: u8,
        a: &Combatant,
        b: &Combatant,
    ) -> Result<BattlePrompt> {
        let agent_1 = brief(a, &*self.names.profile(a.id).await)?;
        let agent_2 = brief(b, &*self.names.profile(b.id).await)?;
        Ok(BattlePrompt::new(round, max_rounds, agent_1, agent_2))
    }

    pub async fn select_moves(
        &self,
        round: u8,
        max_rounds: u8,
        a: &Combatant,
        b: &Combatant,
    ) -> Result<DecodedMoves> {
        let profile_a = self.names.profile(a.id).await;
        let profile_b = self.names.profile(b.id).await;
        let prompt = BattlePrompt::new(
            round,
            max_rounds,
            brief(a, &profile_a)?,
            brief(b, &profile_b)?,
        );

        let raw = tokio::time::timeout(self.timeout, self.provider.request_moves(&prompt))
            .await
            .map_err(|_| RuntimeError::Timeout {
                stage: Stage::Inference,
            })??;

        let decoded = decode_response(&raw, &profile_a, &profile_b)?;
        tracing::debug!(
            round,
            shape = %decoded.shape,
            a = %decoded.selection.a,
            b = %decoded.selection.b,
            "moves selected"
        );
        Ok(decoded)
    }
}

fn brief(combatant: &Combatant, profile: &WarriorProfile) -> Result<AgentBrief> {
    let move_names = Move::iter()
        .map(|mv| profile.move_name(mv).unwrap_or(mv.token()).to_string())
        .collect();
    Ok(AgentBrief::new(
        combatant,
        profile.personality.as_deref(),
        move_names,
    )?)
}
