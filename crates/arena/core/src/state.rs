//! Arena lifecycle, battle phases and the reconciled [`ArenaView`].
//!
//! Everything here is derived from a [`LedgerSnapshot`]. The orchestrator's
//! own bookkeeping (pending commands, in-flight transactions) never feeds into
//! these types, so a view can always be rebuilt from the ledger alone.

use crate::ids::{Side, WarriorId};
use crate::timer::PhaseTimer;

/// Lifecycle of an arena as reported by the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ArenaState {
    #[default]
    Empty,
    Initialized,
    BattleOngoing,
    Finished,
}

/// Timed phase within the arena lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BattlePhase {
    #[default]
    Betting,
    RoundInterval,
    Calculating,
    Finished,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Damages {
    pub a: u64,
    pub b: u64,
}

impl Damages {
    pub const fn get(&self, side: Side) -> u64 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pairing {
    pub a: WarriorId,
    pub b: WarriorId,
}

impl Pairing {
    pub const fn get(&self, side: Side) -> WarriorId {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BettingTotals {
    /// Stake per bet unit, in token base units.
    pub bet_amount: u128,
    pub bettors_a: Vec<String>,
    pub bettors_b: Vec<String>,
}

impl BettingTotals {
    pub fn total(&self, side: Side) -> u128 {
        let count = match side {
            Side::A => self.bettors_a.len(),
            Side::B => self.bettors_b.len(),
        };
        self.bet_amount.saturating_mul(count as u128)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfluenceCosts {
    pub influence_a: u128,
    pub influence_b: u128,
    pub defluence_a: u128,
    pub defluence_b: u128,
}

/// Result of one full read sweep against the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerSnapshot {
    /// Latest block timestamp, used as "now" for every phase computation.
    pub now: u64,
    pub initialized: bool,
    pub battle_ongoing: bool,
    pub finished: bool,
    pub current_round: u8,
    pub initialized_at: u64,
    pub last_round_ended_at: u64,
    pub min_betting_period: u64,
    pub min_round_interval: u64,
    pub damages: Damages,
    pub pairing: Option<Pairing>,
    pub betting: BettingTotals,
    pub costs: InfluenceCosts,
}

impl LedgerSnapshot {
    pub fn state(&self) -> ArenaState {
        if self.finished {
            ArenaState::Finished
        } else if self.battle_ongoing {
            ArenaState::BattleOngoing
        } else if self.initialized {
            ArenaState::Initialized
        } else {
            ArenaState::Empty
        }
    }

    /// Seconds left in the betting window (0 once it has elapsed).
    pub fn betting_remaining(&self) -> u64 {
        PhaseTimer::remaining(self.now, self.initialized_at, self.min_betting_period)
    }

    /// Seconds left before the next round may be fought.
    pub fn interval_remaining(&self) -> u64 {
        PhaseTimer::remaining(self.now, self.last_round_ended_at, self.min_round_interval)
    }

    /// Betting window elapsed on an initialized arena that has not started.
    pub fn start_due(&self) -> bool {
        self.state() == ArenaState::Initialized
            && self.current_round == 0
            && self.betting_remaining() == 0
    }

    /// Inter-round window elapsed on an ongoing battle.
    pub fn round_due(&self) -> bool {
        self.state() == ArenaState::BattleOngoing && self.interval_remaining() == 0
    }

    pub fn phase(&self) -> BattlePhase {
        match self.state() {
            ArenaState::Finished => BattlePhase::Finished,
            ArenaState::Empty | ArenaState::Initialized => BattlePhase::Betting,
            ArenaState::BattleOngoing if self.interval_remaining() > 0 => {
                BattlePhase::RoundInterval
            }
            ArenaState::BattleOngoing => BattlePhase::Calculating,
        }
    }

    /// Countdown shown for the current phase.
    pub fn phase_remaining(&self) -> u64 {
        match self.phase() {
            BattlePhase::Betting if self.initialized => self.betting_remaining(),
            BattlePhase::RoundInterval => self.interval_remaining(),
            _ => 0,
        }
    }
}

/// Reconciled, externally observable projection of one arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaView {
    pub state: ArenaState,
    pub phase: BattlePhase,
    pub round: u8,
    pub max_rounds: u8,
    pub phase_remaining: u64,
    pub damages: Damages,
    pub pairing: Option<Pairing>,
    pub betting: BettingTotals,
    pub costs: InfluenceCosts,
    /// Side with less accumulated damage once the battle is finished.
    pub winner: Option<Side>,
    /// Block timestamp the view was derived at.
    pub observed_at: u64,
}

impl ArenaView {
    pub fn derive(snapshot: &LedgerSnapshot, max_rounds: u8) -> Self {
        let state = snapshot.state();
        let winner = match state {
            ArenaState::Finished => Self::leader(&snapshot.damages),
            _ => None,
        };

        Self {
            state,
            phase: snapshot.phase(),
            round: snapshot.current_round,
            max_rounds,
            phase_remaining: snapshot.phase_remaining(),
            damages: snapshot.damages,
            pairing: snapshot.pairing,
            betting: snapshot.betting.clone(),
            costs: snapshot.costs,
            winner,
            observed_at: snapshot.now,
        }
    }

    fn leader(damages: &Damages) -> Option<Side> {
        match damages.a.cmp(&damages.b) {
            core::cmp::Ordering::Less => Some(Side::A),
            core::cmp::Ordering::Greater => Some(Side::B),
            core::cmp::Ordering::Equal => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == ArenaState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized_at_zero(now: u64) -> LedgerSnapshot {
        LedgerSnapshot {
            now,
            initialized: true,
            initialized_at: 0,
            min_betting_period: 60,
            min_round_interval: 30,
            pairing: Some(Pairing {
                a: WarriorId(1),
                b: WarriorId(2),
            }),
            ..LedgerSnapshot::default()
        }
    }

    #[test]
    fn default_snapshot_is_empty_betting() {
        let snapshot = LedgerSnapshot::default();
        assert_eq!(snapshot.state(), ArenaState::Empty);
        assert_eq!(snapshot.phase(), BattlePhase::Betting);
        assert!(!snapshot.start_due());
    }

    #[test]
    fn betting_window_expires_at_configured_duration() {
        let before = initialized_at_zero(59);
        assert_eq!(before.phase(), BattlePhase::Betting);
        assert_eq!(before.phase_remaining(), 1);
        assert!(!before.start_due());

        let after = initialized_at_zero(61);
        assert_eq!(after.phase(), BattlePhase::Betting);
        assert!(after.start_due());
    }

    #[test]
    fn ongoing_battle_alternates_interval_and_calculating() {
        let mut snapshot = initialized_at_zero(100);
        snapshot.battle_ongoing = true;
        snapshot.current_round = 2;
        snapshot.last_round_ended_at = 90;

        assert_eq!(snapshot.state(), ArenaState::BattleOngoing);
        assert_eq!(snapshot.phase(), BattlePhase::RoundInterval);
        assert_eq!(snapshot.phase_remaining(), 20);
        assert!(!snapshot.round_due());

        snapshot.now = 120;
        assert_eq!(snapshot.phase(), BattlePhase::Calculating);
        assert!(snapshot.round_due());
        assert!(!snapshot.start_due());
    }

    #[test]
    fn finished_view_names_the_less_damaged_side() {
        let mut snapshot = initialized_at_zero(500);
        snapshot.finished = true;
        snapshot.current_round = 6;
        snapshot.damages = Damages { a: 40, b: 75 };

        let view = ArenaView::derive(&snapshot, 5);
        assert_eq!(view.state, ArenaState::Finished);
        assert_eq!(view.phase, BattlePhase::Finished);
        assert_eq!(view.winner, Some(Side::A));
        assert!(view.is_finished());
        assert!(!snapshot.round_due());
    }

    #[test]
    fn view_is_a_pure_function_of_the_snapshot() {
        let snapshot = initialized_at_zero(10);
        assert_eq!(ArenaView::derive(&snapshot, 5), ArenaView::derive(&snapshot, 5));
    }

    #[test]
    fn betting_totals_multiply_stake_by_bettors() {
        let totals = BettingTotals {
            bet_amount: 5,
            bettors_a: vec!["0x1".into(), "0x2".into()],
            bettors_b: vec![],
        };
        assert_eq!(totals.total(Side::A), 10);
        assert_eq!(totals.total(Side::B), 0);
    }
}
