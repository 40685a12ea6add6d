//! Round outcomes decoded from ledger move-execution events.

use crate::ids::Side;
use crate::moves::Move;

/// Payload of one move-execution event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveExecution {
    pub mv: Move,
    pub damage_to_opponent: u64,
    pub self_recovery: u64,
    pub dodged: bool,
}

impl MoveExecution {
    pub fn hit_class(&self) -> HitClass {
        HitClass::classify(self.damage_to_opponent, self.self_recovery, self.dodged)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitClass {
    #[strum(to_string = "HIT")]
    Hit,
    #[strum(to_string = "MISS")]
    Miss,
}

impl HitClass {
    /// HIT when the move did anything observable, MISS otherwise.
    pub const fn classify(damage_to_opponent: u64, self_recovery: u64, dodged: bool) -> Self {
        if damage_to_opponent > 0 || self_recovery > 0 || dodged {
            HitClass::Hit
        } else {
            HitClass::Miss
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideOutcome {
    pub execution: MoveExecution,
    pub hit: HitClass,
}

impl From<MoveExecution> for SideOutcome {
    fn from(execution: MoveExecution) -> Self {
        Self {
            hit: execution.hit_class(),
            execution,
        }
    }
}

/// Outcome of one settled round, combatant A first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundOutcome {
    pub a: SideOutcome,
    pub b: SideOutcome,
}

impl RoundOutcome {
    pub fn from_executions(a: MoveExecution, b: MoveExecution) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub const fn side(&self, side: Side) -> &SideOutcome {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_table_collapses_to_two_classes() {
        for damage in [0u64, 12] {
            for recovery in [0u64, 7] {
                for dodged in [false, true] {
                    let expected = if damage == 0 && recovery == 0 && !dodged {
                        HitClass::Miss
                    } else {
                        HitClass::Hit
                    };
                    assert_eq!(
                        HitClass::classify(damage, recovery, dodged),
                        expected,
                        "damage={damage} recovery={recovery} dodged={dodged}"
                    );
                }
            }
        }
    }

    #[test]
    fn round_outcome_keeps_submission_order() {
        let a = MoveExecution {
            mv: Move::Taunt,
            damage_to_opponent: 0,
            self_recovery: 0,
            dodged: false,
        };
        let b = MoveExecution {
            mv: Move::Dodge,
            damage_to_opponent: 0,
            self_recovery: 0,
            dodged: true,
        };
        let outcome = RoundOutcome::from_executions(a, b);
        assert_eq!(outcome.side(Side::A).hit, HitClass::Miss);
        assert_eq!(outcome.side(Side::B).hit, HitClass::Hit);
        assert_eq!(outcome.side(Side::B).execution.mv, Move::Dodge);
    }
}
