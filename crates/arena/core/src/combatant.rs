//! Combatant trait snapshots and accumulated damage.

use crate::error::{DataError, DataErrorKind};
use crate::ids::WarriorId;

/// Upper bound of every trait value as stored on the ledger.
pub const TRAIT_MAX: u16 = 10_000;

/// Divisor that maps ledger trait values onto the inference scale (0–100).
const INFERENCE_SCALE: f64 = 100.0;

/// Static trait snapshot of a warrior, in ledger units (`0..=TRAIT_MAX`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Traits {
    pub strength: u16,
    pub wit: u16,
    pub charisma: u16,
    pub defence: u16,
    pub luck: u16,
}

/// Trait values rescaled to the range the inference service expects.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaledTraits {
    pub strength: f64,
    pub wit: f64,
    pub charisma: f64,
    pub defence: f64,
    pub luck: f64,
}

impl Traits {
    fn named(&self) -> [(&'static str, u16); 5] {
        [
            ("strength", self.strength),
            ("wit", self.wit),
            ("charisma", self.charisma),
            ("defence", self.defence),
            ("luck", self.luck),
        ]
    }

    /// Rejects snapshots with any value above [`TRAIT_MAX`].
    pub fn validate(&self, warrior: WarriorId) -> Result<(), DataError> {
        match self.named().into_iter().find(|(_, value)| *value > TRAIT_MAX) {
            Some((name, value)) => Err(DataError::new(DataErrorKind::TraitOutOfRange {
                warrior,
                name,
                value,
            })),
            None => Ok(()),
        }
    }

    /// Validates and rescales to two-decimal values in `0.0..=100.0`.
    pub fn rescaled(&self, warrior: WarriorId) -> Result<ScaledTraits, DataError> {
        self.validate(warrior)?;
        let scale = |v: u16| f64::from(v) / INFERENCE_SCALE;
        Ok(ScaledTraits {
            strength: scale(self.strength),
            wit: scale(self.wit),
            charisma: scale(self.charisma),
            defence: scale(self.defence),
            luck: scale(self.luck),
        })
    }
}

/// A warrior as seen in one arena: identity, traits and ledger-owned damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: WarriorId,
    pub traits: Traits,
    pub damage: u64,
}

impl Combatant {
    pub const fn new(id: WarriorId, traits: Traits, damage: u64) -> Self {
        Self { id, traits, damage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traits(strength: u16) -> Traits {
        Traits {
            strength,
            wit: 5_000,
            charisma: 2_550,
            defence: 0,
            luck: TRAIT_MAX,
        }
    }

    #[test]
    fn rescales_into_inference_range() {
        let scaled = traits(7_525).rescaled(WarriorId(1)).unwrap();
        assert_eq!(scaled.strength, 75.25);
        assert_eq!(scaled.wit, 50.0);
        assert_eq!(scaled.charisma, 25.5);
        assert_eq!(scaled.defence, 0.0);
        assert_eq!(scaled.luck, 100.0);
    }

    #[test]
    fn out_of_range_trait_is_a_data_error() {
        let err = traits(TRAIT_MAX + 1).rescaled(WarriorId(7)).unwrap_err();
        assert_eq!(
            err.kind,
            DataErrorKind::TraitOutOfRange {
                warrior: WarriorId(7),
                name: "strength",
                value: TRAIT_MAX + 1,
            }
        );
    }
}
