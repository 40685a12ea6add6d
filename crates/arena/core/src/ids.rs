//! Identifiers for arenas, warriors and combatant sides.

use core::fmt;
use core::str::FromStr;

/// Opaque identifier of one battle instance (the arena contract address).
///
/// Stored normalized: lowercase, `0x`-prefixed hex. Two spellings of the same
/// address compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ArenaId(String);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid arena id `{0}`: expected 0x-prefixed hex")]
pub struct InvalidArenaId(pub String);

impl ArenaId {
    pub fn new(raw: &str) -> Result<Self, InvalidArenaId> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| InvalidArenaId(raw.to_string()))?;

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidArenaId(raw.to_string()));
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArenaId {
    type Err = InvalidArenaId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArenaId {
    type Error = InvalidArenaId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ArenaId> for String {
    fn from(id: ArenaId) -> Self {
        id.0
    }
}

/// On-chain token id of a combatant. `0` is never minted and means "unset".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarriorId(pub u64);

impl WarriorId {
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WarriorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of the two combatants an item refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    #[strum(to_string = "A")]
    A,
    #[strum(to_string = "B")]
    B,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_id_normalizes_case_and_prefix() {
        let a = ArenaId::new("0xA1").unwrap();
        let b: ArenaId = "0Xa1".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xa1");
    }

    #[test]
    fn arena_id_rejects_non_hex() {
        assert!(ArenaId::new("a1").is_err());
        assert!(ArenaId::new("0x").is_err());
        assert!(ArenaId::new("0xzz").is_err());
    }

    #[test]
    fn opponent_flips_side() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
    }
}
