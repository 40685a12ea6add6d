//! Move vocabulary and the per-round move pair.
//!
//! The discriminants match the ledger's move enum exactly; they are the bytes
//! that get signed and submitted, so the order must never change.

use strum::IntoEnumIterator;

use crate::ids::Side;

/// One of the five actions a combatant can perform in a round.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr, strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Move {
    Strike = 0,
    Taunt = 1,
    Dodge = 2,
    #[strum(serialize = "special_move")]
    Special = 3,
    Recover = 4,
}

impl Move {
    /// First vocabulary entry, used when an inference token is unrecognized.
    pub const FALLBACK: Move = Move::Strike;

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Move::Strike),
            1 => Some(Move::Taunt),
            2 => Some(Move::Dodge),
            3 => Some(Move::Special),
            4 => Some(Move::Recover),
            _ => None,
        }
    }

    /// Canonical token sent to (and expected back from) the inference service.
    pub fn token(self) -> &'static str {
        self.into()
    }

    /// All canonical tokens in ledger order.
    pub fn vocabulary() -> Vec<&'static str> {
        Move::iter().map(Move::token).collect()
    }

    /// Parses a free-form move token, collapsing known synonyms.
    ///
    /// Case, surrounding whitespace and `-`/`_`/space separators are ignored,
    /// so `"Special Move"`, `"special-move"` and `"SPECIAL_MOVE"` all map to
    /// [`Move::Special`].
    pub fn parse_token(raw: &str) -> Option<Self> {
        let squashed: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' ' | '.'))
            .flat_map(char::to_lowercase)
            .collect();

        match squashed.as_str() {
            "strike" | "attack" | "hit" | "punch" => Some(Move::Strike),
            "taunt" | "provoke" | "mock" => Some(Move::Taunt),
            "dodge" | "evade" | "block" => Some(Move::Dodge),
            "special" | "specialmove" | "specialattack" | "ultimate" => Some(Move::Special),
            "recover" | "recovery" | "heal" | "rest" => Some(Move::Recover),
            _ => None,
        }
    }

    /// Like [`Move::parse_token`] but never fails: unknown tokens become
    /// [`Move::FALLBACK`]. Returns whether the fallback was applied.
    pub fn parse_or_fallback(raw: &str) -> (Self, bool) {
        match Self::parse_token(raw) {
            Some(mv) => (mv, false),
            None => (Self::FALLBACK, true),
        }
    }
}

/// The pair of moves for one round, combatant A first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveSelection {
    pub a: Move,
    pub b: Move,
}

impl MoveSelection {
    pub const fn new(a: Move, b: Move) -> Self {
        Self { a, b }
    }

    pub const fn get(&self, side: Side) -> Move {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    /// Re-runs token normalization over an already typed selection.
    ///
    /// Typed moves are canonical by construction, so this is the identity;
    /// it exists so callers can push any selection through the same path
    /// the inference decoder uses.
    pub fn normalized(self) -> Self {
        let a = Move::parse_token(self.a.token()).unwrap_or(Move::FALLBACK);
        let b = Move::parse_token(self.b.token()).unwrap_or(Move::FALLBACK);
        Self { a, b }
    }
}

/// A move pair together with the authority signature over its encoding.
///
/// Valid for exactly one `battle` call: the ledger's round counter advances
/// after settlement, so replaying it has no further effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignedMove {
    pub selection: MoveSelection,
    pub signature: Vec<u8>,
}

impl SignedMove {
    pub fn new(selection: MoveSelection, signature: Vec<u8>) -> Self {
        Self {
            selection,
            signature,
        }
    }
}
