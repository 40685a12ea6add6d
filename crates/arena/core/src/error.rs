//! Data errors: inputs that cannot be turned into a valid round.
//!
//! A [`DataError`] aborts the current round only. The scheduler re-evaluates
//! the arena on its next tick, so nothing here is retried in place.

use crate::ids::WarriorId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct DataError {
    pub kind: DataErrorKind,
}

impl DataError {
    pub const fn new(kind: DataErrorKind) -> Self {
        Self { kind }
    }

    pub fn unrecognized_shape(raw: impl Into<String>) -> Self {
        Self::new(DataErrorKind::UnrecognizedShape { raw: raw.into() })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataErrorKind {
    #[error("inference response matched no known shape: {raw}")]
    UnrecognizedShape { raw: String },

    #[error("trait `{name}` of warrior {warrior} is {value}, above the ledger bound")]
    TraitOutOfRange {
        warrior: WarriorId,
        name: &'static str,
        value: u16,
    },

    #[error("arena has no combatants paired")]
    MissingPairing,

    #[error("signature is {len} bytes, expected 65")]
    MalformedSignature { len: usize },
}
