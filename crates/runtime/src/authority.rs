//! Game-master move authorization.
//!
//! The ledger accepts a `battle` call only with a signature by the configured
//! authority over `keccak256(abi.encodePacked(uint8 a, uint8 b))`, wrapped as
//! an EIP-191 personal message. [`MoveAuthorizer`] produces those signatures
//! and recovers signers for verification.

use alloy_primitives::{Address, B256, keccak256};
use arena_core::{MoveSelection, SignedMove};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use thiserror::Error;

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";
const SIGNATURE_LEN: usize = 65;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("malformed authority key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("signature is {len} bytes, expected 65")]
    MalformedSignature { len: usize },

    #[error("signature recovery failed: {0}")]
    Recovery(String),
}

/// `abi.encodePacked(uint8 a, uint8 b)`.
pub fn encode_selection(selection: MoveSelection) -> [u8; 2] {
    [selection.a.as_u8(), selection.b.as_u8()]
}

/// The digest the ledger recovers against: the EIP-191 wrap of the packed
/// move hash.
pub fn selection_digest(selection: MoveSelection) -> B256 {
    let message_hash = keccak256(encode_selection(selection));
    let mut prefixed = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 32);
    prefixed.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    prefixed.extend_from_slice(message_hash.as_slice());
    keccak256(prefixed)
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Holds the authority key. Stateless apart from the key, which is never
/// mutated, so one instance is shared by every arena.
pub struct MoveAuthorizer {
    key: SigningKey,
    address: Address,
}

impl MoveAuthorizer {
    /// Parses a 32-byte secp256k1 secret, `0x` prefix optional.
    pub fn from_hex(secret: &str) -> Result<Self, AuthorizationError> {
        let trimmed = secret.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes =
            hex::decode(digits).map_err(|e| AuthorizationError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(AuthorizationError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| AuthorizationError::InvalidKey(e.to_string()))?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Address the ledger expects to recover.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs the selection, returning `r ‖ s ‖ v` with `v ∈ {27, 28}`.
    pub fn authorize(&self, selection: MoveSelection) -> Result<SignedMove, AuthorizationError> {
        let digest = selection_digest(selection);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|e| AuthorizationError::Signing(e.to_string()))?;

        let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
        bytes.extend_from_slice(&signature.to_bytes());
        bytes.push(27 + recovery_id.to_byte());
        Ok(SignedMove::new(selection, bytes))
    }

    /// Recovers the signer of `signature` over `selection`, as the ledger does.
    pub fn recover(
        selection: MoveSelection,
        signature: &[u8],
    ) -> Result<Address, AuthorizationError> {
        if signature.len() != SIGNATURE_LEN {
            return Err(AuthorizationError::MalformedSignature {
                len: signature.len(),
            });
        }
        let parsed = Signature::from_slice(&signature[..64])
            .map_err(|e| AuthorizationError::Recovery(e.to_string()))?;
        let v = signature[64];
        let recovery_id = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })
            .ok_or_else(|| AuthorizationError::Recovery(format!("invalid recovery byte {v}")))?;

        let digest = selection_digest(selection);
        let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &parsed, recovery_id)
            .map_err(|e| AuthorizationError::Recovery(e.to_string()))?;
        Ok(address_of(&key))
    }

    /// Whether `signature` over `selection` was produced by this authority.
    pub fn verify(&self, selection: MoveSelection, signature: &[u8]) -> bool {
        Self::recover(selection, signature).is_ok_and(|signer| signer == self.address)
    }

    /// Authorizes `selection`, accepting `candidate` instead of signing only
    /// when it verifies against this authority.
    pub fn endorse(
        &self,
        selection: MoveSelection,
        candidate: Option<&[u8]>,
    ) -> Result<SignedMove, AuthorizationError> {
        if let Some(signature) = candidate {
            if self.verify(selection, signature) {
                return Ok(SignedMove::new(selection, signature.to_vec()));
            }
            tracing::warn!(
                authority = %self.address,
                "supplied signature does not recover to the authority, signing locally"
            );
        }
        self.authorize(selection)
    }
}

impl std::fmt::Debug for MoveAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveAuthorizer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
