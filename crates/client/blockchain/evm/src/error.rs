//! Error types for EVM ledger operations.

use alloy_primitives::Bytes;
use client_blockchain_core::{TransactionError, TransportError};
use thiserror::Error;

use crate::contract;

/// JSON-RPC error code nodes use for execution reverts.
const EXECUTION_REVERTED: i64 = 3;

/// Errors that can occur while talking to an EVM node.
#[derive(Debug, Error)]
pub enum EvmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        /// Revert data attached to the error response, if any.
        data: Option<Bytes>,
    },

    #[error("ABI decode error: {0}")]
    Abi(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, EvmError>;

impl EvmError {
    /// Whether the node refused the call because execution reverted.
    pub fn is_revert(&self) -> bool {
        match self {
            EvmError::Rpc { code, message, .. } => {
                *code == EXECUTION_REVERTED || message.contains("revert")
            }
            _ => false,
        }
    }

    /// Revert reason carried in the error data, falling back to the message.
    pub fn revert_reason(&self) -> Option<String> {
        match self {
            EvmError::Rpc { message, data, .. } => data
                .as_deref()
                .and_then(|bytes| contract::decode_revert(bytes))
                .or_else(|| Some(message.clone())),
            _ => None,
        }
    }

    /// Maps a failed submission onto the write-path taxonomy.
    pub fn into_transaction_error(self) -> TransactionError {
        if self.is_revert() {
            TransactionError::Rejected {
                reason: self.revert_reason(),
            }
        } else {
            TransactionError::Transport(self.into())
        }
    }
}

impl From<alloy_transport::TransportError> for EvmError {
    fn from(err: alloy_transport::TransportError) -> Self {
        if let Some(payload) = err.as_error_resp() {
            return EvmError::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
                data: payload.as_revert_data(),
            };
        }
        if err.is_ser_error() || err.is_deser_error() {
            EvmError::Serialization(err.to_string())
        } else {
            EvmError::Network(err.to_string())
        }
    }
}

impl From<EvmError> for TransportError {
    fn from(err: EvmError) -> Self {
        match err {
            EvmError::Network(msg) => TransportError::NetworkError(msg),
            EvmError::Rpc { code, message, .. } => TransportError::Rpc { code, message },
            EvmError::Abi(msg) | EvmError::Serialization(msg) => {
                TransportError::SerializationError(msg)
            }
            EvmError::InvalidConfig(msg) => TransportError::ConfigError(msg),
        }
    }
}
