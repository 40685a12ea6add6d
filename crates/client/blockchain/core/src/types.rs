//! Common types for ledger interactions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::LedgerEvent;

/// Handle of a submitted transaction (its hash, `0x`-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle(pub String);

impl TxHandle {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finalized transaction with its decoded events, in log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx: TxHandle,
    pub block_number: u64,
    pub events: Vec<LedgerEvent>,
}

/// Transaction status on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// Known to the node but not yet included
    Pending,

    /// Included and executed successfully
    Confirmed(Receipt),

    /// Included but reverted
    Reverted { reason: Option<String> },

    /// The node has no record of the transaction (dropped or never sent)
    Unknown,
}

/// Ledger-specific configuration.
///
/// This is a trait to allow different ledgers to provide their own config types.
pub trait BlockchainConfig: Send + Sync {
    /// Human-readable network name (e.g., "evm-local", "flow-testnet")
    fn network_name(&self) -> &str;

    /// RPC endpoint URL
    fn rpc_url(&self) -> &str;

    /// Validate configuration (e.g., check addresses, endpoint format)
    fn validate(&self) -> Result<(), String>;
}
