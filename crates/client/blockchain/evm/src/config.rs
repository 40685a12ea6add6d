//! EVM ledger configuration.

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use client_blockchain_core::BlockchainConfig;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
const DEFAULT_GAS_LIMIT: u64 = 3_000_000;
const DEFAULT_RECEIPT_POLL_MS: u64 = 1_000;

/// EVM-specific configuration.
#[derive(Debug, Clone)]
pub struct EvmConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,

    /// Expected chain id; checked against the node when set
    pub chain_id: Option<u64>,

    /// Node-managed account that sends every write
    pub sender: Address,

    /// Warriors (NFT) contract holding combatant traits
    pub warriors_contract: Address,

    /// Gas limit attached to writes
    pub gas_limit: u64,

    /// Interval between receipt polls while waiting for confirmation
    pub receipt_poll: Duration,
}

impl EvmConfig {
    pub fn new(sender: Address, warriors_contract: Address) -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            sender,
            warriors_contract,
            gas_limit: DEFAULT_GAS_LIMIT,
            receipt_poll: Duration::from_millis(DEFAULT_RECEIPT_POLL_MS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_RPC_URL` - JSON-RPC endpoint (default: http://127.0.0.1:8545)
    /// - `ARENA_CHAIN_ID` - Expected chain id
    /// - `ARENA_SENDER` - Sending account (required)
    /// - `ARENA_WARRIORS_CONTRACT` - Warriors contract address (required)
    /// - `ARENA_GAS_LIMIT` - Gas limit per write (default: 3000000)
    /// - `ARENA_RECEIPT_POLL_MS` - Receipt poll interval (default: 1000)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EvmConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let address = |key: &str| -> Result<Address, String> {
            let raw = lookup(key).ok_or_else(|| format!("{key} is required"))?;
            Address::from_str(raw.trim()).map_err(|e| format!("Invalid {key}: {e}"))
        };
        let number = |key: &str| -> Result<Option<u64>, String> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|e| format!("Invalid {key}: {e}"))
                })
                .transpose()
        };

        let mut config = Self::new(address("ARENA_SENDER")?, address("ARENA_WARRIORS_CONTRACT")?);
        if let Some(url) = lookup("ARENA_RPC_URL") {
            config.rpc_url = url;
        }
        config.chain_id = number("ARENA_CHAIN_ID")?;
        if let Some(gas) = number("ARENA_GAS_LIMIT")? {
            config.gas_limit = gas;
        }
        if let Some(ms) = number("ARENA_RECEIPT_POLL_MS")? {
            config.receipt_poll = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

impl BlockchainConfig for EvmConfig {
    fn network_name(&self) -> &str {
        match self.chain_id {
            Some(1) => "evm-mainnet",
            Some(31337) | Some(1337) => "evm-local",
            Some(_) => "evm-custom",
            None => "evm",
        }
    }

    fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn validate(&self) -> Result<(), String> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(format!("Invalid RPC URL format: {}", self.rpc_url));
        }
        if self.gas_limit == 0 {
            return Err("Gas limit must be greater than 0".to_string());
        }
        if self.sender.is_zero() {
            return Err("Sender cannot be the zero address".to_string());
        }
        if self.warriors_contract.is_zero() {
            return Err("Warriors contract cannot be the zero address".to_string());
        }
        if self.receipt_poll.is_zero() {
            return Err("Receipt poll interval must be greater than 0".to_string());
        }
        Ok(())
    }
}
