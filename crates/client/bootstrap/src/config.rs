//! Operator configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use arena_core::ArenaId;
use client_blockchain_evm::EvmConfig;
use runtime::RuntimeConfig;

/// Everything needed to assemble a runtime against a live ledger.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    pub ledger: EvmConfig,
    pub runtime: RuntimeConfig,
    /// Hex secp256k1 secret of the game master.
    pub authority_key: String,
    /// Arenas driven by `run` when none are given on the command line.
    pub arenas: Vec<ArenaId>,
    pub inference_url: Option<String>,
    pub inference_api_key: Option<String>,
    pub metadata_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl ArenaConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_RPC_URL`, `ARENA_CHAIN_ID`, `ARENA_SENDER`,
    ///   `ARENA_WARRIORS_CONTRACT`, `ARENA_GAS_LIMIT`, `ARENA_RECEIPT_POLL_MS` -
    ///   ledger connection (see [`EvmConfig::from_env`])
    /// - `GAME_MASTER_PRIVATE_KEY` - Move authority secret (required)
    /// - `ARENA_ADDRESSES` - Comma-separated arenas to watch (default: none)
    /// - `INFERENCE_URL` - Move inference endpoint (required for rounds)
    /// - `INFERENCE_API_KEY` - Bearer token for the inference endpoint
    /// - `SCHEDULER_INTERVAL_MS` - Scheduler tick (default: 2000)
    /// - `RECONCILE_INTERVAL_MS` - Full read sweep period (default: 5000)
    /// - `INFERENCE_TIMEOUT_SECS` - Inference wait (default: 60)
    /// - `CONFIRMATION_TIMEOUT_SECS` - Confirmation wait (default: 60)
    /// - `ROUND_TIMEOUT_SECS` - Whole-round budget (default: 180)
    /// - `MAX_ROUNDS` - Rounds per battle (default: 5)
    /// - `EVENT_BUFFER_SIZE` - Event bus capacity per topic (default: 100)
    /// - `TRUST_INFERENCE_SIGNATURES` - Accept verified pass-through signatures (default: false)
    /// - `WARRIOR_METADATA_PATH` - JSON file with warrior names and move names
    /// - `LOG_DIR` - Log directory override
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ArenaConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ledger = EvmConfig::from_lookup(&lookup).map_err(|e| anyhow!(e))?;

        let authority_key = lookup("GAME_MASTER_PRIVATE_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("GAME_MASTER_PRIVATE_KEY is required")?;

        let arenas = match lookup("ARENA_ADDRESSES") {
            Some(raw) => parse_arenas(&raw)?,
            None => Vec::new(),
        };

        let mut runtime = RuntimeConfig::default();
        if let Some(ms) = read::<u64>(&lookup, "SCHEDULER_INTERVAL_MS")? {
            runtime.scheduler_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read::<u64>(&lookup, "RECONCILE_INTERVAL_MS")? {
            runtime.reconcile_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(secs) = read::<u64>(&lookup, "INFERENCE_TIMEOUT_SECS")? {
            runtime.inference_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read::<u64>(&lookup, "CONFIRMATION_TIMEOUT_SECS")? {
            runtime.confirmation_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read::<u64>(&lookup, "ROUND_TIMEOUT_SECS")? {
            runtime.round_timeout = Duration::from_secs(secs);
        }
        if let Some(rounds) = read::<u8>(&lookup, "MAX_ROUNDS")? {
            runtime.max_rounds = rounds;
        }
        if let Some(capacity) = read::<usize>(&lookup, "EVENT_BUFFER_SIZE")? {
            runtime.event_buffer_size = capacity.max(1);
        }
        if let Some(trust) = read::<bool>(&lookup, "TRUST_INFERENCE_SIGNATURES")? {
            runtime.trust_inference_signatures = trust;
        }

        Ok(Self {
            ledger,
            runtime,
            authority_key,
            arenas,
            inference_url: lookup("INFERENCE_URL").filter(|url| !url.trim().is_empty()),
            inference_api_key: lookup("INFERENCE_API_KEY").filter(|key| !key.trim().is_empty()),
            metadata_path: lookup("WARRIOR_METADATA_PATH").map(PathBuf::from),
            log_dir: lookup("LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_arenas(raw: &str) -> Result<Vec<ArenaId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| ArenaId::new(entry).with_context(|| format!("Invalid ARENA_ADDRESSES entry: {entry}")))
        .collect()
}

fn read<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow!("Invalid {key}: {e}"))
        })
        .transpose()
}
