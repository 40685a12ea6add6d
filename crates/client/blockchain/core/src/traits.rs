//! Ledger abstraction traits.
//!
//! This module defines a layered ledger abstraction:
//! - Layer 1: ArenaReader, ArenaWriter, ConfirmationWatcher, EventSource
//! - Layer 2: ChainGateway (composite trait)

use std::time::Duration;

use arena_core::{
    ArenaId, BettingTotals, Damages, InfluenceCosts, LedgerSnapshot, Pairing, Side, SignedMove,
    Traits, WarriorId,
};
use async_trait::async_trait;

use crate::events::ObservedEvent;
use crate::types::{Receipt, TxHandle, TxStatus};

// ============================================================================
// Error Types
// ============================================================================

/// Transport layer errors (reads and node communication).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Arena not found: {0}")]
    ArenaNotFound(ArenaId),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Write-path errors. Each one aborts the current round attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction rejected: {}", reason.as_deref().unwrap_or("no reason given"))]
    Rejected { reason: Option<String> },

    #[error("Transaction {tx} reverted: {}", reason.as_deref().unwrap_or("no reason given"))]
    Reverted {
        tx: TxHandle,
        reason: Option<String>,
    },

    #[error("Transaction {tx} not confirmed within {waited:?}")]
    ConfirmationTimeout { tx: TxHandle, waited: Duration },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl TransactionError {
    /// Ledger revert reason, when the node reported one.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            TransactionError::Rejected { reason } | TransactionError::Reverted { reason, .. } => {
                reason.as_deref()
            }
            _ => None,
        }
    }
}

// ============================================================================
// Layer 1: Arena Domain Traits
// ============================================================================

/// Read-only access to arena and warrior state.
///
/// Every method is idempotent. [`ArenaReader::snapshot`] bundles a full read
/// sweep and is what schedulers and reconcilers should use.
#[async_trait]
pub trait ArenaReader: Send + Sync {
    /// Timestamp of the latest block, the clock for all phase decisions.
    async fn block_timestamp(&self) -> Result<u64, TransportError>;

    async fn latest_block(&self) -> Result<u64, TransportError>;

    async fn current_round(&self, arena: &ArenaId) -> Result<u8, TransportError>;

    async fn is_initialized(&self, arena: &ArenaId) -> Result<bool, TransportError>;

    async fn is_battle_ongoing(&self, arena: &ArenaId) -> Result<bool, TransportError>;

    async fn is_finished(&self, arena: &ArenaId) -> Result<bool, TransportError>;

    async fn initialized_at(&self, arena: &ArenaId) -> Result<u64, TransportError>;

    async fn last_round_ended_at(&self, arena: &ArenaId) -> Result<u64, TransportError>;

    async fn min_betting_period(&self, arena: &ArenaId) -> Result<u64, TransportError>;

    async fn min_round_interval(&self, arena: &ArenaId) -> Result<u64, TransportError>;

    async fn damages(&self, arena: &ArenaId) -> Result<Damages, TransportError>;

    /// Combatant pairing, `None` while the arena is uninitialized.
    async fn pairing(&self, arena: &ArenaId) -> Result<Option<Pairing>, TransportError>;

    async fn betting(&self, arena: &ArenaId) -> Result<BettingTotals, TransportError>;

    async fn costs(&self, arena: &ArenaId) -> Result<InfluenceCosts, TransportError>;

    async fn warrior_traits(&self, warrior: WarriorId) -> Result<Traits, TransportError>;

    /// Full read sweep. Independent reads are issued concurrently.
    async fn snapshot(&self, arena: &ArenaId) -> Result<LedgerSnapshot, TransportError> {
        let (now, initialized, battle_ongoing, finished, current_round) = tokio::try_join!(
            self.block_timestamp(),
            self.is_initialized(arena),
            self.is_battle_ongoing(arena),
            self.is_finished(arena),
            self.current_round(arena),
        )?;
        let (initialized_at, last_round_ended_at, min_betting_period, min_round_interval) = tokio::try_join!(
            self.initialized_at(arena),
            self.last_round_ended_at(arena),
            self.min_betting_period(arena),
            self.min_round_interval(arena),
        )?;
        let (damages, pairing, betting, costs) = tokio::try_join!(
            self.damages(arena),
            self.pairing(arena),
            self.betting(arena),
            self.costs(arena),
        )?;

        Ok(LedgerSnapshot {
            now,
            initialized,
            battle_ongoing,
            finished,
            current_round,
            initialized_at,
            last_round_ended_at,
            min_betting_period,
            min_round_interval,
            damages,
            pairing,
            betting,
            costs,
        })
    }
}

/// State-changing arena calls.
///
/// All writes return as soon as the node accepts the transaction. None of
/// them are idempotent: callers must not resubmit a write that was accepted.
#[async_trait]
pub trait ArenaWriter: Send + Sync {
    async fn initialize(
        &self,
        arena: &ArenaId,
        a: WarriorId,
        b: WarriorId,
    ) -> Result<TxHandle, TransactionError>;

    async fn start_game(&self, arena: &ArenaId) -> Result<TxHandle, TransactionError>;

    /// Submits the signed move pair for the arena's current round.
    async fn submit_battle(
        &self,
        arena: &ArenaId,
        signed: &SignedMove,
    ) -> Result<TxHandle, TransactionError>;

    async fn bet(
        &self,
        arena: &ArenaId,
        side: Side,
        multiplier: u64,
    ) -> Result<TxHandle, TransactionError>;

    async fn influence(&self, arena: &ArenaId, side: Side) -> Result<TxHandle, TransactionError>;

    async fn defluence(&self, arena: &ArenaId, side: Side) -> Result<TxHandle, TransactionError>;
}

/// Finality tracking for submitted transactions.
#[async_trait]
pub trait ConfirmationWatcher: Send + Sync {
    /// Waits until the transaction is final or `timeout` elapses.
    async fn wait_confirmed(
        &self,
        tx: &TxHandle,
        timeout: Duration,
    ) -> Result<Receipt, TransactionError>;

    /// Non-blocking status lookup.
    async fn transaction_status(&self, tx: &TxHandle) -> Result<TxStatus, TransportError>;
}

/// Incremental event feed for one arena.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events emitted by `arena` in blocks `from_block..=latest`.
    async fn events_since(
        &self,
        arena: &ArenaId,
        from_block: u64,
    ) -> Result<Vec<ObservedEvent>, TransportError>;
}

// ============================================================================
// Layer 2: Composite Trait
// ============================================================================

/// Complete ledger interface used by the orchestrator.
///
/// All arena-compatible ledgers must implement this trait.
/// This is a composite of required domain traits.
pub trait ChainGateway:
    ArenaReader + ArenaWriter + ConfirmationWatcher + EventSource + Send + Sync
{
    /// Get the ledger name (e.g., "EVM").
    fn name(&self) -> &str;

    /// Get the network name (e.g., "mainnet", "testnet", "local").
    fn network(&self) -> &str;
}
