//! [`ChainGateway`] implementation over an alloy JSON-RPC provider.

use std::str::FromStr;
use std::time::Duration;

use alloy_consensus::Transaction as _;
use alloy_network::{ReceiptResponse, TransactionBuilder, TransactionResponse};
use alloy_primitives::{Address, B256, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::{
    BlockId, BlockNumberOrTag, Filter, TransactionReceipt, TransactionRequest,
};
use alloy_sol_types::SolCall;
use arena_core::{
    ArenaId, BettingTotals, Damages, InfluenceCosts, Pairing, Side, SignedMove, Traits, WarriorId,
};
use async_trait::async_trait;
use client_blockchain_core::{
    ArenaReader, ArenaWriter, BlockchainConfig, ChainGateway, ConfirmationWatcher, EventSource,
    ObservedEvent, Receipt, TransactionError, TransportError, TxHandle, TxStatus,
};

use crate::config::EvmConfig;
use crate::contract::{self, IArena, IWarriors};
use crate::error::EvmError;
use crate::logs;

/// Arena ledger client for any EVM JSON-RPC node.
///
/// Writes go through `eth_sendTransaction` from a node-managed account; the
/// node estimates gas first, so a call that would revert is reported as
/// [`TransactionError::Rejected`] before anything is broadcast.
pub struct EvmGateway {
    config: EvmConfig,
    provider: RootProvider,
}

impl EvmGateway {
    pub fn new(config: EvmConfig) -> Result<Self, EvmError> {
        config.validate().map_err(EvmError::InvalidConfig)?;
        let url = reqwest::Url::parse(&config.rpc_url).map_err(|e| {
            EvmError::InvalidConfig(format!("Invalid RPC URL {}: {e}", config.rpc_url))
        })?;
        let provider = RootProvider::new_http(url);
        Ok(Self { config, provider })
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    /// Checks the node's chain id against the configured one, if any.
    pub async fn verify_chain(&self) -> Result<(), EvmError> {
        let Some(expected) = self.config.chain_id else {
            return Ok(());
        };
        let actual = self.provider.get_chain_id().await?;
        if actual != expected {
            return Err(EvmError::InvalidConfig(format!(
                "node reports chain id {actual}, expected {expected}"
            )));
        }
        Ok(())
    }

    fn arena_address(arena: &ArenaId) -> Result<Address, EvmError> {
        Address::from_str(arena.as_str())
            .map_err(|e| EvmError::InvalidConfig(format!("arena {arena} is not an address: {e}")))
    }

    fn tx_hash(tx: &TxHandle) -> Result<B256, EvmError> {
        B256::from_str(tx.as_str())
            .map_err(|e| EvmError::Serialization(format!("invalid transaction hash {tx}: {e}")))
    }

    fn log_filter(address: Address, from_block: u64) -> Filter {
        Filter::new()
            .address(address)
            .from_block(from_block)
            .to_block(BlockNumberOrTag::Latest)
    }

    /// Runs a read-only call against `to` at the latest block.
    async fn read<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return, EvmError> {
        let request = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());
        let data = self.provider.call(request).await?;
        if data.is_empty() {
            // Calls to an address without code return empty data.
            return Err(EvmError::Abi(format!(
                "{} returned no data for {to}",
                C::SIGNATURE
            )));
        }
        C::abi_decode_returns(&data).map_err(|e| EvmError::Abi(format!("{}: {e}", C::SIGNATURE)))
    }

    async fn view<C: SolCall>(&self, arena: &ArenaId, call: C) -> Result<C::Return, EvmError> {
        self.read(Self::arena_address(arena)?, call).await
    }

    async fn view_u64<C>(&self, arena: &ArenaId, call: C) -> Result<u64, TransportError>
    where
        C: SolCall<Return = U256>,
    {
        narrow(self.view(arena, call).await?, C::SIGNATURE)
    }

    async fn view_u128<C>(&self, arena: &ArenaId, call: C) -> Result<u128, TransportError>
    where
        C: SolCall<Return = U256>,
    {
        narrow(self.view(arena, call).await?, C::SIGNATURE)
    }

    async fn view_addresses<C>(
        &self,
        arena: &ArenaId,
        call: C,
    ) -> Result<Vec<String>, TransportError>
    where
        C: SolCall<Return = Vec<Address>>,
    {
        let addresses = self.view(arena, call).await?;
        Ok(addresses.iter().map(ToString::to_string).collect())
    }

    async fn send(&self, arena: &ArenaId, data: Vec<u8>) -> Result<TxHandle, TransactionError> {
        let to = Self::arena_address(arena).map_err(EvmError::into_transaction_error)?;
        let request = TransactionRequest::default()
            .with_from(self.config.sender)
            .with_to(to)
            .with_input(data)
            .with_gas_limit(self.config.gas_limit);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| EvmError::from(e).into_transaction_error())?;

        let hash = pending.tx_hash().to_string();
        tracing::debug!(arena = %arena, tx = %hash, "transaction submitted");
        Ok(TxHandle::new(hash))
    }

    /// Replays a reverted transaction at its block to recover the reason.
    async fn replay_revert_reason(&self, hash: B256, block: Option<u64>) -> Option<String> {
        let original = self.provider.get_transaction_by_hash(hash).await.ok()??;
        let request = TransactionRequest::default()
            .with_from(TransactionResponse::from(&original))
            .with_to(original.to()?)
            .with_input(original.input().clone());
        let at = block.map_or(BlockId::latest(), BlockId::number);

        match self.provider.call(request).block(at).await {
            Ok(_) => None,
            Err(err) => EvmError::from(err).revert_reason(),
        }
    }

    async fn settle(&self, tx: &TxHandle, receipt: TransactionReceipt) -> TxStatus {
        if !ReceiptResponse::status(&receipt) {
            let reason = match Self::tx_hash(tx) {
                Ok(hash) => self.replay_revert_reason(hash, receipt.block_number).await,
                Err(_) => None,
            };
            return TxStatus::Reverted { reason };
        }

        let events = logs::receipt_events(receipt.inner.logs(), receipt.to);
        TxStatus::Confirmed(Receipt {
            tx: tx.clone(),
            block_number: receipt.block_number.unwrap_or_default(),
            events,
        })
    }

    async fn status_of(&self, tx: &TxHandle) -> Result<TxStatus, EvmError> {
        let hash = Self::tx_hash(tx)?;
        if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
            return Ok(self.settle(tx, receipt).await);
        }

        let known = self.provider.get_transaction_by_hash(hash).await?;
        Ok(if known.is_some() {
            TxStatus::Pending
        } else {
            TxStatus::Unknown
        })
    }
}

fn narrow<T: TryFrom<U256>>(value: U256, source: &str) -> Result<T, TransportError> {
    T::try_from(value).map_err(|_| {
        TransportError::SerializationError(format!("{source} returned out-of-range {value}"))
    })
}

#[async_trait]
impl ArenaReader for EvmGateway {
    async fn block_timestamp(&self) -> Result<u64, TransportError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(EvmError::from)?
            .ok_or_else(|| EvmError::Abi("node returned no latest block".into()))?;
        Ok(block.header.timestamp)
    }

    async fn latest_block(&self) -> Result<u64, TransportError> {
        Ok(self.provider.get_block_number().await.map_err(EvmError::from)?)
    }

    async fn current_round(&self, arena: &ArenaId) -> Result<u8, TransportError> {
        Ok(self.view(arena, IArena::getCurrentRoundCall {}).await?)
    }

    async fn is_initialized(&self, arena: &ArenaId) -> Result<bool, TransportError> {
        Ok(self.view(arena, IArena::getIsInitializedCall {}).await?)
    }

    async fn is_battle_ongoing(&self, arena: &ArenaId) -> Result<bool, TransportError> {
        Ok(self.view(arena, IArena::getIsBattleOngoingCall {}).await?)
    }

    async fn is_finished(&self, arena: &ArenaId) -> Result<bool, TransportError> {
        Ok(self.view(arena, IArena::getIsGameFinishedCall {}).await?)
    }

    async fn initialized_at(&self, arena: &ArenaId) -> Result<u64, TransportError> {
        self.view_u64(arena, IArena::getInitializationTimestampCall {})
            .await
    }

    async fn last_round_ended_at(&self, arena: &ArenaId) -> Result<u64, TransportError> {
        self.view_u64(arena, IArena::getLastRoundEndedAtCall {}).await
    }

    async fn min_betting_period(&self, arena: &ArenaId) -> Result<u64, TransportError> {
        self.view_u64(arena, IArena::getMinBettingPeriodCall {}).await
    }

    async fn min_round_interval(&self, arena: &ArenaId) -> Result<u64, TransportError> {
        self.view_u64(arena, IArena::getMinBattleRoundsIntervalCall {})
            .await
    }

    async fn damages(&self, arena: &ArenaId) -> Result<Damages, TransportError> {
        let (a, b) = tokio::try_join!(
            self.view_u64(arena, IArena::getDamageOnWarriorsOneCall {}),
            self.view_u64(arena, IArena::getDamageOnWarriorsTwoCall {}),
        )?;
        Ok(Damages { a, b })
    }

    async fn pairing(&self, arena: &ArenaId) -> Result<Option<Pairing>, TransportError> {
        let (a, b) = tokio::try_join!(
            self.view_u64(arena, IArena::getWarriorsOneNFTIdCall {}),
            self.view_u64(arena, IArena::getWarriorsTwoNFTIdCall {}),
        )?;
        let pairing = Pairing {
            a: WarriorId(a),
            b: WarriorId(b),
        };
        Ok((!pairing.a.is_unset() || !pairing.b.is_unset()).then_some(pairing))
    }

    async fn betting(&self, arena: &ArenaId) -> Result<BettingTotals, TransportError> {
        let (bet_amount, bettors_a, bettors_b) = tokio::try_join!(
            self.view_u128(arena, IArena::getBetAmountCall {}),
            self.view_addresses(arena, IArena::getPlayerOneBetAddressesCall {}),
            self.view_addresses(arena, IArena::getPlayerTwoBetAddressesCall {}),
        )?;
        Ok(BettingTotals {
            bet_amount,
            bettors_a,
            bettors_b,
        })
    }

    async fn costs(&self, arena: &ArenaId) -> Result<InfluenceCosts, TransportError> {
        let (influence_a, influence_b, defluence_a, defluence_b) = tokio::try_join!(
            self.view_u128(arena, IArena::getWarriorsOneInfluenceCostCall {}),
            self.view_u128(arena, IArena::getWarriorsTwoInfluenceCostCall {}),
            self.view_u128(arena, IArena::getWarriorsOneDefluenceCostCall {}),
            self.view_u128(arena, IArena::getWarriorsTwoDefluenceCostCall {}),
        )?;
        Ok(InfluenceCosts {
            influence_a,
            influence_b,
            defluence_a,
            defluence_b,
        })
    }

    async fn warrior_traits(&self, warrior: WarriorId) -> Result<Traits, TransportError> {
        let traits = self
            .read(
                self.config.warriors_contract,
                IWarriors::getTraitsCall {
                    tokenId: U256::from(warrior.0),
                },
            )
            .await?;
        Ok(Traits {
            strength: traits.strength,
            wit: traits.wit,
            charisma: traits.charisma,
            defence: traits.defence,
            luck: traits.luck,
        })
    }
}

#[async_trait]
impl ArenaWriter for EvmGateway {
    async fn initialize(
        &self,
        arena: &ArenaId,
        a: WarriorId,
        b: WarriorId,
    ) -> Result<TxHandle, TransactionError> {
        self.send(arena, contract::initialize(a, b)).await
    }

    async fn start_game(&self, arena: &ArenaId) -> Result<TxHandle, TransactionError> {
        self.send(arena, contract::start_game()).await
    }

    async fn submit_battle(
        &self,
        arena: &ArenaId,
        signed: &SignedMove,
    ) -> Result<TxHandle, TransactionError> {
        self.send(arena, contract::battle(signed.selection, &signed.signature))
            .await
    }

    async fn bet(
        &self,
        arena: &ArenaId,
        side: Side,
        multiplier: u64,
    ) -> Result<TxHandle, TransactionError> {
        self.send(arena, contract::bet(side, multiplier)).await
    }

    async fn influence(&self, arena: &ArenaId, side: Side) -> Result<TxHandle, TransactionError> {
        self.send(arena, contract::influence(side)).await
    }

    async fn defluence(&self, arena: &ArenaId, side: Side) -> Result<TxHandle, TransactionError> {
        self.send(arena, contract::defluence(side)).await
    }
}

#[async_trait]
impl ConfirmationWatcher for EvmGateway {
    async fn wait_confirmed(
        &self,
        tx: &TxHandle,
        timeout: Duration,
    ) -> Result<Receipt, TransactionError> {
        let poll = async {
            loop {
                match self.status_of(tx).await {
                    Ok(TxStatus::Confirmed(receipt)) => return Ok(receipt),
                    Ok(TxStatus::Reverted { reason }) => {
                        return Err(TransactionError::Reverted {
                            tx: tx.clone(),
                            reason,
                        });
                    }
                    Ok(TxStatus::Pending | TxStatus::Unknown) => {}
                    Err(err) => tracing::warn!(tx = %tx, error = %err, "receipt poll failed"),
                }
                tokio::time::sleep(self.config.receipt_poll).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| TransactionError::ConfirmationTimeout {
                tx: tx.clone(),
                waited: timeout,
            })?
    }

    async fn transaction_status(&self, tx: &TxHandle) -> Result<TxStatus, TransportError> {
        Ok(self.status_of(tx).await?)
    }
}

#[async_trait]
impl EventSource for EvmGateway {
    async fn events_since(
        &self,
        arena: &ArenaId,
        from_block: u64,
    ) -> Result<Vec<ObservedEvent>, TransportError> {
        let address = Self::arena_address(arena)?;
        let raw = self
            .provider
            .get_logs(&Self::log_filter(address, from_block))
            .await
            .map_err(EvmError::from)?;
        Ok(logs::decode_observed(&raw))
    }
}

impl ChainGateway for EvmGateway {
    fn name(&self) -> &str {
        "EVM"
    }

    fn network(&self) -> &str {
        self.config.network_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const WARRIORS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn config() -> EvmConfig {
        EvmConfig::new(
            Address::from_str(SENDER).unwrap(),
            Address::from_str(WARRIORS).unwrap(),
        )
    }

    #[test]
    fn gateway_rejects_invalid_config() {
        let err = EvmGateway::new(config().with_rpc_url("localhost:8545")).err();
        assert!(matches!(err, Some(EvmError::InvalidConfig(_))));
    }

    #[test]
    fn arena_ids_parse_as_addresses() {
        let arena = ArenaId::new("0x00000000000000000000000000000000000000a1").unwrap();
        assert_eq!(
            EvmGateway::arena_address(&arena).unwrap(),
            Address::with_last_byte(0xa1)
        );
        let short = ArenaId::new("0xa1").unwrap();
        assert!(EvmGateway::arena_address(&short).is_err());
    }

    #[test]
    fn transaction_handles_must_be_hashes() {
        let hash = B256::repeat_byte(0x11);
        let handle = TxHandle::new(hash.to_string());
        assert_eq!(EvmGateway::tx_hash(&handle).unwrap(), hash);
        assert!(matches!(
            EvmGateway::tx_hash(&TxHandle::new("0x1234")),
            Err(EvmError::Serialization(_))
        ));
    }

    #[test]
    fn reconciliation_filter_spans_from_cursor_to_latest() {
        let arena = Address::with_last_byte(0xa1);
        let filter = EvmGateway::log_filter(arena, 42);
        assert_eq!(filter.get_from_block(), Some(42));
        assert!(filter.address.matches(&arena));
        assert!(!filter.address.matches(&Address::with_last_byte(0xa2)));
    }

    #[test]
    fn out_of_range_words_are_serialization_errors() {
        assert_eq!(narrow::<u8>(U256::from(7u64), "getCurrentRound()").unwrap(), 7);
        assert!(matches!(
            narrow::<u8>(U256::from(300u64), "getCurrentRound()"),
            Err(TransportError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn identifies_as_evm() {
        let gateway = EvmGateway::new(config().with_chain_id(31337)).unwrap();
        assert_eq!(gateway.name(), "EVM");
        assert_eq!(gateway.network(), "evm-local");
    }
}
