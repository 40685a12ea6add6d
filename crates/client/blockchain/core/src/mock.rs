//! In-memory arena ledger for testing without a network.
//!
//! Simulates the arena contract closely enough to drive the orchestrator end
//! to end: betting window and participation threshold on `start_game`,
//! deterministic move resolution on `battle`, event emission, and controllable
//! block time and confirmation behavior.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arena_core::{
    ArenaId, BettingTotals, Damages, InfluenceCosts, Move, MoveExecution, Pairing, Side,
    SignedMove, Traits, WarriorId,
};
use async_trait::async_trait;

use crate::events::{LedgerEvent, ObservedEvent};
use crate::traits::{
    ArenaReader, ArenaWriter, ChainGateway, ConfirmationWatcher, EventSource, TransactionError,
    TransportError,
};
use crate::types::{Receipt, TxHandle, TxStatus};

/// How submitted transactions reach finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationMode {
    /// Executed and confirmed in the block they are submitted in.
    Immediate,
    /// Accepted but left pending until [`MockArenaLedger::release_pending`].
    Stalled,
}

type SignatureCheck = Arc<dyn Fn(&SignedMove) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
struct MockArena {
    initialized: bool,
    ongoing: bool,
    finished: bool,
    round: u8,
    max_rounds: u8,
    initialized_at: u64,
    last_round_ended_at: u64,
    min_betting_period: u64,
    min_round_interval: u64,
    pairing: Option<Pairing>,
    damages: Damages,
    betting: BettingTotals,
    costs: InfluenceCosts,
}

#[derive(Debug, Clone)]
enum WriteOp {
    Initialize(WarriorId, WarriorId),
    StartGame,
    Battle(SignedMove),
    Bet(Side, u64),
    Influence(Side),
    Defluence(Side),
}

struct PendingWrite {
    tx: TxHandle,
    arena: ArenaId,
    op: WriteOp,
}

struct Ledger {
    now: u64,
    block: u64,
    tx_counter: u64,
    sender: String,
    arenas: HashMap<ArenaId, MockArena>,
    traits: HashMap<WarriorId, Traits>,
    txs: HashMap<TxHandle, TxStatus>,
    logs: Vec<(ArenaId, ObservedEvent)>,
    battles: Vec<(ArenaId, SignedMove)>,
    start_attempts: usize,
    confirmation: ConfirmationMode,
    pending: Vec<PendingWrite>,
    reject_next: Option<String>,
    signature_check: Option<SignatureCheck>,
}

/// Mock ledger shared by clones; every clone sees the same state.
#[derive(Clone)]
pub struct MockArenaLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl MockArenaLedger {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ledger {
                now: 0,
                block: 1,
                tx_counter: 0,
                sender: "0x00000000000000000000000000000000000000aa".to_string(),
                arenas: HashMap::new(),
                traits: HashMap::new(),
                txs: HashMap::new(),
                logs: Vec::new(),
                battles: Vec::new(),
                start_attempts: 0,
                confirmation: ConfirmationMode::Immediate,
                pending: Vec::new(),
                reject_next: None,
                signature_check: None,
            })),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deploys an empty arena with the given window lengths (seconds).
    pub fn add_arena(&self, arena: &ArenaId, min_betting_period: u64, min_round_interval: u64) {
        self.ledger().arenas.insert(
            arena.clone(),
            MockArena {
                initialized: false,
                ongoing: false,
                finished: false,
                round: 0,
                max_rounds: 5,
                initialized_at: 0,
                last_round_ended_at: 0,
                min_betting_period,
                min_round_interval,
                pairing: None,
                damages: Damages::default(),
                betting: BettingTotals {
                    bet_amount: 1_000,
                    ..BettingTotals::default()
                },
                costs: InfluenceCosts {
                    influence_a: 10,
                    influence_b: 10,
                    defluence_a: 25,
                    defluence_b: 25,
                },
            },
        );
    }

    pub fn set_max_rounds(&self, arena: &ArenaId, max_rounds: u8) {
        if let Some(state) = self.ledger().arenas.get_mut(arena) {
            state.max_rounds = max_rounds;
        }
    }

    pub fn set_traits(&self, warrior: WarriorId, traits: Traits) {
        self.ledger().traits.insert(warrior, traits);
    }

    /// Sets the block timestamp and mines a block.
    pub fn set_time(&self, now: u64) {
        let mut ledger = self.ledger();
        ledger.now = now;
        ledger.block += 1;
    }

    pub fn advance(&self, seconds: u64) {
        let now = self.ledger().now;
        self.set_time(now + seconds);
    }

    pub fn now(&self) -> u64 {
        self.ledger().now
    }

    /// Adds a bettor directly, bypassing the write path.
    pub fn add_bettor(&self, arena: &ArenaId, side: Side, bettor: &str) {
        if let Some(state) = self.ledger().arenas.get_mut(arena) {
            match side {
                Side::A => state.betting.bettors_a.push(bettor.to_string()),
                Side::B => state.betting.bettors_b.push(bettor.to_string()),
            }
        }
    }

    pub fn set_confirmation_mode(&self, mode: ConfirmationMode) {
        self.ledger().confirmation = mode;
    }

    /// Makes the next write fail at submission with `reason`.
    pub fn reject_next_write(&self, reason: &str) {
        self.ledger().reject_next = Some(reason.to_string());
    }

    /// Installs the contract-side signature check for `battle`.
    pub fn with_signature_check(
        self,
        check: impl Fn(&SignedMove) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.ledger().signature_check = Some(Arc::new(check));
        self
    }

    /// Every `battle` call accepted for `arena`, in submission order.
    pub fn battles(&self, arena: &ArenaId) -> Vec<SignedMove> {
        self.ledger()
            .battles
            .iter()
            .filter(|(id, _)| id == arena)
            .map(|(_, signed)| signed.clone())
            .collect()
    }

    pub fn start_attempts(&self) -> usize {
        self.ledger().start_attempts
    }

    /// Executes every pending write in submission order.
    pub fn release_pending(&self) {
        let mut ledger = self.ledger();
        let pending = std::mem::take(&mut ledger.pending);
        ledger.block += 1;
        for write in pending {
            let status = match ledger.execute(&write.arena, &write.op) {
                Ok(events) => TxStatus::Confirmed(ledger.record(&write.arena, &write.tx, events)),
                Err(reason) => TxStatus::Reverted {
                    reason: Some(reason),
                },
            };
            ledger.txs.insert(write.tx, status);
        }
    }

    fn submit(&self, arena: &ArenaId, op: WriteOp) -> Result<TxHandle, TransactionError> {
        let mut ledger = self.ledger();
        if let Some(reason) = ledger.reject_next.take() {
            return Err(TransactionError::Rejected {
                reason: Some(reason),
            });
        }
        if !ledger.arenas.contains_key(arena) {
            return Err(TransportError::ArenaNotFound(arena.clone()).into());
        }
        if matches!(op, WriteOp::StartGame) {
            ledger.start_attempts += 1;
        }

        // Gas estimation replays the call: a write that would revert now is
        // rejected before it is ever broadcast.
        let mut dry_run = ledger.arenas.clone();
        ledger
            .check(&mut dry_run, arena, &op)
            .map_err(|reason| TransactionError::Rejected {
                reason: Some(reason),
            })?;

        ledger.tx_counter += 1;
        let tx = TxHandle::new(format!("0x{:064x}", ledger.tx_counter));

        match ledger.confirmation {
            ConfirmationMode::Immediate => {
                ledger.block += 1;
                let status = match ledger.execute(arena, &op) {
                    Ok(events) => TxStatus::Confirmed(ledger.record(arena, &tx, events)),
                    Err(reason) => TxStatus::Reverted {
                        reason: Some(reason),
                    },
                };
                ledger.txs.insert(tx.clone(), status);
            }
            ConfirmationMode::Stalled => {
                ledger.txs.insert(tx.clone(), TxStatus::Pending);
                ledger.pending.push(PendingWrite {
                    tx: tx.clone(),
                    arena: arena.clone(),
                    op,
                });
            }
        }

        Ok(tx)
    }

    fn read<T>(
        &self,
        arena: &ArenaId,
        f: impl FnOnce(&MockArena) -> T,
    ) -> Result<T, TransportError> {
        self.ledger()
            .arenas
            .get(arena)
            .map(f)
            .ok_or_else(|| TransportError::ArenaNotFound(arena.clone()))
    }
}

impl Default for MockArenaLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    fn check(
        &self,
        arenas: &mut HashMap<ArenaId, MockArena>,
        arena: &ArenaId,
        op: &WriteOp,
    ) -> Result<Vec<LedgerEvent>, String> {
        let state = arenas
            .get_mut(arena)
            .ok_or_else(|| "arena not deployed".to_string())?;
        apply(state, op, self.now, &self.sender, self.signature_check.as_ref())
    }

    fn execute(&mut self, arena: &ArenaId, op: &WriteOp) -> Result<Vec<LedgerEvent>, String> {
        let state = self
            .arenas
            .get_mut(arena)
            .ok_or_else(|| "arena not deployed".to_string())?;
        let events = apply(state, op, self.now, &self.sender, self.signature_check.as_ref())?;
        if let WriteOp::Battle(signed) = op {
            self.battles.push((arena.clone(), signed.clone()));
        }
        Ok(events)
    }

    fn record(&mut self, arena: &ArenaId, tx: &TxHandle, events: Vec<LedgerEvent>) -> Receipt {
        for event in &events {
            self.logs.push((
                arena.clone(),
                ObservedEvent {
                    block_number: self.block,
                    event: event.clone(),
                },
            ));
        }
        Receipt {
            tx: tx.clone(),
            block_number: self.block,
            events,
        }
    }
}

fn apply(
    state: &mut MockArena,
    op: &WriteOp,
    now: u64,
    sender: &str,
    signature_check: Option<&SignatureCheck>,
) -> Result<Vec<LedgerEvent>, String> {
    match op {
        WriteOp::Initialize(a, b) => {
            if state.initialized && !state.finished {
                return Err("arena already initialized".into());
            }
            state.initialized = true;
            state.ongoing = false;
            state.finished = false;
            state.round = 0;
            state.initialized_at = now;
            state.last_round_ended_at = 0;
            state.pairing = Some(Pairing { a: *a, b: *b });
            state.damages = Damages::default();
            state.betting.bettors_a.clear();
            state.betting.bettors_b.clear();
            Ok(Vec::new())
        }
        WriteOp::StartGame => {
            if !state.initialized || state.ongoing || state.finished {
                return Err("game cannot be started".into());
            }
            if now < state.initialized_at + state.min_betting_period {
                return Err("betting period not over".into());
            }
            if state.betting.bettors_a.is_empty() || state.betting.bettors_b.is_empty() {
                // Not enough participation: the contract restarts betting
                // instead of starting the game.
                state.initialized_at = now;
                return Ok(Vec::new());
            }
            state.round = 1;
            state.ongoing = true;
            state.last_round_ended_at = now;
            Ok(vec![LedgerEvent::GameStarted { started_at: now }])
        }
        WriteOp::Battle(signed) => {
            if !state.ongoing || state.finished {
                return Err("battle not ongoing".into());
            }
            if now < state.last_round_ended_at + state.min_round_interval {
                return Err("round interval not over".into());
            }
            if let Some(check) = signature_check
                && !check(signed)
            {
                return Err("invalid signature".into());
            }

            let a = resolve(signed.selection.a, signed.selection.b);
            let b = resolve(signed.selection.b, signed.selection.a);
            state.damages.a += b.damage_to_opponent.saturating_sub(a.self_recovery);
            state.damages.b += a.damage_to_opponent.saturating_sub(b.self_recovery);

            let round = state.round;
            let mut events = vec![
                LedgerEvent::MoveExecuted {
                    executor: sender.to_string(),
                    execution: a,
                },
                LedgerEvent::MoveExecuted {
                    executor: sender.to_string(),
                    execution: b,
                },
                LedgerEvent::RoundOver {
                    round,
                    damage_a: state.damages.a,
                    damage_b: state.damages.b,
                },
            ];

            state.round += 1;
            state.last_round_ended_at = now;
            if state.round > state.max_rounds {
                state.ongoing = false;
                state.finished = true;
                let winner = match (state.pairing, state.damages.a <= state.damages.b) {
                    (Some(pairing), true) => pairing.a,
                    (Some(pairing), false) => pairing.b,
                    (None, _) => WarriorId(0),
                };
                events.push(LedgerEvent::GameFinished {
                    winner,
                    damage_a: state.damages.a,
                    damage_b: state.damages.b,
                });
            }
            Ok(events)
        }
        WriteOp::Bet(side, multiplier) => {
            if !state.initialized || state.round != 0 {
                return Err("betting closed".into());
            }
            let pairing = state.pairing.ok_or("arena has no pairing")?;
            match side {
                Side::A => state.betting.bettors_a.push(sender.to_string()),
                Side::B => state.betting.bettors_b.push(sender.to_string()),
            }
            Ok(vec![LedgerEvent::BetPlaced {
                bettor: sender.to_string(),
                warrior: pairing.get(*side),
                multiplier: *multiplier,
            }])
        }
        WriteOp::Influence(side) | WriteOp::Defluence(side) => {
            if !state.ongoing {
                return Err("battle not ongoing".into());
            }
            let pairing = state.pairing.ok_or("arena has no pairing")?;
            let warrior = pairing.get(*side);
            Ok(vec![match op {
                WriteOp::Influence(_) => LedgerEvent::Influenced {
                    by: sender.to_string(),
                    warrior,
                },
                _ => LedgerEvent::Defluenced {
                    by: sender.to_string(),
                    warrior,
                },
            }])
        }
    }
}

/// Deterministic move table used by the mock contract.
fn resolve(own: Move, opponent: Move) -> MoveExecution {
    let (damage, recovery, dodged) = match own {
        Move::Strike => (10, 0, false),
        Move::Special => (25, 0, false),
        Move::Taunt => (0, 0, false),
        Move::Dodge => (0, 0, true),
        Move::Recover => (0, 8, false),
    };
    MoveExecution {
        mv: own,
        damage_to_opponent: if opponent == Move::Dodge { 0 } else { damage },
        self_recovery: recovery,
        dodged,
    }
}

#[async_trait]
impl ArenaReader for MockArenaLedger {
    async fn block_timestamp(&self) -> Result<u64, TransportError> {
        Ok(self.ledger().now)
    }

    async fn latest_block(&self) -> Result<u64, TransportError> {
        Ok(self.ledger().block)
    }

    async fn current_round(&self, arena: &ArenaId) -> Result<u8, TransportError> {
        self.read(arena, |s| s.round)
    }

    async fn is_initialized(&self, arena: &ArenaId) -> Result<bool, TransportError> {
        self.read(arena, |s| s.initialized)
    }

    async fn is_battle_ongoing(&self, arena: &ArenaId) -> Result<bool, TransportError> {
        self.read(arena, |s| s.ongoing)
    }

    async fn is_finished(&self, arena: &ArenaId) -> Result<bool, TransportError> {
        self.read(arena, |s| s.finished)
    }

    async fn initialized_at(&self, arena: &ArenaId) -> Result<u64, TransportError> {
        self.read(arena, |s| s.initialized_at)
    }

    async fn last_round_ended_at(&self, arena: &ArenaId) -> Result<u64, TransportError> {
        self.read(arena, |s| s.last_round_ended_at)
    }

    async fn min_betting_period(&self, arena: &ArenaId) -> Result<u64, TransportError> {
        self.read(arena, |s| s.min_betting_period)
    }

    async fn min_round_interval(&self, arena: &ArenaId) -> Result<u64, TransportError> {
        self.read(arena, |s| s.min_round_interval)
    }

    async fn damages(&self, arena: &ArenaId) -> Result<Damages, TransportError> {
        self.read(arena, |s| s.damages)
    }

    async fn pairing(&self, arena: &ArenaId) -> Result<Option<Pairing>, TransportError> {
        self.read(arena, |s| s.pairing)
    }

    async fn betting(&self, arena: &ArenaId) -> Result<BettingTotals, TransportError> {
        self.read(arena, |s| s.betting.clone())
    }

    async fn costs(&self, arena: &ArenaId) -> Result<InfluenceCosts, TransportError> {
        self.read(arena, |s| s.costs)
    }

    async fn warrior_traits(&self, warrior: WarriorId) -> Result<Traits, TransportError> {
        Ok(self
            .ledger()
            .traits
            .get(&warrior)
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ArenaWriter for MockArenaLedger {
    async fn initialize(
        &self,
        arena: &ArenaId,
        a: WarriorId,
        b: WarriorId,
    ) -> Result<TxHandle, TransactionError> {
        self.submit(arena, WriteOp::Initialize(a, b))
    }

    async fn start_game(&self, arena: &ArenaId) -> Result<TxHandle, TransactionError> {
        self.submit(arena, WriteOp::StartGame)
    }

    async fn submit_battle(
        &self,
        arena: &ArenaId,
        signed: &SignedMove,
    ) -> Result<TxHandle, TransactionError> {
        self.submit(arena, WriteOp::Battle(signed.clone()))
    }

    async fn bet(
        &self,
        arena: &ArenaId,
        side: Side,
        multiplier: u64,
    ) -> Result<TxHandle, TransactionError> {
        self.submit(arena, WriteOp::Bet(side, multiplier))
    }

    async fn influence(&self, arena: &ArenaId, side: Side) -> Result<TxHandle, TransactionError> {
        self.submit(arena, WriteOp::Influence(side))
    }

    async fn defluence(&self, arena: &ArenaId, side: Side) -> Result<TxHandle, TransactionError> {
        self.submit(arena, WriteOp::Defluence(side))
    }
}

#[async_trait]
impl ConfirmationWatcher for MockArenaLedger {
    async fn wait_confirmed(
        &self,
        tx: &TxHandle,
        timeout: Duration,
    ) -> Result<Receipt, TransactionError> {
        let poll = async {
            loop {
                match self.transaction_status(tx).await? {
                    TxStatus::Confirmed(receipt) => return Ok(receipt),
                    TxStatus::Reverted { reason } => {
                        return Err(TransactionError::Reverted {
                            tx: tx.clone(),
                            reason,
                        });
                    }
                    TxStatus::Pending | TxStatus::Unknown => {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                }
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
        Ok(self
            .ledger()
            .txs
            .get(tx)
            .cloned()
            .unwrap_or(TxStatus::Unknown))
    }
}

#[async_trait]
impl EventSource for MockArenaLedger {
    async fn events_since(
        &self,
        arena: &ArenaId,
        from_block: u64,
    ) -> Result<Vec<ObservedEvent>, TransportError> {
        Ok(self
            .ledger()
            .logs
            .iter()
            .filter(|(id, observed)| id == arena && observed.block_number >= from_block)
            .map(|(_, observed)| observed.clone())
            .collect())
    }
}

impl ChainGateway for MockArenaLedger {
    fn name(&self) -> &str {
        "MockLedger"
    }

    fn network(&self) -> &str {
        "mock-network"
    }
}

#[cfg(test)]
mod tests {
    use arena_core::{ArenaState, MoveSelection};

    use super::*;
    use crate::decode_move_outcomes;

    fn arena() -> ArenaId {
        ArenaId::new("0xa1").unwrap()
    }

    fn signed(a: Move, b: Move) -> SignedMove {
        SignedMove::new(MoveSelection::new(a, b), vec![0u8; 65])
    }

    async fn started_ledger() -> MockArenaLedger {
        let ledger = MockArenaLedger::new();
        ledger.add_arena(&arena(), 60, 0);
        let tx = ledger
            .initialize(&arena(), WarriorId(1), WarriorId(2))
            .await
            .unwrap();
        ledger.wait_confirmed(&tx, Duration::from_secs(1)).await.unwrap();
        ledger.add_bettor(&arena(), Side::A, "0xb1");
        ledger.add_bettor(&arena(), Side::B, "0xb2");
        ledger.set_time(61);
        let tx = ledger.start_game(&arena()).await.unwrap();
        ledger.wait_confirmed(&tx, Duration::from_secs(1)).await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn start_game_without_bettors_resets_round_to_zero() {
        let ledger = MockArenaLedger::new();
        ledger.add_arena(&arena(), 60, 0);
        ledger
            .initialize(&arena(), WarriorId(1), WarriorId(2))
            .await
            .unwrap();
        ledger.set_time(61);

        let tx = ledger.start_game(&arena()).await.unwrap();
        ledger.wait_confirmed(&tx, Duration::from_secs(1)).await.unwrap();

        let snapshot = ledger.snapshot(&arena()).await.unwrap();
        assert_eq!(snapshot.current_round, 0);
        assert_eq!(snapshot.state(), ArenaState::Initialized);
        assert_eq!(snapshot.initialized_at, 61);
    }

    #[tokio::test]
    async fn battle_emits_ordered_move_events_and_advances_round() {
        let ledger = started_ledger().await;

        let tx = ledger
            .submit_battle(&arena(), &signed(Move::Strike, Move::Recover))
            .await
            .unwrap();
        let receipt = ledger.wait_confirmed(&tx, Duration::from_secs(1)).await.unwrap();
        let outcome = decode_move_outcomes(&receipt).unwrap();

        assert_eq!(outcome.a.execution.damage_to_opponent, 10);
        assert_eq!(outcome.b.execution.self_recovery, 8);
        assert_eq!(ledger.current_round(&arena()).await.unwrap(), 2);
        assert_eq!(ledger.damages(&arena()).await.unwrap(), Damages { a: 0, b: 2 });
    }

    #[tokio::test]
    async fn final_round_finishes_the_game() {
        let ledger = started_ledger().await;
        ledger.set_max_rounds(&arena(), 1);

        let tx = ledger
            .submit_battle(&arena(), &signed(Move::Special, Move::Taunt))
            .await
            .unwrap();
        let receipt = ledger.wait_confirmed(&tx, Duration::from_secs(1)).await.unwrap();

        assert!(matches!(
            receipt.events.last(),
            Some(LedgerEvent::GameFinished { winner: WarriorId(1), .. })
        ));
        let snapshot = ledger.snapshot(&arena()).await.unwrap();
        assert_eq!(snapshot.state(), ArenaState::Finished);
    }

    #[tokio::test]
    async fn signature_check_rejects_at_submission() {
        let ledger = started_ledger().await.with_signature_check(|_| false);
        let err = ledger
            .submit_battle(&arena(), &signed(Move::Strike, Move::Strike))
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("invalid signature"));
        assert!(ledger.battles(&arena()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_confirmation_times_out_until_released() {
        let ledger = started_ledger().await;
        ledger.set_confirmation_mode(ConfirmationMode::Stalled);

        let tx = ledger
            .submit_battle(&arena(), &signed(Move::Strike, Move::Strike))
            .await
            .unwrap();
        let err = ledger
            .wait_confirmed(&tx, Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::ConfirmationTimeout { .. }));
        assert_eq!(ledger.transaction_status(&tx).await.unwrap(), TxStatus::Pending);

        ledger.release_pending();
        assert!(matches!(
            ledger.transaction_status(&tx).await.unwrap(),
            TxStatus::Confirmed(_)
        ));
        assert_eq!(ledger.battles(&arena()).len(), 1);
    }

    #[tokio::test]
    async fn events_since_filters_by_block() {
        let ledger = started_ledger().await;
        let from = ledger.latest_block().await.unwrap() + 1;
        ledger
            .submit_battle(&arena(), &signed(Move::Taunt, Move::Taunt))
            .await
            .unwrap();

        let events = ledger.events_since(&arena(), from).await.unwrap();
        let names: Vec<_> = events.iter().map(|e| e.event.name()).collect();
        assert_eq!(names, vec!["MoveExecuted", "MoveExecuted", "RoundOver"]);
    }
}
