//! Per-arena command consumer that drives ledger transitions.
//!
//! Scheduler-produced and operator-produced commands go through the same
//! `trigger_*` entry points; the only difference is that automated commands
//! are skipped while automation is halted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arena_core::{
    ArenaAction, ArenaCommand, ArenaId, ArenaState, ArenaView, Combatant, DataError, DataErrorKind,
    LedgerSnapshot, Origin, Pairing, RoundOutcome, Side, WarriorId,
};
use client_blockchain_core::{ChainGateway, TxHandle, TxStatus, decode_move_outcomes};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::api::{
    AutomationStatus, CommandOutcome, OrchestratorPhase, Result, RuntimeError, SkipReason, Stage,
};
use crate::authority::MoveAuthorizer;
use crate::events::{AutomationEvent, EventBus, RoundEvent, RoundSummary, SideSummary};
use crate::inference::{MoveAdapter, MoveNameCache};
use crate::queue::CommandQueue;
use crate::workers::RoundMetrics;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub confirmation_timeout: Duration,
    pub round_timeout: Duration,
    pub max_rounds: u8,
    /// Accept a signature supplied with the inference response when it
    /// recovers to the authority.
    pub trust_inference_signatures: bool,
}

/// Shared collaborators every orchestrator of a runtime uses.
#[derive(Clone)]
pub struct OrchestratorDeps {
    pub gateway: Arc<dyn ChainGateway>,
    pub adapter: Arc<MoveAdapter>,
    pub authorizer: Arc<MoveAuthorizer>,
    pub names: Arc<MoveNameCache>,
    pub queue: CommandQueue,
    pub bus: EventBus,
    pub metrics: Arc<RoundMetrics>,
}

pub struct BattleOrchestrator {
    arena: ArenaId,
    deps: OrchestratorDeps,
    config: OrchestratorConfig,
    automation: Arc<watch::Sender<AutomationStatus>>,
    reconcile: mpsc::Sender<()>,
    /// Battle transaction submitted per round value.
    in_flight: HashMap<u8, TxHandle>,
    shutdown: watch::Receiver<bool>,
}

impl BattleOrchestrator {
    pub fn new(
        arena: ArenaId,
        deps: OrchestratorDeps,
        config: OrchestratorConfig,
        automation: Arc<watch::Sender<AutomationStatus>>,
        reconcile: mpsc::Sender<()>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            arena,
            deps,
            config,
            automation,
            reconcile,
            in_flight: HashMap::new(),
            shutdown,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        info!(arena = %self.arena, "orchestrator started");
        self.sync_phase().await;

        loop {
            let command = tokio::select! {
                _ = self.shutdown.changed() => break,
                command = self.deps.queue.next(&self.arena) => command,
            };

            let (action, origin) = (command.action, command.origin);
            let mut shutdown = self.shutdown.clone();
            let result = tokio::select! {
                result = self.execute(command) => Some(result),
                _ = shutdown.changed() => None,
            };
            self.deps.queue.complete(&self.arena);

            let Some(result) = result else {
                warn!(arena = %self.arena, %action, "shutdown requested, abandoning command");
                self.deps.bus.publish(AutomationEvent::CommandCompleted {
                    arena: self.arena.clone(),
                    action,
                    origin,
                    result: Err(RuntimeError::ShuttingDown.to_string()),
                });
                break;
            };

            self.deps.bus.publish(AutomationEvent::CommandCompleted {
                arena: self.arena.clone(),
                action,
                origin,
                result: result.map_err(|err| err.to_string()),
            });
        }

        debug!(arena = %self.arena, "orchestrator stopped");
    }

    /// Seeds the local phase from the ledger.
    async fn sync_phase(&self) {
        match self.deps.gateway.snapshot(&self.arena).await {
            Ok(snapshot) => self.set_phase(initial_phase(&snapshot)),
            Err(err) => warn!(arena = %self.arena, error = %err, "initial phase read failed"),
        }
    }

    pub async fn execute(&mut self, command: ArenaCommand) -> Result<CommandOutcome> {
        if command.origin == Origin::Automated && self.automation.borrow().halted {
            debug!(arena = %self.arena, action = %command.action, "automation halted, skipping");
            return Ok(CommandOutcome::Skipped(SkipReason::AutomationHalted));
        }

        let result = match command.action {
            ArenaAction::Initialize => match (command.warriors_a, command.warriors_b) {
                (Some(a), Some(b)) => self.trigger_initialize(a, b).await,
                _ => Err(RuntimeError::InvalidCommand(
                    "initialize requires both warriors".into(),
                )),
            },
            ArenaAction::StartGame => self.trigger_start_game(command.origin).await,
            ArenaAction::NextRound => match command.round {
                Some(round) => self.trigger_next_round(round, command.origin).await,
                None => Err(RuntimeError::InvalidCommand(
                    "nextRound requires a round".into(),
                )),
            },
            ArenaAction::Cleanup => Ok(self.cleanup()),
        };

        match &result {
            Ok(CommandOutcome::Applied)
                if command.origin == Origin::Manual && command.action != ArenaAction::Cleanup =>
            {
                self.resume();
            }
            Err(err) => self.record_error(command.action, err),
            Ok(_) => {}
        }

        result
    }

    async fn trigger_initialize(&mut self, a: WarriorId, b: WarriorId) -> Result<CommandOutcome> {
        let gateway = &self.deps.gateway;
        let tx = gateway.initialize(&self.arena, a, b).await?;
        gateway
            .wait_confirmed(&tx, self.config.confirmation_timeout)
            .await?;

        if !gateway.is_initialized(&self.arena).await? {
            return Err(RuntimeError::StateRollback {
                arena: self.arena.clone(),
                action: ArenaAction::Initialize,
            });
        }

        self.in_flight.clear();
        self.set_phase(OrchestratorPhase::Betting);
        self.request_reconcile();
        info!(arena = %self.arena, %a, %b, %tx, "arena initialized");
        Ok(CommandOutcome::Applied)
    }

    /// Betting → Starting → RoundInFlight. A confirmed start that leaves the
    /// round counter at zero rolls back to Betting and halts automation.
    pub async fn trigger_start_game(&mut self, origin: Origin) -> Result<CommandOutcome> {
        let snapshot = self.deps.gateway.snapshot(&self.arena).await?;
        if snapshot.finished {
            self.set_phase(OrchestratorPhase::Finished);
            return Ok(CommandOutcome::Skipped(SkipReason::AlreadyFinished));
        }
        if snapshot.current_round != 0 {
            return Ok(CommandOutcome::Skipped(SkipReason::StaleRound {
                expected: 0,
                actual: snapshot.current_round,
            }));
        }

        self.set_phase(OrchestratorPhase::Starting);
        info!(arena = %self.arena, %origin, "starting game");

        let round = match self.submit_start().await {
            Ok(round) => round,
            Err(err) => {
                self.set_phase(OrchestratorPhase::Betting);
                return Err(err);
            }
        };
        self.request_reconcile();

        if round == 0 {
            self.set_phase(OrchestratorPhase::Betting);
            return Err(RuntimeError::StateRollback {
                arena: self.arena.clone(),
                action: ArenaAction::StartGame,
            });
        }

        self.set_phase(OrchestratorPhase::RoundInFlight);
        info!(arena = %self.arena, round, "game started");
        Ok(CommandOutcome::Applied)
    }

    async fn submit_start(&self) -> Result<u8> {
        let gateway = &self.deps.gateway;
        let tx = gateway.start_game(&self.arena).await?;
        gateway
            .wait_confirmed(&tx, self.config.confirmation_timeout)
            .await?;
        Ok(gateway.current_round(&self.arena).await?)
    }

    /// Runs one round: stale-round guard, in-flight guard, then the
    /// sequential pipeline under the round timeout.
    pub async fn trigger_next_round(&mut self, round: u8, origin: Origin) -> Result<CommandOutcome> {
        let snapshot = self.deps.gateway.snapshot(&self.arena).await?;
        if snapshot.finished {
            self.set_phase(OrchestratorPhase::Finished);
            return Ok(CommandOutcome::Skipped(SkipReason::AlreadyFinished));
        }
        if snapshot.current_round != round {
            debug!(arena = %self.arena, round, actual = snapshot.current_round, "stale round");
            return Ok(CommandOutcome::Skipped(SkipReason::StaleRound {
                expected: round,
                actual: snapshot.current_round,
            }));
        }

        if let Some(tx) = self.in_flight.get(&round).cloned() {
            match self.deps.gateway.transaction_status(&tx).await? {
                TxStatus::Pending | TxStatus::Confirmed(_) => {
                    debug!(arena = %self.arena, round, %tx, "round already in flight");
                    return Ok(CommandOutcome::Skipped(SkipReason::RoundInFlight { round, tx }));
                }
                TxStatus::Reverted { .. } | TxStatus::Unknown => {
                    self.in_flight.remove(&round);
                }
            }
        }

        let previous = self.automation.borrow().phase;
        self.set_phase(OrchestratorPhase::RoundInFlight);
        info!(arena = %self.arena, round, %origin, "round started");

        let started = Instant::now();
        let result = tokio::time::timeout(self.config.round_timeout, self.run_round(round, &snapshot))
            .await
            .unwrap_or(Err(RuntimeError::Timeout {
                stage: Stage::Round,
            }));

        match result {
            Ok((tx, outcome, pairing)) => {
                self.settle(round, tx, outcome, pairing, started.elapsed())
                    .await;
                Ok(CommandOutcome::Applied)
            }
            Err(err) => {
                self.set_phase(previous);
                self.deps.metrics.record_aborted();
                self.deps.bus.publish(RoundEvent::Aborted {
                    arena: self.arena.clone(),
                    round,
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run_round(
        &mut self,
        round: u8,
        snapshot: &LedgerSnapshot,
    ) -> Result<(TxHandle, RoundOutcome, Pairing)> {
        let gateway = Arc::clone(&self.deps.gateway);
        let pairing = snapshot
            .pairing
            .ok_or_else(|| DataError::new(DataErrorKind::MissingPairing))?;

        let (traits_a, traits_b) = tokio::try_join!(
            gateway.warrior_traits(pairing.a),
            gateway.warrior_traits(pairing.b),
        )?;
        let a = Combatant::new(pairing.a, traits_a, snapshot.damages.a);
        let b = Combatant::new(pairing.b, traits_b, snapshot.damages.b);

        let decoded = self
            .deps
            .adapter
            .select_moves(round, self.config.max_rounds, &a, &b)
            .await?;
        self.deps.bus.publish(RoundEvent::MovesSelected {
            arena: self.arena.clone(),
            round,
            selection: decoded.selection,
            shape: decoded.shape,
        });

        let candidate = if self.config.trust_inference_signatures {
            decoded.signature.as_deref().and_then(parse_signature)
        } else {
            None
        };
        let signed = self
            .deps
            .authorizer
            .endorse(decoded.selection, candidate.as_deref())?;

        let tx = gateway.submit_battle(&self.arena, &signed).await?;
        self.in_flight.insert(round, tx.clone());
        self.deps.metrics.record_submitted();
        self.deps.bus.publish(RoundEvent::Submitted {
            arena: self.arena.clone(),
            round,
            tx: tx.clone(),
        });
        debug!(arena = %self.arena, round, %tx, "battle submitted");

        let receipt = gateway
            .wait_confirmed(&tx, self.config.confirmation_timeout)
            .await?;
        let outcome = decode_move_outcomes(&receipt)?;
        Ok((tx, outcome, pairing))
    }

    async fn settle(
        &mut self,
        round: u8,
        tx: TxHandle,
        outcome: RoundOutcome,
        pairing: Pairing,
        latency: Duration,
    ) {
        self.in_flight.remove(&round);
        self.deps.metrics.record_settled(latency);

        let summary = self.summarize(pairing, &outcome).await;
        info!(arena = %self.arena, round, %summary, "round settled");
        self.deps.bus.publish(RoundEvent::Settled {
            arena: self.arena.clone(),
            round,
            tx,
            outcome,
            summary,
        });

        match self.deps.gateway.snapshot(&self.arena).await {
            Ok(snapshot) if snapshot.finished => {
                let view = ArenaView::derive(&snapshot, self.config.max_rounds);
                self.set_phase(OrchestratorPhase::Finished);
                info!(arena = %self.arena, winner = ?view.winner, "battle finished");
                self.deps.bus.publish(AutomationEvent::Finished {
                    arena: self.arena.clone(),
                    winner: view.winner,
                });
            }
            Ok(snapshot) => {
                debug!(arena = %self.arena, next_round = snapshot.current_round, "awaiting next round");
                self.set_phase(OrchestratorPhase::RoundSettled);
            }
            Err(err) => {
                warn!(arena = %self.arena, error = %err, "post-settlement read failed");
                self.set_phase(OrchestratorPhase::RoundSettled);
            }
        }

        self.request_reconcile();
    }

    async fn summarize(&self, pairing: Pairing, outcome: &RoundOutcome) -> RoundSummary {
        RoundSummary {
            a: self.summarize_side(pairing, outcome, Side::A).await,
            b: self.summarize_side(pairing, outcome, Side::B).await,
        }
    }

    async fn summarize_side(
        &self,
        pairing: Pairing,
        outcome: &RoundOutcome,
        side: Side,
    ) -> SideSummary {
        let names = &self.deps.names;
        let warrior = pairing.get(side);
        let decoded = outcome.side(side);
        SideSummary {
            warrior,
            warrior_name: names.warrior_name(warrior).await,
            move_name: names.move_name(warrior, decoded.execution.mv).await,
            hit: decoded.hit,
            damage_to_opponent: decoded.execution.damage_to_opponent,
            self_recovery: decoded.execution.self_recovery,
        }
    }

    fn cleanup(&mut self) -> CommandOutcome {
        self.in_flight.clear();
        self.halt("cleanup requested");
        info!(arena = %self.arena, "arena cleaned up");
        CommandOutcome::Applied
    }

    fn record_error(&self, action: ArenaAction, err: &RuntimeError) {
        self.automation
            .send_modify(|status| status.last_error = Some(err.to_string()));

        if err.halts_automation() {
            error!(arena = %self.arena, %action, error = %err, "automation halted");
            self.halt(&err.to_string());
        } else {
            warn!(arena = %self.arena, %action, error = %err, "command failed");
        }
    }

    fn halt(&self, reason: &str) {
        self.automation.send_modify(|status| status.halted = true);
        self.deps.bus.publish(AutomationEvent::Halted {
            arena: self.arena.clone(),
            reason: reason.to_string(),
        });
    }

    fn resume(&self) {
        let was_halted = self.automation.borrow().halted;
        self.automation.send_modify(|status| {
            status.halted = false;
            status.last_error = None;
        });
        if was_halted {
            info!(arena = %self.arena, "manual transition succeeded, automation resumed");
            self.deps.bus.publish(AutomationEvent::Resumed {
                arena: self.arena.clone(),
            });
        }
    }

    fn set_phase(&self, phase: OrchestratorPhase) {
        self.automation.send_modify(|status| status.phase = phase);
    }

    fn request_reconcile(&self) {
        match self.reconcile.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => {
                debug!(arena = %self.arena, "reconciler stopped, sweep request dropped");
            }
        }
    }
}

fn initial_phase(snapshot: &LedgerSnapshot) -> OrchestratorPhase {
    match snapshot.state() {
        ArenaState::Empty => OrchestratorPhase::Idle,
        ArenaState::Initialized => OrchestratorPhase::Betting,
        ArenaState::BattleOngoing => OrchestratorPhase::RoundSettled,
        ArenaState::Finished => OrchestratorPhase::Finished,
    }
}

fn parse_signature(raw: &str) -> Option<Vec<u8>> {
    let trimmed = raw.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed)).ok()
}

#[cfg(test)]
mod tests {
    use client_blockchain_core::MockArenaLedger;

    use super::*;
    use crate::api::FixedMoveProvider;
    use crate::inference::NoMetadata;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn arena() -> ArenaId {
        ArenaId::new("0x00000000000000000000000000000000000000a1").unwrap()
    }

    fn orchestrator(ledger: &MockArenaLedger, reconcile: mpsc::Sender<()>) -> BattleOrchestrator {
        let names = Arc::new(MoveNameCache::new(Arc::new(NoMetadata)));
        let deps = OrchestratorDeps {
            gateway: Arc::new(ledger.clone()),
            adapter: Arc::new(MoveAdapter::new(
                Arc::new(FixedMoveProvider::new(serde_json::json!({}))),
                Arc::clone(&names),
                Duration::from_secs(10),
            )),
            authorizer: Arc::new(MoveAuthorizer::from_hex(DEV_KEY).unwrap()),
            names,
            queue: CommandQueue::new(),
            bus: EventBus::new(),
            metrics: Arc::new(RoundMetrics::new()),
        };
        let (automation, _) = watch::channel(AutomationStatus::default());
        let (_shutdown_tx, shutdown) = watch::channel(false);
        BattleOrchestrator::new(
            arena(),
            deps,
            OrchestratorConfig {
                confirmation_timeout: Duration::from_secs(5),
                round_timeout: Duration::from_secs(60),
                max_rounds: 5,
                trust_inference_signatures: false,
            },
            Arc::new(automation),
            reconcile,
            shutdown,
        )
    }

    #[tokio::test]
    async fn sweep_requests_coalesce_and_survive_a_stopped_reconciler() {
        let ledger = MockArenaLedger::new();
        ledger.add_arena(&arena(), 60, 30);
        let (reconcile_tx, mut reconcile_rx) = mpsc::channel(1);
        let mut orchestrator = orchestrator(&ledger, reconcile_tx);

        orchestrator.request_reconcile();
        orchestrator.request_reconcile();
        assert!(reconcile_rx.try_recv().is_ok());
        assert!(reconcile_rx.try_recv().is_err());

        drop(reconcile_rx);
        let outcome = orchestrator
            .execute(ArenaCommand::initialize(
                arena(),
                WarriorId(1),
                WarriorId(2),
                Origin::Manual,
            ))
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Applied);
        assert_eq!(
            orchestrator.automation.borrow().phase,
            OrchestratorPhase::Betting
        );
    }

    #[test]
    fn signatures_parse_with_or_without_prefix() {
        assert_eq!(parse_signature("0x0102"), Some(vec![1, 2]));
        assert_eq!(parse_signature(" 0a "), Some(vec![10]));
        assert_eq!(parse_signature("0xzz"), None);
    }

    #[test]
    fn phase_follows_ledger_state_on_startup() {
        let mut snapshot = LedgerSnapshot::default();
        assert_eq!(initial_phase(&snapshot), OrchestratorPhase::Idle);
        snapshot.initialized = true;
        assert_eq!(initial_phase(&snapshot), OrchestratorPhase::Betting);
        snapshot.battle_ongoing = true;
        assert_eq!(initial_phase(&snapshot), OrchestratorPhase::RoundSettled);
        snapshot.finished = true;
        assert_eq!(initial_phase(&snapshot), OrchestratorPhase::Finished);
    }
}
