//! Timer task that turns ledger deadlines into queued commands.
//!
//! Every tick reads a fresh snapshot and decides from it alone, so the
//! scheduler carries no state across ticks or restarts. It only ever
//! produces; the orchestrator consumes from the same queue slot.

use std::sync::Arc;
use std::time::Duration;

use arena_core::{ArenaCommand, ArenaId, ArenaState, BattlePhase, LedgerSnapshot, Origin};
use client_blockchain_core::ChainGateway;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::{AutomationStatus, Result};
use crate::events::{AutomationEvent, EventBus};
use crate::queue::{CommandAck, CommandQueue};
use crate::workers::RoundMetrics;

/// What one tick concluded from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing is due yet.
    Wait { phase: BattlePhase, remaining: u64 },
    /// A deadline passed; this command should run.
    Due(ArenaCommand),
    /// Automation is halted for the arena.
    Halted,
    /// The arena is finished; the scheduler stops.
    Finished,
}

/// Pure tick decision. Betting expiry and round-interval expiry are
/// evaluated independently; a snapshot never satisfies both.
pub fn decide(arena: &ArenaId, snapshot: &LedgerSnapshot, halted: bool) -> Decision {
    if snapshot.state() == ArenaState::Finished {
        return Decision::Finished;
    }
    if halted {
        return Decision::Halted;
    }
    if snapshot.start_due() {
        return Decision::Due(ArenaCommand::start_game(arena.clone(), Origin::Automated));
    }
    if snapshot.round_due() {
        return Decision::Due(ArenaCommand::next_round(
            arena.clone(),
            snapshot.current_round,
            Origin::Automated,
        ));
    }
    Decision::Wait {
        phase: snapshot.phase(),
        remaining: snapshot.phase_remaining(),
    }
}

pub struct Scheduler {
    arena: ArenaId,
    gateway: Arc<dyn ChainGateway>,
    queue: CommandQueue,
    automation: watch::Receiver<AutomationStatus>,
    bus: EventBus,
    metrics: Arc<RoundMetrics>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        arena: ArenaId,
        gateway: Arc<dyn ChainGateway>,
        queue: CommandQueue,
        automation: watch::Receiver<AutomationStatus>,
        bus: EventBus,
        metrics: Arc<RoundMetrics>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            arena,
            gateway,
            queue,
            automation,
            bus,
            metrics,
            interval,
            shutdown,
        }
    }

    /// Runs one tick: read, decide, enqueue.
    pub async fn tick(&self) -> Result<Decision> {
        let snapshot = self.gateway.snapshot(&self.arena).await?;
        let halted = self.automation.borrow().halted;
        let decision = decide(&self.arena, &snapshot, halted);

        if let Decision::Due(command) = &decision {
            match self.queue.enqueue(command.clone()) {
                CommandAck::Enqueued => {
                    debug!(arena = %self.arena, action = %command.action, "command enqueued");
                    self.bus.publish(AutomationEvent::Enqueued {
                        command: command.clone(),
                    });
                }
                CommandAck::Duplicate => {
                    debug!(arena = %self.arena, action = %command.action, "slot busy, command dropped");
                    self.metrics.record_duplicate();
                    self.bus.publish(AutomationEvent::Duplicate {
                        command: command.clone(),
                    });
                }
            }
        }

        Ok(decision)
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        info!(arena = %self.arena, interval = ?self.interval, "scheduler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => break,
                _ = ticker.tick() => match self.tick().await {
                    Ok(Decision::Finished) => {
                        info!(arena = %self.arena, "arena finished, scheduler stopping");
                        break;
                    }
                    Ok(Decision::Wait { phase, remaining }) => {
                        debug!(arena = %self.arena, %phase, remaining, "waiting");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(arena = %self.arena, error = %err, "scheduler tick failed");
                    }
                },
            }
        }

        debug!(arena = %self.arena, "scheduler stopped");
    }
}
