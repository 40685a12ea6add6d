//! Keeps each arena's [`ArenaView`] in step with the ledger.
//!
//! The view is only ever rebuilt from a full read sweep. Ledger events and
//! orchestrator settlement requests are triggers, never inputs.

use std::sync::Arc;
use std::time::Duration;

use arena_core::{ArenaId, ArenaView};
use client_blockchain_core::ChainGateway;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::Result;
use crate::events::{ArenaEvent, EventBus};

#[derive(Debug, Clone, Copy)]
pub struct ReconcilerConfig {
    /// Period of the unconditional full sweep.
    pub sweep_interval: Duration,
    /// Period of the incremental event poll.
    pub event_interval: Duration,
    pub max_rounds: u8,
}

pub struct StateReconciler {
    arena: ArenaId,
    gateway: Arc<dyn ChainGateway>,
    view: watch::Sender<ArenaView>,
    bus: EventBus,
    requests: mpsc::Receiver<()>,
    config: ReconcilerConfig,
    /// Highest block whose events have been published.
    last_block: u64,
    shutdown: watch::Receiver<bool>,
}

/// Equality that ignores the countdown and the observation time.
fn materially_equal(a: &ArenaView, b: &ArenaView) -> bool {
    let strip = |view: &ArenaView| ArenaView {
        phase_remaining: 0,
        observed_at: 0,
        ..view.clone()
    };
    strip(a) == strip(b)
}

impl StateReconciler {
    pub fn new(
        arena: ArenaId,
        gateway: Arc<dyn ChainGateway>,
        view: watch::Sender<ArenaView>,
        bus: EventBus,
        requests: mpsc::Receiver<()>,
        config: ReconcilerConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            arena,
            gateway,
            view,
            bus,
            requests,
            config,
            last_block: 0,
            shutdown,
        }
    }

    /// Full read sweep. Returns whether the view changed materially.
    pub async fn sweep(&self) -> Result<bool> {
        let snapshot = self.gateway.snapshot(&self.arena).await?;
        let view = ArenaView::derive(&snapshot, self.config.max_rounds);
        let previous = self.view.send_replace(view.clone());

        if materially_equal(&previous, &view) {
            return Ok(false);
        }

        debug!(arena = %self.arena, state = %view.state, phase = %view.phase, round = view.round, "view updated");
        self.bus.publish(ArenaEvent::ViewUpdated {
            arena: self.arena.clone(),
            view,
        });
        Ok(true)
    }

    /// Publishes events since the last poll; sweeps if any of them can
    /// change the view.
    pub async fn poll_events(&mut self) -> Result<usize> {
        let latest = self.gateway.latest_block().await?;
        if latest <= self.last_block {
            return Ok(0);
        }

        let events = self
            .gateway
            .events_since(&self.arena, self.last_block + 1)
            .await?;
        let highest = events
            .iter()
            .map(|observed| observed.block_number)
            .max()
            .unwrap_or(latest);
        self.last_block = latest.max(highest);

        let affects_view = events.iter().any(|observed| observed.event.affects_view());
        let count = events.len();
        for event in events {
            debug!(arena = %self.arena, event = event.event.name(), block = event.block_number, "ledger event");
            self.bus.publish(ArenaEvent::LedgerEventObserved {
                arena: self.arena.clone(),
                event,
            });
        }

        if affects_view {
            self.sweep().await?;
        }
        Ok(count)
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        info!(arena = %self.arena, "reconciler started");

        if let Err(err) = self.sweep().await {
            warn!(arena = %self.arena, error = %err, "initial sweep failed");
        }
        match self.gateway.latest_block().await {
            Ok(block) => self.last_block = block,
            Err(err) => warn!(arena = %self.arena, error = %err, "latest block read failed"),
        }

        let mut sweeps = tokio::time::interval(self.config.sweep_interval);
        sweeps.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polls = tokio::time::interval(self.config.event_interval);
        polls.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => break,
                Some(()) = self.requests.recv() => self.sweep_logged("settlement").await,
                _ = sweeps.tick() => self.sweep_logged("interval").await,
                _ = polls.tick() => {
                    if let Err(err) = self.poll_events().await {
                        warn!(arena = %self.arena, error = %err, "event poll failed");
                    }
                }
            }
        }

        debug!(arena = %self.arena, "reconciler stopped");
    }

    async fn sweep_logged(&self, trigger: &str) {
        if let Err(err) = self.sweep().await {
            warn!(arena = %self.arena, trigger, error = %err, "sweep failed");
        }
    }
}
