//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides the queue and channel plumbing and offers async
//! helpers for status queries, manual commands, user intents and event
//! streams.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arena_core::{ArenaAction, ArenaCommand, ArenaId, ArenaView, Side};
use client_blockchain_core::{ChainGateway, Receipt, TxHandle};
use tokio::sync::{RwLock, broadcast, watch};

use super::errors::{Result, RuntimeError};
use super::status::{AutomationStatus, CommandOutcome, SkipReason, StatusReport};
use crate::events::{AutomationEvent, Event, EventBus, Topic};
use crate::queue::{CommandAck, CommandQueue};
use crate::workers::{MetricsSnapshot, RoundMetrics};

/// Channels the runtime keeps per watched arena.
#[derive(Clone)]
pub(crate) struct ArenaChannels {
    pub view: watch::Receiver<ArenaView>,
    pub automation: Arc<watch::Sender<AutomationStatus>>,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    queue: CommandQueue,
    gateway: Arc<dyn ChainGateway>,
    bus: EventBus,
    arenas: Arc<RwLock<HashMap<ArenaId, ArenaChannels>>>,
    metrics: Arc<RoundMetrics>,
    confirmation_timeout: Duration,
}

impl RuntimeHandle {
    pub(crate) fn new(
        queue: CommandQueue,
        gateway: Arc<dyn ChainGateway>,
        bus: EventBus,
        metrics: Arc<RoundMetrics>,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            queue,
            gateway,
            bus,
            arenas: Arc::new(RwLock::new(HashMap::new())),
            metrics,
            confirmation_timeout,
        }
    }

    pub(crate) async fn register(&self, arena: ArenaId, channels: ArenaChannels) {
        self.arenas.write().await.insert(arena, channels);
    }

    pub(crate) async fn unregister(&self, arena: &ArenaId) -> Option<ArenaChannels> {
        self.arenas.write().await.remove(arena)
    }

    async fn channels(&self, arena: &ArenaId) -> Result<ArenaChannels> {
        self.arenas
            .read()
            .await
            .get(arena)
            .cloned()
            .ok_or_else(|| RuntimeError::ArenaNotWatched(arena.clone()))
    }

    /// Arenas currently watched, in id order.
    pub async fn watched(&self) -> Vec<ArenaId> {
        let mut arenas: Vec<_> = self.arenas.read().await.keys().cloned().collect();
        arenas.sort();
        arenas
    }

    /// Reconciled view plus automation state. Never consumes a command.
    pub async fn status(&self, arena: &ArenaId) -> Result<StatusReport> {
        let channels = self.channels(arena).await?;
        let view = channels.view.borrow().clone();
        let automation = channels.automation.borrow().clone();
        Ok(StatusReport { view, automation })
    }

    /// Receiver that observes every refresh of the arena's view.
    pub async fn view_updates(&self, arena: &ArenaId) -> Result<watch::Receiver<ArenaView>> {
        Ok(self.channels(arena).await?.view)
    }

    /// Pending command for `arena`, without consuming it.
    pub fn pending(&self, arena: &ArenaId) -> Option<ArenaCommand> {
        self.queue.peek(arena)
    }

    /// Enqueues a command into the arena's slot.
    pub async fn submit_command(&self, command: ArenaCommand) -> Result<CommandAck> {
        let channels = self.channels(&command.arena).await?;
        validate(&command)?;

        let finished = channels.view.borrow().is_finished();
        if finished && matches!(command.action, ArenaAction::StartGame | ArenaAction::NextRound) {
            return Err(RuntimeError::ArenaFinished(command.arena));
        }

        let ack = self.queue.enqueue(command.clone());
        match ack {
            CommandAck::Enqueued => self.bus.publish(AutomationEvent::Enqueued { command }),
            CommandAck::Duplicate => {
                self.metrics.record_duplicate();
                self.bus.publish(AutomationEvent::Duplicate { command });
            }
        }
        Ok(ack)
    }

    /// Enqueues a command and waits for the orchestrator to finish it.
    pub async fn execute(&self, command: ArenaCommand) -> Result<CommandOutcome> {
        let mut events = self.bus.subscribe(Topic::Automation);
        let (arena, action, origin) = (command.arena.clone(), command.action, command.origin);

        if self.submit_command(command).await? == CommandAck::Duplicate {
            return Ok(CommandOutcome::Skipped(SkipReason::SlotBusy));
        }

        loop {
            match events.recv().await {
                Ok(Event::Automation(AutomationEvent::CommandCompleted {
                    arena: done,
                    action: done_action,
                    origin: done_origin,
                    result,
                })) if done == arena && done_action == action && done_origin == origin => {
                    return result.map_err(RuntimeError::CommandFailed);
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return Err(RuntimeError::ChannelClosed),
            }
        }
    }

    /// Clears a halt so the scheduler drives the arena again.
    pub async fn resume_automation(&self, arena: &ArenaId) -> Result<()> {
        let channels = self.channels(arena).await?;
        channels.automation.send_modify(|status| {
            status.halted = false;
            status.last_error = None;
        });
        tracing::info!(%arena, "automation resumed by operator");
        self.bus.publish(AutomationEvent::Resumed {
            arena: arena.clone(),
        });
        Ok(())
    }

    pub async fn place_bet(&self, arena: &ArenaId, side: Side, multiplier: u64) -> Result<Receipt> {
        let tx = self.gateway.bet(arena, side, multiplier).await?;
        self.confirm(tx).await
    }

    pub async fn influence(&self, arena: &ArenaId, side: Side) -> Result<Receipt> {
        let tx = self.gateway.influence(arena, side).await?;
        self.confirm(tx).await
    }

    pub async fn defluence(&self, arena: &ArenaId, side: Side) -> Result<Receipt> {
        let tx = self.gateway.defluence(arena, side).await?;
        self.confirm(tx).await
    }

    async fn confirm(&self, tx: TxHandle) -> Result<Receipt> {
        Ok(self
            .gateway
            .wait_confirmed(&tx, self.confirmation_timeout)
            .await?)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Arena` - View updates and observed ledger events
    /// - `Topic::Round` - Round selection, submission, settlement, aborts
    /// - `Topic::Automation` - Queue activity, halts and resumes
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.bus.subscribe_multiple(topics)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }
}

fn validate(command: &ArenaCommand) -> Result<()> {
    match command.action {
        ArenaAction::Initialize if command.warriors_a.is_none() || command.warriors_b.is_none() => {
            Err(RuntimeError::InvalidCommand(
                "initialize requires both warriors".into(),
            ))
        }
        ArenaAction::Initialize
            if command.warriors_a.is_some_and(|w| w.is_unset())
                || command.warriors_b.is_some_and(|w| w.is_unset()) =>
        {
            Err(RuntimeError::InvalidCommand("warrior id 0 is never minted".into()))
        }
        ArenaAction::NextRound if command.round.is_none() => Err(RuntimeError::InvalidCommand(
            "nextRound requires a round".into(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use arena_core::{Origin, WarriorId};

    use super::*;

    fn arena() -> ArenaId {
        ArenaId::new("0xa1").unwrap()
    }

    #[test]
    fn commands_missing_arguments_are_rejected() {
        let mut round = ArenaCommand::next_round(arena(), 1, Origin::Manual);
        assert!(validate(&round).is_ok());
        round.round = None;
        assert!(matches!(validate(&round), Err(RuntimeError::InvalidCommand(_))));

        let unset = ArenaCommand::initialize(arena(), WarriorId(0), WarriorId(2), Origin::Manual);
        assert!(matches!(validate(&unset), Err(RuntimeError::InvalidCommand(_))));
        let ok = ArenaCommand::initialize(arena(), WarriorId(1), WarriorId(2), Origin::Manual);
        assert!(validate(&ok).is_ok());
    }
}
