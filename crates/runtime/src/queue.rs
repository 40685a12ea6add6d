//! Single-slot command queue, one slot per arena.
//!
//! Producers (the scheduler tick and operators) enqueue; the arena's
//! orchestrator is the only consumer. A slot holds at most one pending
//! command, and a second command for an arena whose slot is pending or still
//! executing is dropped as a duplicate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use arena_core::{ArenaCommand, ArenaId};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

/// Result of [`CommandQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandAck {
    Enqueued,
    /// The arena already had a pending or executing command; nothing changed.
    Duplicate,
}

#[derive(Default)]
struct Slot {
    pending: Option<ArenaCommand>,
    executing: bool,
    notify: Arc<Notify>,
}

impl Slot {
    fn is_busy(&self) -> bool {
        self.pending.is_some() || self.executing
    }
}

#[derive(Clone, Default)]
pub struct CommandQueue {
    slots: Arc<Mutex<HashMap<ArenaId, Slot>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<R>(&self, f: impl FnOnce(&mut HashMap<ArenaId, Slot>) -> R) -> R {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut slots)
    }

    pub fn enqueue(&self, command: ArenaCommand) -> CommandAck {
        self.with_slots(|slots| {
            let slot = slots.entry(command.arena.clone()).or_default();
            if slot.is_busy() {
                return CommandAck::Duplicate;
            }
            slot.pending = Some(command);
            slot.notify.notify_one();
            CommandAck::Enqueued
        })
    }

    /// Takes the pending command and marks the slot executing. The check and
    /// the clear happen under one lock.
    pub fn poll(&self, arena: &ArenaId) -> Option<ArenaCommand> {
        self.with_slots(|slots| {
            let slot = slots.get_mut(arena)?;
            let command = slot.pending.take()?;
            slot.executing = true;
            Some(command)
        })
    }

    /// Waits for the next command for `arena`. Cancel-safe: a command is only
    /// taken out of the slot when this future completes.
    pub async fn next(&self, arena: &ArenaId) -> ArenaCommand {
        loop {
            let notify = self.with_slots(|slots| {
                Arc::clone(&slots.entry(arena.clone()).or_default().notify)
            });
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(command) = self.poll(arena) {
                return command;
            }
            notified.await;
        }
    }

    /// Releases the executing mark so the slot accepts new commands.
    pub fn complete(&self, arena: &ArenaId) {
        self.with_slots(|slots| {
            if let Some(slot) = slots.get_mut(arena) {
                slot.executing = false;
            }
        });
    }

    /// Pending command for `arena`, without consuming it.
    pub fn peek(&self, arena: &ArenaId) -> Option<ArenaCommand> {
        self.with_slots(|slots| slots.get(arena).and_then(|slot| slot.pending.clone()))
    }

    pub fn is_executing(&self, arena: &ArenaId) -> bool {
        self.with_slots(|slots| slots.get(arena).is_some_and(|slot| slot.executing))
    }

    /// Drops the slot entirely, pending command included.
    pub fn remove(&self, arena: &ArenaId) -> Option<ArenaCommand> {
        self.with_slots(|slots| slots.remove(arena).and_then(|slot| slot.pending))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use arena_core::Origin;

    use super::*;

    fn arena() -> ArenaId {
        ArenaId::new("0xa1").unwrap()
    }

    #[test]
    fn second_enqueue_is_a_duplicate_until_completed() {
        let queue = CommandQueue::new();
        let start = ArenaCommand::start_game(arena(), Origin::Automated);

        assert_eq!(queue.enqueue(start.clone()), CommandAck::Enqueued);
        assert_eq!(queue.enqueue(start.clone()), CommandAck::Duplicate);

        assert_eq!(queue.poll(&arena()), Some(start.clone()));
        assert!(queue.is_executing(&arena()));
        assert_eq!(queue.enqueue(start.clone()), CommandAck::Duplicate);
        assert_eq!(queue.poll(&arena()), None);

        queue.complete(&arena());
        assert_eq!(queue.enqueue(start), CommandAck::Enqueued);
    }

    #[test]
    fn peek_does_not_consume() {
        let queue = CommandQueue::new();
        let round = ArenaCommand::next_round(arena(), 2, Origin::Manual);
        queue.enqueue(round.clone());

        assert_eq!(queue.peek(&arena()), Some(round.clone()));
        assert_eq!(queue.peek(&arena()), Some(round.clone()));
        assert!(!queue.is_executing(&arena()));
        assert_eq!(queue.poll(&arena()), Some(round));
    }

    #[test]
    fn arenas_have_independent_slots() {
        let queue = CommandQueue::new();
        let other = ArenaId::new("0xb2").unwrap();

        assert_eq!(
            queue.enqueue(ArenaCommand::start_game(arena(), Origin::Automated)),
            CommandAck::Enqueued
        );
        assert_eq!(
            queue.enqueue(ArenaCommand::start_game(other.clone(), Origin::Automated)),
            CommandAck::Enqueued
        );
        assert!(queue.remove(&other).is_some());
        assert!(queue.peek(&other).is_none());
    }

    #[tokio::test]
    async fn next_wakes_on_enqueue() {
        let queue = CommandQueue::new();
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.next(&arena()).await })
        };

        tokio::task::yield_now().await;
        queue.enqueue(ArenaCommand::cleanup(arena(), Origin::Manual));

        let command = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(command.action, arena_core::ArenaAction::Cleanup);
        assert!(queue.is_executing(&arena()));
    }

    #[tokio::test]
    async fn next_returns_already_pending_command() {
        let queue = CommandQueue::new();
        queue.enqueue(ArenaCommand::start_game(arena(), Origin::Automated));

        let command = queue.next(&arena()).await;
        assert_eq!(command.action, arena_core::ArenaAction::StartGame);
    }
}
