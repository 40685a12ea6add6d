//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{ArenaEvent, AutomationEvent, RoundEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Reconciled views and raw ledger events
    Arena,
    /// Round lifecycle (selection, submission, settlement, aborts)
    Round,
    /// Command queue and automation state
    Automation,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Arena(ArenaEvent),
    Round(RoundEvent),
    Automation(AutomationEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Arena(_) => Topic::Arena,
            Event::Round(_) => Topic::Round,
            Event::Automation(_) => Topic::Automation,
        }
    }
}

impl From<ArenaEvent> for Event {
    fn from(event: ArenaEvent) -> Self {
        Event::Arena(event)
    }
}

impl From<RoundEvent> for Event {
    fn from(event: RoundEvent) -> Self {
        Event::Round(event)
    }
}

impl From<AutomationEvent> for Event {
    fn from(event: AutomationEvent) -> Self {
        Event::Automation(event)
    }
}

struct Channels {
    arena: broadcast::Sender<Event>,
    round: broadcast::Sender<Event>,
    automation: broadcast::Sender<Event>,
}

impl Channels {
    fn get(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Arena => &self.arena,
            Topic::Round => &self.round,
            Topic::Automation => &self.automation,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Every topic channel exists from construction on,
/// so publishing and subscribing never take a lock.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Channels {
                arena: broadcast::channel(capacity).0,
                round: broadcast::channel(capacity).0,
                automation: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();

        if self.channels.get(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.get(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
