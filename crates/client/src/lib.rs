//! Operator client hosting the arena runtime.
//!
//! # Architecture
//!
//! ```text
//! Client (composition root)
//!   ├─→ Runtime (per-arena scheduler, orchestrator, reconciler)
//!   └─→ Reporter (renders round and automation events to the log)
//! ```
//!
//! The `arena` binary builds a [`Client`] for the long-running `run` command;
//! one-shot operator commands talk to a runtime handle directly.

mod builder;
pub mod logging;

pub use builder::ClientBuilder;

use std::future::Future;

use anyhow::Result;
use arena_core::ArenaId;
use runtime::{AutomationEvent, Event, RoundEvent, Runtime, RuntimeHandle, Topic};
use tokio::sync::broadcast::error::RecvError;

/// Top-level client container.
///
/// # Lifecycle
///
/// 1. [`Client::builder`] collects the runtime and the arenas to drive
/// 2. [`Client::run`] starts workers for every arena and a reporter task
/// 3. When `shutdown` resolves, workers are stopped and joined
pub struct Client {
    runtime: Runtime,
    arenas: Vec<ArenaId>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let handle = self.runtime.handle();
        let reporter = tokio::spawn(report(handle));

        for arena in &self.arenas {
            self.runtime.watch_arena(arena.clone()).await?;
        }
        tracing::info!(arenas = self.arenas.len(), "client running");

        shutdown.await;
        tracing::info!("shutdown requested");

        self.runtime.shutdown().await?;
        reporter.abort();
        let _ = reporter.await;

        tracing::info!("client shutdown complete");
        Ok(())
    }
}

/// Logs round and automation activity for every watched arena.
async fn report(handle: RuntimeHandle) {
    let mut rounds = handle.subscribe(Topic::Round);
    let mut automation = handle.subscribe(Topic::Automation);

    loop {
        let received = tokio::select! {
            event = rounds.recv() => event,
            event = automation.recv() => event,
        };
        match received {
            Ok(event) => {
                if let Some(line) = describe(&event) {
                    tracing::info!("{line}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "reporter lagged behind the event bus");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// One-line rendering of the events an operator cares about.
pub fn describe(event: &Event) -> Option<String> {
    match event {
        Event::Round(RoundEvent::Settled {
            arena,
            round,
            summary,
            ..
        }) => Some(format!("[{arena}] round {round}: {summary}")),
        Event::Round(RoundEvent::Aborted {
            arena,
            round,
            error,
        }) => Some(format!("[{arena}] round {round} aborted: {error}")),
        Event::Automation(AutomationEvent::Halted { arena, reason }) => {
            Some(format!("[{arena}] automation halted: {reason}"))
        }
        Event::Automation(AutomationEvent::Resumed { arena }) => {
            Some(format!("[{arena}] automation resumed"))
        }
        Event::Automation(AutomationEvent::Finished { arena, winner }) => Some(match winner {
            Some(side) => format!("[{arena}] battle finished, side {side} wins"),
            None => format!("[{arena}] battle finished in a draw"),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use arena_core::{Move, MoveSelection, Side, WarriorId};
    use client_blockchain_core::{ArenaWriter, ConfirmationWatcher, MockArenaLedger};
    use runtime::{FixedMoveProvider, MoveAuthorizer, RuntimeConfig};

    use super::*;

    fn arena() -> ArenaId {
        ArenaId::new("0xa1").unwrap()
    }

    #[test]
    fn only_operator_relevant_events_are_described() {
        let halted = Event::Automation(AutomationEvent::Halted {
            arena: arena(),
            reason: "rollback".into(),
        });
        assert_eq!(
            describe(&halted).as_deref(),
            Some("[0xa1] automation halted: rollback")
        );

        let finished = Event::Automation(AutomationEvent::Finished {
            arena: arena(),
            winner: Some(Side::B),
        });
        assert_eq!(
            describe(&finished).as_deref(),
            Some("[0xa1] battle finished, side B wins")
        );

        let resumed = Event::Automation(AutomationEvent::Resumed { arena: arena() });
        assert!(describe(&resumed).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn run_drives_arenas_until_shutdown() {
        let ledger = MockArenaLedger::new();
        ledger.add_arena(&arena(), 60, 30);
        let tx = ledger
            .initialize(&arena(), WarriorId(1), WarriorId(2))
            .await
            .unwrap();
        ledger.wait_confirmed(&tx, Duration::from_secs(1)).await.unwrap();
        ledger.add_bettor(&arena(), Side::A, "0xb1");
        ledger.add_bettor(&arena(), Side::B, "0xb2");
        ledger.set_time(61);

        let runtime = Runtime::builder()
            .config(RuntimeConfig::default())
            .gateway(Arc::new(ledger.clone()))
            .move_provider(FixedMoveProvider::moves(MoveSelection::new(
                Move::Strike,
                Move::Dodge,
            )))
            .authorizer(
                MoveAuthorizer::from_hex(
                    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
                )
                .unwrap(),
            )
            .build()
            .await
            .unwrap();

        Client::builder()
            .runtime(runtime)
            .arenas(vec![arena()])
            .build()
            .unwrap()
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await
            .unwrap();

        assert_eq!(ledger.start_attempts(), 1);
    }
}
