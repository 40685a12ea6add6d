//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::time::Duration;

use arena_core::{ArenaId, Side, WarriorId};
use client_blockchain_core::{ArenaWriter, ConfirmationWatcher, MockArenaLedger};
use runtime::{Event, MoveAuthorizer, RuntimeConfig};
use tokio::sync::broadcast;

pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const BETTING_PERIOD: u64 = 60;
pub const ROUND_INTERVAL: u64 = 30;

pub fn arena() -> ArenaId {
    ArenaId::new("0x00000000000000000000000000000000000000a1").expect("valid arena id")
}

pub fn authorizer() -> MoveAuthorizer {
    MoveAuthorizer::from_hex(DEV_KEY).expect("valid dev key")
}

pub fn config() -> RuntimeConfig {
    RuntimeConfig {
        scheduler_interval: Duration::from_secs(2),
        reconcile_interval: Duration::from_secs(5),
        inference_timeout: Duration::from_secs(10),
        confirmation_timeout: Duration::from_secs(5),
        round_timeout: Duration::from_secs(60),
        ..RuntimeConfig::default()
    }
}

/// Ledger with a deployed arena, initialized at t=0 with warriors 1 and 2.
pub async fn initialized_ledger() -> MockArenaLedger {
    let ledger = MockArenaLedger::new();
    ledger.add_arena(&arena(), BETTING_PERIOD, ROUND_INTERVAL);
    let tx = ledger
        .initialize(&arena(), WarriorId(1), WarriorId(2))
        .await
        .expect("initialize accepted");
    ledger
        .wait_confirmed(&tx, Duration::from_secs(1))
        .await
        .expect("initialize confirmed");
    ledger
}

/// Ledger whose battle started at t=61 and is sitting in round 1.
pub async fn started_ledger() -> MockArenaLedger {
    let ledger = initialized_ledger().await;
    ledger.add_bettor(&arena(), Side::A, "0xb1");
    ledger.add_bettor(&arena(), Side::B, "0xb2");
    ledger.set_time(BETTING_PERIOD + 1);
    let tx = ledger.start_game(&arena()).await.expect("start accepted");
    ledger
        .wait_confirmed(&tx, Duration::from_secs(1))
        .await
        .expect("start confirmed");
    ledger
}

/// Waits (in paused time) for the first event matching `pick`.
pub async fn next_matching<T>(
    events: &mut broadcast::Receiver<Event>,
    mut pick: impl FnMut(Event) -> Option<T>,
) -> T {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(found) = pick(event) {
                        return found;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(600), wait)
        .await
        .expect("expected event never arrived")
}
