//! Scheduler and orchestrator behavior against the in-memory ledger.
//!
//! All tests run on paused tokio time: worker intervals advance instantly
//! once every task is idle, while ledger time only moves when a test sets it.

mod common;

use std::sync::Arc;
use std::time::Duration;

use arena_core::{ArenaAction, ArenaCommand, Move, MoveSelection, Origin, Side};
use client_blockchain_core::{ConfirmationMode, MockArenaLedger};
use runtime::{
    AutomationEvent, CommandOutcome, Event, FixedMoveProvider, OrchestratorPhase, RoundEvent,
    Runtime, RuntimeError, SkipReason, Topic,
};

use common::*;

async fn runtime_for(ledger: &MockArenaLedger, moves: MoveSelection) -> Runtime {
    Runtime::builder()
        .config(config())
        .gateway(Arc::new(ledger.clone()))
        .move_provider(FixedMoveProvider::moves(moves))
        .authorizer(authorizer())
        .build()
        .await
        .expect("runtime should build")
}

/// Betting window gating:
/// 1. At t=59 the window has not elapsed and nothing is enqueued
/// 2. At t=61 exactly one StartGame is submitted and the battle starts
/// 3. Later ticks see an ongoing battle inside its round interval and stay idle
#[tokio::test(start_paused = true)]
async fn start_game_fires_once_after_betting_window() {
    let ledger = initialized_ledger().await;
    ledger.add_bettor(&arena(), Side::A, "0xb1");
    ledger.add_bettor(&arena(), Side::B, "0xb2");
    ledger.set_time(59);

    let mut runtime = runtime_for(&ledger, MoveSelection::new(Move::Strike, Move::Dodge)).await;
    let handle = runtime.handle();
    let mut automation = handle.subscribe(Topic::Automation);
    runtime.watch_arena(arena()).await.expect("arena is readable");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(ledger.start_attempts(), 0);
    assert_eq!(handle.pending(&arena()), None);

    let status = handle.status(&arena()).await.expect("arena is watched");
    assert_eq!(status.automation.phase, OrchestratorPhase::Betting);
    assert_eq!(status.view.phase_remaining, 1);
    assert!(!status.automation.halted);

    ledger.set_time(61);
    let result = next_matching(&mut automation, |event| match event {
        Event::Automation(AutomationEvent::CommandCompleted {
            action: ArenaAction::StartGame,
            origin,
            result,
            ..
        }) => Some((origin, result)),
        _ => None,
    })
    .await;
    assert_eq!(result, (Origin::Automated, Ok(CommandOutcome::Applied)));

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(ledger.start_attempts(), 1);
    assert!(ledger.battles(&arena()).is_empty());

    let status = handle.status(&arena()).await.expect("arena is watched");
    assert_eq!(status.view.round, 1);
    assert_eq!(status.view.state, arena_core::ArenaState::BattleOngoing);

    runtime.shutdown().await.expect("workers stop cleanly");
}

/// A confirmed StartGame that leaves the round at zero is a rollback:
/// automation halts, the scheduler stops producing, and a successful manual
/// transition resumes it.
#[tokio::test(start_paused = true)]
async fn rollback_halts_until_manual_start_succeeds() {
    let ledger = initialized_ledger().await;
    ledger.set_time(61);

    let mut runtime = runtime_for(&ledger, MoveSelection::new(Move::Strike, Move::Dodge)).await;
    let handle = runtime.handle();
    let mut automation = handle.subscribe(Topic::Automation);
    runtime.watch_arena(arena()).await.expect("arena is readable");

    let reason = next_matching(&mut automation, |event| match event {
        Event::Automation(AutomationEvent::Halted { reason, .. }) => Some(reason),
        _ => None,
    })
    .await;
    assert!(reason.contains("did not advance"), "unexpected reason: {reason}");

    let status = handle.status(&arena()).await.expect("arena is watched");
    assert!(status.automation.halted);
    assert!(status.automation.last_error.is_some());
    assert_eq!(status.automation.phase, OrchestratorPhase::Betting);
    assert_eq!(ledger.start_attempts(), 1);

    // The restarted betting window elapses, but automation stays halted.
    ledger.set_time(500);
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(ledger.start_attempts(), 1);

    ledger.add_bettor(&arena(), Side::A, "0xb1");
    ledger.add_bettor(&arena(), Side::B, "0xb2");
    let outcome = handle
        .execute(ArenaCommand::start_game(arena(), Origin::Manual))
        .await
        .expect("manual start succeeds");
    assert_eq!(outcome, CommandOutcome::Applied);
    assert_eq!(ledger.start_attempts(), 2);

    let status = handle.status(&arena()).await.expect("arena is watched");
    assert!(!status.automation.halted);
    assert_eq!(status.automation.last_error, None);

    runtime.shutdown().await.expect("workers stop cleanly");
}

/// A round whose battle transaction is still pending is never resubmitted:
/// 1. The first attempt submits, then times out waiting for confirmation
/// 2. Ticks during execution are dropped as duplicates
/// 3. The retry finds the pending transaction and skips
/// 4. Once the ledger mines it, exactly one battle exists
#[tokio::test(start_paused = true)]
async fn pending_round_is_not_resubmitted() {
    let ledger = started_ledger().await;
    ledger.set_time(BETTING_PERIOD + 1 + ROUND_INTERVAL);
    ledger.set_confirmation_mode(ConfirmationMode::Stalled);

    let mut runtime = runtime_for(&ledger, MoveSelection::new(Move::Strike, Move::Strike)).await;
    let handle = runtime.handle();
    let mut rounds = handle.subscribe(Topic::Round);
    let mut automation = handle.subscribe(Topic::Automation);
    runtime.watch_arena(arena()).await.expect("arena is readable");

    let submitted = next_matching(&mut rounds, |event| match event {
        Event::Round(RoundEvent::Submitted { round: 1, tx, .. }) => Some(tx),
        _ => None,
    })
    .await;
    next_matching(&mut rounds, |event| match event {
        Event::Round(RoundEvent::Aborted { round: 1, .. }) => Some(()),
        _ => None,
    })
    .await;

    let skipped = next_matching(&mut automation, |event| match event {
        Event::Automation(AutomationEvent::CommandCompleted {
            result: Ok(CommandOutcome::Skipped(SkipReason::RoundInFlight { round: 1, tx })),
            ..
        }) => Some(tx),
        _ => None,
    })
    .await;
    assert_eq!(skipped, submitted);

    let status = handle.status(&arena()).await.expect("arena is watched");
    assert!(!status.automation.halted, "timeouts do not halt automation");

    ledger.release_pending();
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert_eq!(ledger.battles(&arena()).len(), 1);
    let status = handle.status(&arena()).await.expect("arena is watched");
    assert_eq!(status.view.round, 2);

    let metrics = handle.metrics();
    assert_eq!(metrics.submitted, 1);
    assert_eq!(metrics.aborted, 1);
    assert!(metrics.duplicates >= 1);

    runtime.shutdown().await.expect("workers stop cleanly");
}

/// The final round finishes the arena: a winner is announced, the scheduler
/// stops, and round-advancing commands are refused.
#[tokio::test(start_paused = true)]
async fn finished_arena_refuses_round_commands() {
    let ledger = started_ledger().await;
    ledger.set_max_rounds(&arena(), 1);
    ledger.set_time(BETTING_PERIOD + 1 + ROUND_INTERVAL);

    // A deals 25, B deals 10: A takes less damage and wins.
    let mut runtime =
        runtime_for(&ledger, MoveSelection::new(Move::Special, Move::Strike)).await;
    let handle = runtime.handle();
    let mut automation = handle.subscribe(Topic::Automation);
    runtime.watch_arena(arena()).await.expect("arena is readable");

    let winner = next_matching(&mut automation, |event| match event {
        Event::Automation(AutomationEvent::Finished { winner, .. }) => Some(winner),
        _ => None,
    })
    .await;
    assert_eq!(winner, Some(Side::A));

    tokio::time::sleep(Duration::from_secs(10)).await;
    let status = handle.status(&arena()).await.expect("arena is watched");
    assert!(status.view.is_finished());
    assert_eq!(status.view.winner, Some(Side::A));
    assert_eq!(status.automation.phase, OrchestratorPhase::Finished);

    let err = handle
        .submit_command(ArenaCommand::next_round(arena(), 2, Origin::Manual))
        .await
        .expect_err("finished arenas take no rounds");
    assert!(matches!(err, RuntimeError::ArenaFinished(_)));

    ledger.advance(1_000);
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(ledger.battles(&arena()).len(), 1);
    assert_eq!(handle.pending(&arena()), None);

    runtime.shutdown().await.expect("workers stop cleanly");
}

/// An unrecognized inference response aborts the round without touching
/// the ledger and without halting automation.
#[tokio::test(start_paused = true)]
async fn malformed_inference_aborts_round_only() {
    let ledger = started_ledger().await;
    ledger.set_time(BETTING_PERIOD + 1 + ROUND_INTERVAL);

    let mut runtime = Runtime::builder()
        .config(config())
        .gateway(Arc::new(ledger.clone()))
        .move_provider(FixedMoveProvider::new(serde_json::json!({ "agent_1": "strike" })))
        .authorizer(authorizer())
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut rounds = handle.subscribe(Topic::Round);
    runtime.watch_arena(arena()).await.expect("arena is readable");

    let error = next_matching(&mut rounds, |event| match event {
        Event::Round(RoundEvent::Aborted { round: 1, error, .. }) => Some(error),
        _ => None,
    })
    .await;
    assert!(!error.is_empty());

    let status = handle.status(&arena()).await.expect("arena is watched");
    assert!(!status.automation.halted);
    assert!(status.automation.last_error.is_some());
    assert!(ledger.battles(&arena()).is_empty());
    assert_eq!(handle.metrics().submitted, 0);

    runtime.shutdown().await.expect("workers stop cleanly");
}
