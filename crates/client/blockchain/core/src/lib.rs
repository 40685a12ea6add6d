//! Ledger abstraction layer for the battle arena.
//!
//! This crate provides a layered abstraction over the arena contract.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: ChainGateway (composite trait)
//!          ├── ArenaReader
//!          ├── ArenaWriter
//!          ├── ConfirmationWatcher
//!          └── EventSource
//!
//! Layer 1: Domain types (receipts, ledger events, outcome decoding)
//! ```
//!
//! # Design Philosophy
//!
//! - **Reads** are idempotent and safe to repeat at any time
//! - **Writes** are fire-and-return; callers decide when to wait for finality
//! - **Events** are decoded into [`LedgerEvent`] once, at the edge, so the
//!   orchestrator never sees raw logs
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{ChainGateway, decode_move_outcomes};
//!
//! async fn settle(gateway: &dyn ChainGateway, arena: &ArenaId, signed: &SignedMove) {
//!     let tx = gateway.submit_battle(arena, signed).await?;
//!     let receipt = gateway.wait_confirmed(&tx, Duration::from_secs(60)).await?;
//!     let outcome = decode_move_outcomes(&receipt)?;
//! }
//! ```

pub mod events;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export all traits
pub use traits::{
    ArenaReader, ArenaWriter, ChainGateway, ConfirmationWatcher, EventSource, TransactionError,
    TransportError,
};

// Re-export all types
pub use events::{DecodeError, LedgerEvent, ObservedEvent, decode_move_outcomes};
pub use types::{BlockchainConfig, Receipt, TxHandle, TxStatus};

#[cfg(any(test, feature = "mock"))]
pub use mock::{ConfirmationMode, MockArenaLedger};
