//! Shared bootstrap utilities for arena front-ends.
//!
//! Provides configuration loading and runtime assembly (ledger gateway,
//! inference client, move authority, warrior metadata) that the operator
//! binary and any other front-end can reuse.
pub mod builder;
pub mod config;

pub use builder::{RuntimeBuilder, RuntimeSetup};
pub use config::ArenaConfig;
