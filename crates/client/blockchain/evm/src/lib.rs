//! EVM ledger integration for the battle arena.
//!
//! This crate implements [`client_blockchain_core::ChainGateway`] over an
//! alloy HTTP provider:
//! - Contract reads through `eth_call` with `sol!` generated bindings
//! - Writes through `eth_sendTransaction` from a node-managed account
//! - Confirmation by polling `eth_getTransactionReceipt`
//! - Incremental reconciliation through `eth_getLogs`
//!
//! # Architecture
//!
//! ```text
//! EvmGateway ── contract (sol! bindings, calldata)
//!     │
//!     ├── alloy RootProvider (JSON-RPC over HTTP)
//!     └── logs (rpc Log → LedgerEvent)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_evm::{EvmConfig, EvmGateway};
//! use client_blockchain_core::ArenaReader;
//!
//! let gateway = EvmGateway::new(EvmConfig::from_env()?)?;
//! gateway.verify_chain().await?;
//! let snapshot = gateway.snapshot(&arena).await?;
//! ```

pub mod config;
pub mod contract;
pub mod error;
pub mod gateway;
pub mod logs;

pub use config::EvmConfig;
pub use error::EvmError;
pub use gateway::EvmGateway;
