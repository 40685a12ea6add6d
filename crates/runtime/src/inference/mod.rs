//! Inference collaborator: prompt construction, transport and response
//! decoding.
//!
//! The model is untrusted input. Everything it returns goes through
//! [`decode_response`], which either yields a canonical [`MoveSelection`]
//! or a [`DataError`](arena_core::DataError) that aborts the round.
//!
//! [`MoveSelection`]: arena_core::MoveSelection

mod adapter;
mod client;
mod metadata;
mod names;
mod prompt;
mod shapes;

pub use adapter::MoveAdapter;
pub use client::{HttpMoveProvider, InferenceError};
pub use metadata::{
    JsonMetadataSource, MetadataError, NoMetadata, WarriorMetadataSource, WarriorProfile,
};
pub use names::MoveNameCache;
pub use prompt::{AgentBrief, BattlePrompt};
pub use shapes::{DecodedMoves, ResponseShape, decode_response};
