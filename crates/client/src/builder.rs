//! Client builder with dependency injection pattern.

use anyhow::{Context, Result, bail};
use arena_core::ArenaId;
use runtime::Runtime;

use crate::Client;

/// Builder for constructing a [`Client`] with proper validation.
///
/// - **Required**: a runtime and at least one arena
/// - **Fail-fast**: missing pieces cause `build()` to fail
#[derive(Default)]
pub struct ClientBuilder {
    runtime: Option<Runtime>,
    arenas: Vec<ArenaId>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the runtime (required).
    ///
    /// Usually assembled by `client_bootstrap::RuntimeBuilder`.
    pub fn runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Arenas to drive. Duplicates are ignored.
    pub fn arenas(mut self, arenas: impl IntoIterator<Item = ArenaId>) -> Self {
        for arena in arenas {
            if !self.arenas.contains(&arena) {
                self.arenas.push(arena);
            }
        }
        self
    }

    pub fn build(self) -> Result<Client> {
        let runtime = self
            .runtime
            .context("Runtime is required. Use .runtime() to set it.")?;

        if self.arenas.is_empty() {
            bail!("No arenas to watch. Set ARENA_ADDRESSES or pass --arena.");
        }

        Ok(Client {
            runtime,
            arenas: self.arenas,
        })
    }
}
