//! High-level runtime orchestrator.
//!
//! The runtime owns the per-arena workers, wires up queue, event and watch
//! channels, and exposes a builder-based API for clients to drive arenas.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arena_core::{ArenaId, ArenaView};
use client_blockchain_core::ChainGateway;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{AutomationStatus, MoveProvider, Result, RuntimeError, RuntimeHandle};
use crate::api::handle::ArenaChannels;
use crate::authority::MoveAuthorizer;
use crate::events::EventBus;
use crate::inference::{MoveAdapter, MoveNameCache, NoMetadata, WarriorMetadataSource};
use crate::queue::CommandQueue;
use crate::reconciler::{ReconcilerConfig, StateReconciler};
use crate::workers::{
    BattleOrchestrator, OrchestratorConfig, OrchestratorDeps, RoundMetrics, Scheduler,
};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Scheduler tick, also the incremental event poll period
    pub scheduler_interval: Duration,
    /// Period of the unconditional full read sweep
    pub reconcile_interval: Duration,
    pub inference_timeout: Duration,
    pub confirmation_timeout: Duration,
    /// Overall budget for one round, inference through confirmation
    pub round_timeout: Duration,
    pub max_rounds: u8,
    pub event_buffer_size: usize,
    /// Use a signature returned by the inference service when it recovers to
    /// the authority (default: false, always sign locally)
    pub trust_inference_signatures: bool,
    /// Spawn a scheduler per arena. Off for one-shot operator commands.
    pub automation: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scheduler_interval: Duration::from_secs(2),
            reconcile_interval: Duration::from_secs(5),
            inference_timeout: Duration::from_secs(60),
            confirmation_timeout: Duration::from_secs(60),
            round_timeout: Duration::from_secs(180),
            max_rounds: 5,
            event_buffer_size: 100,
            trust_inference_signatures: false,
            automation: true,
        }
    }
}

struct ArenaWorkers {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

/// Main runtime that orchestrates watched arenas
///
/// Design: Runtime owns workers and coordinates execution.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    config: RuntimeConfig,
    deps: OrchestratorDeps,
    workers: HashMap<ArenaId, ArenaWorkers>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Starts the scheduler, orchestrator and reconciler for `arena`.
    ///
    /// Reads the arena once up front so an unknown arena fails here rather
    /// than inside a worker.
    pub async fn watch_arena(&mut self, arena: ArenaId) -> Result<()> {
        if self.workers.contains_key(&arena) {
            return Err(RuntimeError::ArenaAlreadyWatched(arena));
        }

        let snapshot = self.deps.gateway.snapshot(&arena).await?;
        let view = ArenaView::derive(&snapshot, self.config.max_rounds);

        let (view_tx, view_rx) = watch::channel(view);
        let (automation_tx, automation_rx) = watch::channel(AutomationStatus::default());
        let automation = Arc::new(automation_tx);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (reconcile_tx, reconcile_rx) = mpsc::channel(1);

        self.handle
            .register(
                arena.clone(),
                ArenaChannels {
                    view: view_rx,
                    automation: Arc::clone(&automation),
                },
            )
            .await;

        let scheduler = Scheduler::new(
            arena.clone(),
            Arc::clone(&self.deps.gateway),
            self.deps.queue.clone(),
            automation_rx,
            self.deps.bus.clone(),
            Arc::clone(&self.deps.metrics),
            self.config.scheduler_interval,
            shutdown_rx.clone(),
        );

        let orchestrator = BattleOrchestrator::new(
            arena.clone(),
            self.deps.clone(),
            OrchestratorConfig {
                confirmation_timeout: self.config.confirmation_timeout,
                round_timeout: self.config.round_timeout,
                max_rounds: self.config.max_rounds,
                trust_inference_signatures: self.config.trust_inference_signatures,
            },
            automation,
            reconcile_tx,
            shutdown_rx.clone(),
        );

        let reconciler = StateReconciler::new(
            arena.clone(),
            Arc::clone(&self.deps.gateway),
            view_tx,
            self.deps.bus.clone(),
            reconcile_rx,
            ReconcilerConfig {
                sweep_interval: self.config.reconcile_interval,
                event_interval: self.config.scheduler_interval,
                max_rounds: self.config.max_rounds,
            },
            shutdown_rx,
        );

        let mut tasks = vec![
            tokio::spawn(orchestrator.run()),
            tokio::spawn(reconciler.run()),
        ];
        if self.config.automation {
            tasks.push(tokio::spawn(scheduler.run()));
        }

        info!(%arena, state = %snapshot.state(), "watching arena");
        self.workers.insert(
            arena,
            ArenaWorkers {
                shutdown: shutdown_tx,
                tasks,
            },
        );
        Ok(())
    }

    /// Stops the arena's workers and drops its queue slot.
    pub async fn unwatch_arena(&mut self, arena: &ArenaId) -> Result<()> {
        let workers = self
            .workers
            .remove(arena)
            .ok_or_else(|| RuntimeError::ArenaNotWatched(arena.clone()))?;

        self.handle.unregister(arena).await;
        let _ = workers.shutdown.send(true);
        for task in workers.tasks {
            task.await.map_err(RuntimeError::WorkerJoin)?;
        }
        self.deps.queue.remove(arena);

        info!(%arena, "stopped watching arena");
        Ok(())
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(mut self) -> Result<()> {
        let arenas: Vec<_> = self.workers.keys().cloned().collect();
        for arena in arenas {
            self.unwatch_arena(&arena).await?;
        }
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    gateway: Option<Arc<dyn ChainGateway>>,
    provider: Option<Arc<dyn MoveProvider>>,
    authorizer: Option<MoveAuthorizer>,
    metadata: Option<Arc<dyn WarriorMetadataSource>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            gateway: None,
            provider: None,
            authorizer: None,
            metadata: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the ledger gateway (required)
    pub fn gateway(mut self, gateway: Arc<dyn ChainGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the inference collaborator (required)
    pub fn move_provider(mut self, provider: impl MoveProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set the move authority (required)
    pub fn authorizer(mut self, authorizer: MoveAuthorizer) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// Set the warrior metadata source (optional, defaults to none)
    pub fn metadata(mut self, metadata: impl WarriorMetadataSource + 'static) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let gateway = self
            .gateway
            .ok_or_else(|| RuntimeError::Configuration("ledger gateway not set".into()))?;
        let provider = self
            .provider
            .ok_or_else(|| RuntimeError::Configuration("move provider not set".into()))?;
        let authorizer = self
            .authorizer
            .ok_or_else(|| RuntimeError::Configuration("move authorizer not set".into()))?;
        if self.config.max_rounds == 0 {
            return Err(RuntimeError::Configuration(
                "max_rounds must be at least 1".into(),
            ));
        }

        let metadata = self.metadata.unwrap_or_else(|| Arc::new(NoMetadata));
        let names = Arc::new(MoveNameCache::new(metadata));
        let adapter = Arc::new(MoveAdapter::new(
            provider,
            Arc::clone(&names),
            self.config.inference_timeout,
        ));

        let queue = CommandQueue::new();
        let bus = EventBus::with_capacity(self.config.event_buffer_size);
        let metrics = Arc::new(RoundMetrics::new());

        let handle = RuntimeHandle::new(
            queue.clone(),
            Arc::clone(&gateway),
            bus.clone(),
            Arc::clone(&metrics),
            self.config.confirmation_timeout,
        );

        info!(
            ledger = gateway.name(),
            network = gateway.network(),
            authority = %authorizer.address(),
            "runtime ready"
        );

        Ok(Runtime {
            handle,
            config: self.config,
            deps: OrchestratorDeps {
                gateway,
                adapter,
                authorizer: Arc::new(authorizer),
                names,
                queue,
                bus,
                metrics,
            },
            workers: HashMap::new(),
        })
    }
}
