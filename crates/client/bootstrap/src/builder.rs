//! Builds the runtime and ledger gateway used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use client_blockchain_core::ChainGateway;
use client_blockchain_evm::EvmGateway;
use runtime::{
    FixedMoveProvider, HttpMoveProvider, JsonMetadataSource, MoveAuthorizer, NoMetadata, Runtime,
};

use crate::config::ArenaConfig;

/// Builder that assembles the ledger gateway, inference client, authority and
/// runtime from an [`ArenaConfig`].
pub struct RuntimeBuilder {
    config: ArenaConfig,
    gateway: Option<Arc<dyn ChainGateway>>,
    require_inference: bool,
    automation: bool,
}

impl RuntimeBuilder {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config,
            gateway: None,
            require_inference: true,
            automation: true,
        }
    }

    /// Provide a custom gateway instead of connecting over JSON-RPC.
    pub fn gateway(mut self, gateway: Arc<dyn ChainGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Whether a missing `INFERENCE_URL` is an error (default: true).
    ///
    /// Commands that never run a round can skip it; any round they do reach
    /// aborts with an unrecognized response.
    pub fn require_inference(mut self, required: bool) -> Self {
        self.require_inference = required;
        self
    }

    /// Whether watched arenas get a scheduler (default: true).
    pub fn automation(mut self, enabled: bool) -> Self {
        self.automation = enabled;
        self
    }

    pub async fn build(self) -> Result<RuntimeSetup> {
        let config = self.config;

        let gateway: Arc<dyn ChainGateway> = match self.gateway {
            Some(gateway) => gateway,
            None => {
                let evm = EvmGateway::new(config.ledger.clone())
                    .context("Failed to create ledger gateway")?;
                evm.verify_chain()
                    .await
                    .context("Ledger chain id check failed")?;
                Arc::new(evm)
            }
        };

        let authorizer = MoveAuthorizer::from_hex(&config.authority_key)
            .context("Invalid GAME_MASTER_PRIVATE_KEY")?;

        let mut runtime_config = config.runtime.clone();
        runtime_config.automation = self.automation;
        let builder = Runtime::builder()
            .config(runtime_config)
            .gateway(Arc::clone(&gateway))
            .authorizer(authorizer);

        let builder = match (&config.inference_url, self.require_inference) {
            (Some(url), _) => {
                let mut provider =
                    HttpMoveProvider::new(url.clone()).context("Invalid INFERENCE_URL")?;
                if let Some(key) = &config.inference_api_key {
                    provider = provider.with_api_key(key.clone());
                }
                builder.move_provider(provider)
            }
            (None, true) => bail!("INFERENCE_URL is required"),
            (None, false) => {
                tracing::debug!("no inference endpoint configured, rounds will abort");
                builder.move_provider(FixedMoveProvider::new(serde_json::Value::Null))
            }
        };

        let builder = match &config.metadata_path {
            Some(path) => builder.metadata(
                JsonMetadataSource::from_path(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
            ),
            None => builder.metadata(NoMetadata),
        };

        let runtime = builder.build().await?;
        tracing::info!(
            ledger = gateway.name(),
            network = gateway.network(),
            automation = self.automation,
            "runtime assembled"
        );

        Ok(RuntimeSetup {
            config,
            gateway,
            runtime,
        })
    }
}

pub struct RuntimeSetup {
    pub config: ArenaConfig,
    pub gateway: Arc<dyn ChainGateway>,
    pub runtime: Runtime,
}
