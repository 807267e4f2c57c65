//! Builds the runtime and config bundle used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};
use board_runtime::Runtime;
use tracing::info;

use crate::backends::{BackendFactory, DemoBackendFactory, RestBackendFactory};
use crate::config::BootstrapConfig;

/// Builder that assembles the runtime, backend and configuration for clients.
pub struct RuntimeBuilder {
    config: BootstrapConfig,
    backend_factory: Arc<dyn BackendFactory>,
}

impl RuntimeBuilder {
    /// Uses the REST backend when a URL is configured, the demo backend
    /// otherwise.
    pub fn new(config: BootstrapConfig) -> Self {
        let backend_factory: Arc<dyn BackendFactory> =
            match RestBackendFactory::from_bootstrap(&config) {
                Some(rest) => Arc::new(rest),
                None => Arc::new(DemoBackendFactory),
            };
        Self {
            config,
            backend_factory,
        }
    }

    /// Provide a custom backend factory.
    pub fn backend_factory(mut self, factory: impl BackendFactory + 'static) -> Self {
        self.backend_factory = Arc::new(factory);
        self
    }

    /// Must be called inside a tokio runtime; the board worker is spawned here.
    pub async fn build(self) -> Result<RuntimeSetup> {
        let backend = self.backend_factory.build()?;
        let backend_label = self.backend_factory.describe();

        let runtime = Runtime::builder()
            .config(self.config.runtime.clone())
            .shared_backend(backend)
            .build()
            .context("failed to start board runtime")?;

        info!(backend = %backend_label, session = ?self.config.session_id, "board runtime ready");

        Ok(RuntimeSetup {
            config: self.config,
            backend_label,
            runtime,
        })
    }
}

pub struct RuntimeSetup {
    pub config: BootstrapConfig,
    pub backend_label: String,
    pub runtime: Runtime,
}
