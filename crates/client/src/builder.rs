//! Client builder with dependency injection pattern.
use anyhow::{Context, Result};
use board_runtime::Runtime;

use crate::{Client, Frontend};

/// Builder for constructing a [`Client`]. Runtime and frontend are both
/// required.
#[derive(Default)]
pub struct ClientBuilder {
    runtime: Option<Runtime>,
    frontend: Option<Box<dyn Frontend>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usually built by `client_bootstrap::RuntimeBuilder`.
    pub fn runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn frontend(mut self, frontend: impl Frontend + 'static) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    pub fn build(self) -> Result<Client> {
        let runtime = self
            .runtime
            .context("Runtime is required. Use .runtime() to set it.")?;

        let frontend = self
            .frontend
            .context("Frontend is required. Use .frontend() to set it.")?;

        Ok(Client { runtime, frontend })
    }
}
