//! Top-level client wiring the board runtime to a frontend.
//!
//! ```text
//! Client
//!   ├─→ Runtime (board worker, event bus, backend)
//!   └─→ Frontend (drag gestures, toasts, rendering via RuntimeHandle)
//! ```
mod builder;
pub mod demo;

pub use builder::ClientBuilder;
pub use client_frontend_core::Frontend;

use anyhow::{Context, Result};
use board_runtime::Runtime;

/// Owns the runtime and hands the frontend a handle to it.
pub struct Client {
    runtime: Runtime,
    frontend: Box<dyn Frontend>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Runs the frontend until it returns, then stops the board worker.
    pub async fn run(self) -> Result<()> {
        let handle = self.runtime.handle();

        let mut frontend = self.frontend;
        let frontend_result = frontend.run(handle).await;

        self.runtime
            .shutdown()
            .await
            .context("board worker did not stop cleanly")?;

        frontend_result
    }
}
