//! High-level runtime orchestrator.
//!
//! The runtime owns the board worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the board.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use board_core::{BoardConfig, BoardSession, InventorySnapshot};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{Backend, Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{BoardWorker, Command, WorkerSettings};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub board: BoardConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Quiet period after the last search keystroke before refetching.
    pub search_debounce_ms: u64,
    /// Fetch the inventory as soon as the worker starts (default: true)
    pub fetch_on_start: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            search_debounce_ms: 300,
            fetch_on_start: true,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BOARD_WIDTH` / `BOARD_HEIGHT` - Droppable area in pixels (default: 360x480)
    /// - `BOARD_EDGE_PADDING` - Gap kept from the board edge (default: 10)
    /// - `BOARD_SETTLE_DELAY_MS` - Highlight duration of crafted tokens (default: 1000)
    /// - `BOARD_SEARCH_DEBOUNCE_MS` - Inventory search debounce (default: 300)
    /// - `BOARD_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    /// - `BOARD_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `BOARD_FETCH_ON_START` - Fetch inventory on start (default: true)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(width) = read_env::<i32>("BOARD_WIDTH") {
            config.board.width = width;
        }
        if let Some(height) = read_env::<i32>("BOARD_HEIGHT") {
            config.board.height = height;
        }
        if let Some(padding) = read_env::<i32>("BOARD_EDGE_PADDING") {
            config.board.edge_padding = padding;
        }
        if let Some(delay) = read_env::<u64>("BOARD_SETTLE_DELAY_MS") {
            config.board.settle_delay_ms = delay;
        }
        if let Some(debounce) = read_env::<u64>("BOARD_SEARCH_DEBOUNCE_MS") {
            config.search_debounce_ms = debounce;
        }
        if let Some(capacity) = read_env::<usize>("BOARD_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("BOARD_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(fetch) = read_env_bool("BOARD_FETCH_ON_START") {
            config.fetch_on_start = fetch;
        }

        config
    }

    fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            settle_delay: Duration::from_millis(self.board.settle_delay_ms),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            fetch_on_start: self.fetch_on_start,
        }
    }
}

/// Main runtime that hosts the board worker
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Waits for the worker to stop.
    ///
    /// The worker stops once every [`RuntimeHandle`] clone has been dropped,
    /// including those held by clients.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    inventory: Option<InventorySnapshot>,
    backend: Option<Arc<dyn Backend>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            inventory: None,
            backend: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the inventory used until the first fetch completes.
    pub fn inventory(mut self, inventory: InventorySnapshot) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Set the inventory source and merge RPC (required)
    pub fn backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Same as [`backend`](Self::backend) for an already shared backend.
    pub fn shared_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Build the runtime and start its worker.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let backend = self.backend.ok_or(RuntimeError::MissingBackend)?;
        self.config.board.validate()?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let session = BoardSession::with_inventory(
            self.config.board.clone(),
            self.inventory.unwrap_or_default(),
        );
        let worker = BoardWorker::new(
            session,
            backend,
            self.config.worker_settings(),
            command_rx,
            event_bus,
        );

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
