//! Helpers for constructing the backend consumed by the runtime.
use std::sync::Arc;

use anyhow::{Context, Result};
use board_core::{CraftedItem, InventoryItem};
use board_runtime::{Backend, InMemoryBackend};
use client_backend_rest::{RestBackend, RestConfig};

use crate::config::BootstrapConfig;

pub trait BackendFactory: Send + Sync {
    fn build(&self) -> Result<Arc<dyn Backend>>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Backend talking to the game's REST API.
#[derive(Clone, Debug)]
pub struct RestBackendFactory {
    config: RestConfig,
}

impl RestBackendFactory {
    pub fn new(config: RestConfig) -> Self {
        Self { config }
    }

    /// Returns `None` when no backend URL is configured.
    pub fn from_bootstrap(config: &BootstrapConfig) -> Option<Self> {
        let url = config.backend_url.as_ref()?;
        let mut rest = RestConfig::new(url.as_str()).with_timeout(config.request_timeout);
        if let Some(token) = &config.auth_token {
            rest = rest.with_auth_token(token.as_str());
        }
        if let Some(session) = &config.session_id {
            rest = rest.with_session_id(session.as_str());
        }
        Some(Self::new(rest))
    }
}

impl BackendFactory for RestBackendFactory {
    fn build(&self) -> Result<Arc<dyn Backend>> {
        let backend = RestBackend::new(self.config.clone()).with_context(|| {
            format!("failed to create REST backend for {}", self.config.base_url)
        })?;
        Ok(Arc::new(backend))
    }

    fn describe(&self) -> String {
        format!("rest ({})", self.config.base_url)
    }
}

/// Offline backend with a small element table and recipe book.
#[derive(Clone, Debug, Default)]
pub struct DemoBackendFactory;

impl DemoBackendFactory {
    pub fn backend() -> InMemoryBackend {
        InMemoryBackend::new([
            InventoryItem::new("fire", "Fire", "🔥").basic(),
            InventoryItem::new("water", "Water", "💧").basic(),
            InventoryItem::new("earth", "Earth", "🌍").basic(),
            InventoryItem::new("air", "Air", "💨").basic(),
            InventoryItem::new("mud", "Mud", "🟫").with_amount(2),
            InventoryItem::new("stone", "Stone", "🪨").with_amount(1),
        ])
        .with_recipe("water", "earth", CraftedItem::new("mud", "Mud", "🟫"))
        .with_recipe("fire", "earth", CraftedItem::new("lava", "Lava", "🌋"))
        .with_recipe("lava", "water", CraftedItem::new("stone", "Stone", "🪨"))
        .with_recipe("fire", "water", CraftedItem::new("steam", "Steam", "♨️"))
        .with_recipe("mud", "stone", CraftedItem::new("golem", "Golem", "🗿"))
    }
}

impl BackendFactory for DemoBackendFactory {
    fn build(&self) -> Result<Arc<dyn Backend>> {
        Ok(Arc::new(Self::backend()))
    }

    fn describe(&self) -> String {
        "in-memory demo".to_string()
    }
}
