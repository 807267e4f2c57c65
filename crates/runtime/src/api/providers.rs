//! Asynchronous collaborators the board depends on.
//!
//! The runtime never talks to a network itself. Clients plug in
//! implementations of these traits: the REST backend in production, or
//! [`InMemoryBackend`](crate::InMemoryBackend) for tests and offline play.
use async_trait::async_trait;
use board_core::{CraftedItem, InventoryItem, ItemId};

use super::errors::BackendError;

/// Source of the player's inventory.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetches the inventory, filtered by `search` (empty for everything).
    async fn fetch_inventory(&self, search: &str) -> Result<Vec<InventoryItem>, BackendError>;
}

/// Authority that decides what two items combine into.
#[async_trait]
pub trait MergeApi: Send + Sync {
    /// Merges `dropped` into `target` by item type (not instance).
    async fn merge(&self, target: &ItemId, dropped: &ItemId) -> Result<CraftedItem, BackendError>;
}

/// Both collaborators behind one object.
pub trait Backend: InventorySource + MergeApi {}

impl<T> Backend for T where T: InventorySource + MergeApi {}
