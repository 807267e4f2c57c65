//! In-process backend for tests and offline play.
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use board_core::{CraftedItem, InventoryItem, ItemId};
use tokio::sync::Semaphore;

use crate::api::{BackendError, InventorySource, MergeApi};

/// Backend simulated in memory.
///
/// Recipes are order-insensitive. A successful merge consumes one unit of
/// each non-basic input and credits one unit of the result, so refetches see
/// the same bookkeeping a server would report. Failures can be scripted and
/// merges can be held open with [`InMemoryBackend::gated`].
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
    gate: Option<Arc<Semaphore>>,
}

#[derive(Default)]
struct State {
    inventory: Vec<InventoryItem>,
    recipes: HashMap<(ItemId, ItemId), CraftedItem>,
    merge_failures: VecDeque<BackendError>,
    inventory_failures: VecDeque<BackendError>,
    merge_calls: Vec<(ItemId, ItemId)>,
    inventory_calls: Vec<String>,
}

impl InMemoryBackend {
    pub fn new(inventory: impl IntoIterator<Item = InventoryItem>) -> Self {
        let backend = Self::default();
        backend.lock().inventory = inventory.into_iter().collect();
        backend
    }

    /// Like [`new`](Self::new), but every merge waits for a
    /// [`release_merges`](Self::release_merges) permit before answering.
    pub fn gated(inventory: impl IntoIterator<Item = InventoryItem>) -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new(inventory)
        }
    }

    pub fn with_recipe(
        self,
        first: impl Into<ItemId>,
        second: impl Into<ItemId>,
        result: CraftedItem,
    ) -> Self {
        self.add_recipe(first, second, result);
        self
    }

    pub fn add_recipe(
        &self,
        first: impl Into<ItemId>,
        second: impl Into<ItemId>,
        result: CraftedItem,
    ) {
        let (first, second) = (first.into(), second.into());
        let mut state = self.lock();
        state
            .recipes
            .insert((second.clone(), first.clone()), result.clone());
        state.recipes.insert((first, second), result);
    }

    /// The next merge call fails with `error`.
    pub fn fail_next_merge(&self, error: BackendError) {
        self.lock().merge_failures.push_back(error);
    }

    /// The next inventory fetch fails with `error`.
    pub fn fail_next_fetch(&self, error: BackendError) {
        self.lock().inventory_failures.push_back(error);
    }

    /// Lets `count` held merges answer.
    pub fn release_merges(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Merge calls received so far, as `(target, dropped)`.
    pub fn merge_calls(&self) -> Vec<(ItemId, ItemId)> {
        self.lock().merge_calls.clone()
    }

    /// Search strings of the inventory fetches received so far.
    pub fn inventory_calls(&self) -> Vec<String> {
        self.lock().inventory_calls.clone()
    }

    pub fn inventory(&self) -> Vec<InventoryItem> {
        self.lock().inventory.clone()
    }

    pub fn set_inventory(&self, inventory: impl IntoIterator<Item = InventoryItem>) {
        self.lock().inventory = inventory.into_iter().collect();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn consume(&mut self, id: &ItemId) {
        if let Some(item) = self.inventory.iter_mut().find(|item| &item.id == id)
            && !item.is_basic
        {
            item.amount = item.amount.saturating_sub(1);
        }
    }

    fn credit(&mut self, crafted: &CraftedItem) {
        match self.inventory.iter_mut().find(|item| item.id == crafted.id) {
            Some(item) => item.amount = item.amount.saturating_add(1),
            None => self.inventory.push(crafted.provisional_item()),
        }
    }
}

#[async_trait]
impl InventorySource for InMemoryBackend {
    async fn fetch_inventory(&self, search: &str) -> Result<Vec<InventoryItem>, BackendError> {
        let mut state = self.lock();
        state.inventory_calls.push(search.to_owned());
        if let Some(error) = state.inventory_failures.pop_front() {
            return Err(error);
        }

        let needle = search.trim().to_lowercase();
        Ok(state
            .inventory
            .iter()
            .filter(|item| needle.is_empty() || item.handle.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MergeApi for InMemoryBackend {
    async fn merge(&self, target: &ItemId, dropped: &ItemId) -> Result<CraftedItem, BackendError> {
        self.lock()
            .merge_calls
            .push((target.clone(), dropped.clone()));

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| BackendError::network("merge gate closed"))?
                .forget();
        }

        let mut state = self.lock();
        if let Some(error) = state.merge_failures.pop_front() {
            return Err(error);
        }

        let crafted = state
            .recipes
            .get(&(target.clone(), dropped.clone()))
            .cloned()
            .ok_or_else(|| {
                BackendError::rejected(422, format!("{target} and {dropped} do not combine"))
            })?;
        state.consume(target);
        state.consume(dropped);
        state.credit(&crafted);
        Ok(crafted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new([
            InventoryItem::new("10", "Mud", "🟫").with_amount(2),
            InventoryItem::new("20", "Rock", "🪨").with_amount(1),
            InventoryItem::new("fire", "Fire", "🔥").basic(),
        ])
        .with_recipe("20", "10", CraftedItem::new("99", "Stone Golem", "🗿"))
    }

    #[tokio::test]
    async fn recipes_are_order_insensitive_and_update_amounts() {
        let backend = backend();

        let crafted = backend
            .merge(&ItemId::from("10"), &ItemId::from("20"))
            .await
            .unwrap();
        assert_eq!(crafted.handle, "Stone Golem");

        let inventory = backend.fetch_inventory("").await.unwrap();
        let amount = |id: &str| {
            inventory
                .iter()
                .find(|item| item.id.as_str() == id)
                .map(|item| item.amount)
        };
        assert_eq!(amount("10"), Some(1));
        assert_eq!(amount("20"), Some(0));
        assert_eq!(amount("99"), Some(1));
    }

    #[tokio::test]
    async fn unknown_combinations_are_rejected() {
        let backend = backend();
        let error = backend
            .merge(&ItemId::from("fire"), &ItemId::from("10"))
            .await
            .unwrap_err();
        assert!(matches!(error, BackendError::Rejected { status: 422, .. }));
        assert_eq!(backend.merge_calls().len(), 1);
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let backend = backend();
        backend.fail_next_fetch(BackendError::network("offline"));

        assert!(backend.fetch_inventory("").await.is_err());
        assert_eq!(backend.fetch_inventory("ro").await.unwrap().len(), 1);
        assert_eq!(backend.inventory_calls(), ["", "ro"]);
    }
}
