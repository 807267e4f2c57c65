//! Wire types for the merge backend.
//!
//! Item ids arrive as JSON numbers from some deployments and as strings from
//! others; both decode into the same [`ItemId`]. [`WireIds`] remembers the
//! form each id arrived in so merge requests echo it back unchanged.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use board_core::{CraftedItem, InventoryItem, ItemId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl From<WireId> for ItemId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(value) => ItemId::from(value),
            WireId::Text(value) => ItemId::from(value),
        }
    }
}

impl From<&ItemId> for WireId {
    /// Only canonical decimals become numbers; `"007"` stays text.
    fn from(id: &ItemId) -> Self {
        match id.as_str().parse::<u64>() {
            Ok(value) if value.to_string() == id.as_str() => WireId::Number(value),
            _ => WireId::Text(id.as_str().to_string()),
        }
    }
}

/// Wire forms of every id decoded so far, shared by clones of a backend.
#[derive(Clone, Debug, Default)]
pub struct WireIds {
    forms: Arc<Mutex<HashMap<ItemId, WireId>>>,
}

impl WireIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `wire` and records its form.
    pub fn remember(&self, wire: WireId) -> ItemId {
        let id = ItemId::from(wire.clone());
        self.lock().insert(id.clone(), wire);
        id
    }

    /// Form `id` arrived in, or the canonical form for ids never seen.
    pub fn form_of(&self, id: &ItemId) -> WireId {
        self.lock().get(id).cloned().unwrap_or_else(|| WireId::from(id))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ItemId, WireId>> {
        self.forms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One inventory row.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub id: WireId,
    pub handle: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub amount: u32,
    #[serde(default)]
    pub is_basic: bool,
}

impl ItemPayload {
    pub fn into_item(self, ids: &WireIds) -> InventoryItem {
        let item = InventoryItem::new(ids.remember(self.id), self.handle, self.emoji)
            .with_amount(self.amount);
        if self.is_basic { item.basic() } else { item }
    }
}

/// Inventory listing, either a bare array or wrapped in `{ "items": [...] }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum InventoryPayload {
    List(Vec<ItemPayload>),
    Wrapped { items: Vec<ItemPayload> },
}

impl InventoryPayload {
    pub fn into_items(self, ids: &WireIds) -> Vec<InventoryItem> {
        let rows = match self {
            InventoryPayload::List(rows) | InventoryPayload::Wrapped { items: rows } => rows,
        };
        rows.into_iter().map(|row| row.into_item(ids)).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeRequest {
    pub item1: WireId,
    pub item2: WireId,
}

impl MergeRequest {
    pub fn new(ids: &WireIds, target: &ItemId, dropped: &ItemId) -> Self {
        Self {
            item1: ids.form_of(target),
            item2: ids.form_of(dropped),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CraftedPayload {
    pub id: WireId,
    pub handle: String,
    #[serde(default)]
    pub emoji: String,
}

impl CraftedPayload {
    pub fn into_crafted(self, ids: &WireIds) -> CraftedItem {
        CraftedItem::new(ids.remember(self.id), self.handle, self.emoji)
    }
}
