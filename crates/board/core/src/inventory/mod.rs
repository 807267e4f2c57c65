//! Inventory snapshot as last reported by the backend.
//!
//! Amounts here are authoritative server-side state. The board never
//! decrements them; it only tracks how many units are currently in use via
//! [`InventoryLedger`].
mod ledger;

use std::collections::HashMap;
use std::fmt;

pub use ledger::{Availability, InventoryLedger};

/// Stable identity of an element type.
///
/// Backends hand out both numeric and textual ids, so the canonical form is
/// the decimal/text rendering.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One distinct element type owned by the player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryItem {
    pub id: ItemId,
    /// Display name.
    pub handle: String,
    /// Display glyph or image URL.
    pub emoji: String,
    /// Total units owned.
    pub amount: u32,
    /// Basic elements are unlimited and never deducted.
    pub is_basic: bool,
}

impl InventoryItem {
    pub fn new(id: impl Into<ItemId>, handle: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
            emoji: emoji.into(),
            amount: 0,
            is_basic: false,
        }
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    pub fn basic(mut self) -> Self {
        self.is_basic = true;
        self
    }
}

/// Ordered inventory listing with O(1) lookup by [`ItemId`].
///
/// Order follows the backend response so the tray renders consistently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    items: Vec<InventoryItem>,
    index: HashMap<ItemId, usize>,
}

impl InventorySnapshot {
    /// Builds a snapshot; a later duplicate id replaces the earlier entry.
    pub fn new(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let mut snapshot = Self::default();
        for item in items {
            snapshot.upsert(item);
        }
        snapshot
    }

    pub fn get(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.index.get(id).map(|&slot| &self.items[slot])
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records a freshly crafted item type the backend has not listed yet.
    ///
    /// Returns false if the snapshot already knows the item. The next
    /// refetch replaces the whole snapshot, provisional entries included.
    pub fn insert_provisional(&mut self, item: InventoryItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.upsert(item);
        true
    }

    fn upsert(&mut self, item: InventoryItem) {
        match self.index.get(&item.id) {
            Some(&slot) => self.items[slot] = item,
            None => {
                self.index.insert(item.id.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }
}

impl FromIterator<InventoryItem> for InventorySnapshot {
    fn from_iter<T: IntoIterator<Item = InventoryItem>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_ids_share_a_form() {
        assert_eq!(ItemId::from(10_u64), ItemId::from("10"));
        assert_eq!(ItemId::from("wood").to_string(), "wood");
    }

    #[test]
    fn snapshot_keeps_order_and_replaces_duplicates() {
        let snapshot = InventorySnapshot::new([
            InventoryItem::new("fire", "Fire", "🔥").basic(),
            InventoryItem::new("wood", "Wood", "🪵").with_amount(1),
            InventoryItem::new("wood", "Wood", "🪵").with_amount(3),
        ]);

        let ids: Vec<_> = snapshot.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, ["fire", "wood"]);
        assert_eq!(snapshot.get(&ItemId::from("wood")).map(|i| i.amount), Some(3));
    }

    #[test]
    fn provisional_insert_never_overrides() {
        let mut snapshot =
            InventorySnapshot::new([InventoryItem::new("wood", "Wood", "🪵").with_amount(2)]);

        let duplicate = InventoryItem::new("wood", "Wood", "🪵").with_amount(1);
        assert!(!snapshot.insert_provisional(duplicate));
        assert_eq!(snapshot.get(&ItemId::from("wood")).map(|i| i.amount), Some(2));

        let golem = InventoryItem::new("golem", "Golem", "🗿").with_amount(1);
        assert!(snapshot.insert_provisional(golem));
        assert_eq!(snapshot.len(), 2);
    }
}
