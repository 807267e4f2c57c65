//! Placed tokens and their identities.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::geometry::Position;
use crate::inventory::{InventoryItem, ItemId};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Identity of one placement, distinct from the item type it shows.
///
/// Never reused within a process: ids combine the source item, the
/// placement timestamp and a process-wide monotonic counter, so two drops of
/// the same item inside one millisecond still differ.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct InstanceId(String);

impl InstanceId {
    /// Allocates a fresh id for a token showing `item`, placed at `now_ms`.
    pub fn generate(item: &ItemId, now_ms: u64) -> Self {
        let sequence = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{item}-{now_ms}-{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

bitflags! {
    /// Transient presentation state of a token.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TokenFlags: u8 {
        /// A merge involving this token is in flight.
        const HIDDEN = 1 << 0;
        /// Created by a merge; cleared after the settle delay.
        const NEW = 1 << 1;
        /// Still inside the drag gesture that started in the inventory tray.
        const FROM_INVENTORY = 1 << 2;
    }
}

/// One placed, draggable instance on the crafting board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardToken {
    pub instance: InstanceId,
    /// Inventory item type this token represents (lookup only, never owned).
    pub original_id: ItemId,
    pub title: String,
    pub emoji: String,
    pub position: Position,
    pub flags: TokenFlags,
}

impl BoardToken {
    /// Creates a token for `item`, copying its display fields.
    pub fn from_item(instance: InstanceId, item: &InventoryItem, position: Position) -> Self {
        Self {
            instance,
            original_id: item.id.clone(),
            title: item.handle.clone(),
            emoji: item.emoji.clone(),
            position,
            flags: TokenFlags::empty(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(TokenFlags::HIDDEN)
    }

    pub fn is_new(&self) -> bool {
        self.flags.contains(TokenFlags::NEW)
    }

    pub fn is_from_inventory(&self) -> bool {
        self.flags.contains(TokenFlags::FROM_INVENTORY)
    }

    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags = flags;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn rapid_generation_never_collides() {
        let item = ItemId::from("wood");
        let ids: HashSet<_> = (0..1_000).map(|_| InstanceId::generate(&item, 42)).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn ids_carry_their_source_item() {
        let id = InstanceId::generate(&ItemId::from(10_u64), 7);
        assert!(id.as_str().starts_with("10-7-"));
    }
}
