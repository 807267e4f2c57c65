use std::fmt;

use crate::geometry::Position;
use crate::inventory::{InventoryItem, ItemId};
use crate::state::{BoardToken, InstanceId};

/// Monotonic identity of one merge attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergePhase {
    Idle,
    Validating,
    Pending,
    Resolved,
    Failed,
}

impl MergePhase {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// What was dropped onto the target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergeSource {
    /// A token already on the board.
    Token(InstanceId),
    /// An item dragged straight out of the inventory tray.
    Inventory(ItemId),
}

/// Item produced by a successful merge RPC.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CraftedItem {
    pub id: ItemId,
    pub handle: String,
    pub emoji: String,
}

impl CraftedItem {
    pub fn new(id: impl Into<ItemId>, handle: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
            emoji: emoji.into(),
        }
    }

    /// Inventory entry for a crafted item the backend has not listed yet.
    pub fn provisional_item(&self) -> InventoryItem {
        InventoryItem::new(self.id.clone(), self.handle.clone(), self.emoji.clone()).with_amount(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeAttempt {
    pub id: AttemptId,
    pub phase: MergePhase,
    pub target: InstanceId,
    /// Item type of the target at the time of the drop.
    pub target_item: ItemId,
    pub dropped: MergeSource,
    pub dropped_item: ItemId,
    /// Target position at drop time, used if the target vanishes meanwhile.
    pub anchor: Position,
}

impl MergeAttempt {
    /// Instance hidden by this attempt, if the drop came from the board.
    pub fn dropped_instance(&self) -> Option<&InstanceId> {
        match &self.dropped {
            MergeSource::Token(instance) => Some(instance),
            MergeSource::Inventory(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMerge {
    pub attempt: MergeAttempt,
    /// The crafted token now on the board.
    pub token: BoardToken,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedMerge {
    pub attempt: MergeAttempt,
    /// Instances made visible again.
    pub restored: Vec<InstanceId>,
    /// Dropped instance removed because its unit was used elsewhere.
    pub returned: Option<InstanceId>,
}
