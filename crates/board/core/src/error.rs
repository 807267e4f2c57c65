//! Guard outcomes for board gestures.
//!
//! A [`Rejection`] is the routine answer to a gesture that must not take
//! effect: the token snaps back and nothing else happens. It is not an
//! exceptional condition, so callers log it at debug level and move on.
//! Failures of the merge RPC itself are reported separately by the runtime.

use crate::inventory::ItemId;
use crate::state::InstanceId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rejection {
    /// Placing or merging would use more units than the player owns.
    #[error("no units of {item} left to use")]
    ItemUnavailable { item: ItemId },

    /// The item is not part of the current inventory snapshot.
    #[error("item {item} is not in the inventory")]
    UnknownItem { item: ItemId },

    #[error("merge target {instance} is no longer on the board")]
    TargetMissing { instance: InstanceId },

    /// The target is hidden because another merge consumes it.
    #[error("merge target {instance} is hidden")]
    TargetHidden { instance: InstanceId },

    /// A merge anchored on this target is still in flight.
    #[error("merge target {instance} already has a pending merge")]
    TargetLocked { instance: InstanceId },

    #[error("a token cannot be merged with itself")]
    SelfDrop,

    #[error("dropped token {instance} is no longer on the board")]
    DroppedMissing { instance: InstanceId },

    /// The dropped token already takes part in a pending merge.
    #[error("dropped token {instance} is part of a pending merge")]
    DroppedBusy { instance: InstanceId },
}

impl Rejection {
    /// Stable snake_case label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// True for inventory-accounting guards (as opposed to stale or
    /// conflicting references).
    pub const fn is_availability(&self) -> bool {
        matches!(self, Self::ItemUnavailable { .. } | Self::UnknownItem { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_snake_case() {
        let rejection = Rejection::TargetLocked {
            instance: InstanceId::from("wood-1-1"),
        };
        assert_eq!(rejection.as_str(), "target_locked");
        assert!(!rejection.is_availability());

        let rejection = Rejection::ItemUnavailable {
            item: ItemId::from("wood"),
        };
        assert_eq!(rejection.as_str(), "item_unavailable");
        assert!(rejection.is_availability());
    }
}
