//! Gesture vocabulary shared by drag layers and the adapter.
use board_core::{
    AttemptId, BoardToken, Delta, InstanceId, InventoryItem, ItemId, MergeSource, Position,
    Rejection,
};

use super::pointer::ClientPoint;

/// Where a drag gesture started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragSource {
    /// Dragged out of the inventory tray.
    Inventory(InventoryItem),
    /// A token already on the board, with its position at drag start.
    Board {
        instance: InstanceId,
        origin: Position,
    },
}

impl DragSource {
    pub fn from_token(token: &BoardToken) -> Self {
        Self::Board {
            instance: token.instance.clone(),
            origin: token.position,
        }
    }
}

/// What the pointer is over, as reported by the drag layer's hit-testing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// Empty board area.
    Board,
    /// Another token's droppable region.
    Token(InstanceId),
    /// Nothing actionable.
    Outside,
}

/// Drag-end payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragEnd {
    pub over: DropTarget,
    /// Pointer travel since drag start.
    pub delta: Delta,
    /// Release point, if the drag layer reports one.
    pub client_offset: Option<ClientPoint>,
}

impl DragEnd {
    pub fn new(over: DropTarget, delta: Delta) -> Self {
        Self {
            over,
            delta,
            client_offset: None,
        }
    }

    pub fn at(mut self, point: ClientPoint) -> Self {
        self.client_offset = Some(point);
        self
    }
}

/// Board operation a finished gesture maps to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardIntent {
    Place { item: ItemId, position: Position },
    Move { instance: InstanceId, position: Position },
    Merge { target: InstanceId, dropped: MergeSource },
    SnapBack,
}

/// What happened to a dispatched gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    Placed(BoardToken),
    /// Final (clamped) position of a repositioned token.
    Moved(Position),
    MergePending(AttemptId),
    /// Guard refused the gesture; the token snaps back.
    Rejected(Rejection),
    /// Nothing to do, or the token no longer exists.
    SnappedBack,
}
