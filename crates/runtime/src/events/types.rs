//! Event types for different topics.

use board_core::{AttemptId, BoardToken, InstanceId, MergeAttempt, Position};
use serde::{Deserialize, Serialize};

/// Changes to the set of tokens on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    TokenPlaced { token: BoardToken },

    TokenMoved {
        instance: InstanceId,
        position: Position,
    },

    TokenRemoved { instance: InstanceId },

    /// The highlight of a freshly crafted token ended.
    TokenSettled { instance: InstanceId },

    /// Board cleared; pending attempts were discarded without backend calls.
    BoardReset { discarded: Vec<AttemptId> },
}

/// Merge attempt lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeEvent {
    /// Dropped token hidden and RPC issued.
    MergeStarted { attempt: MergeAttempt },

    /// Sources replaced by the crafted token.
    MergeResolved {
        attempt: AttemptId,
        target: InstanceId,
        dropped: Option<InstanceId>,
        token: BoardToken,
    },

    /// RPC failed; sources were restored.
    MergeFailed {
        attempt: AttemptId,
        restored: Vec<InstanceId>,
        /// Dropped token sent back to the inventory instead of restored.
        returned: Option<InstanceId>,
        error: String,
    },
}

/// Inventory refetch results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    InventoryRefreshed {
        generation: u64,
        search: String,
        /// Entries now listed in the tray.
        items: usize,
    },

    InventoryRefreshFailed { generation: u64, error: String },
}
