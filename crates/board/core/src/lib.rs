//! Deterministic merge-board logic shared by the runtime and clients.
//!
//! `board-core` owns the inventory ledger, the crafting board and the merge
//! state machine. Nothing in here performs I/O or reads the clock: callers
//! pass timestamps in and drive asynchronous work (merge RPCs, inventory
//! refetches) from the outside. All board mutation flows through
//! [`BoardSession`], and supporting crates depend on the types re-exported
//! here.
pub mod config;
pub mod error;
pub mod geometry;
pub mod inventory;
pub mod merge;
pub mod session;
pub mod state;

pub use config::{BoardConfig, ConfigError, TokenMetrics};
pub use error::Rejection;
pub use geometry::{Delta, Position, Size, clamp_position};
pub use inventory::{Availability, InventoryItem, InventoryLedger, InventorySnapshot, ItemId};
pub use merge::{
    AttemptId, CraftedItem, FailedMerge, MergeAttempt, MergeCoordinator, MergePhase, MergeSource,
    ResolvedMerge,
};
pub use session::{BoardSession, BoardSnapshot, TrayEntry};
pub use state::{BoardState, BoardToken, InstanceId, TokenFlags};
