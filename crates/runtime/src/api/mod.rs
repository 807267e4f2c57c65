//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration and workers.

pub mod errors;
pub mod handle;
pub mod providers;

pub use errors::{BackendError, Result, RuntimeError};
pub use handle::{MergeOutcome, PlaceOutcome, RuntimeHandle};
pub use providers::{Backend, InventorySource, MergeApi};
