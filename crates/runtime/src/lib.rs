//! Runtime orchestration for the merge board.
//!
//! This crate wires the deterministic [`board_core::BoardSession`] to its
//! asynchronous collaborators (inventory source, merge RPC) through a single
//! worker task. Consumers embed [`Runtime`] to drive the board and subscribe
//! to events through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`providers`] bundles an in-memory backend for tests and offline play
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod providers;
pub mod runtime;

mod workers;

pub use api::{
    Backend, BackendError, InventorySource, MergeApi, MergeOutcome, PlaceOutcome, Result,
    RuntimeError, RuntimeHandle,
};
pub use events::{BoardEvent, Event, EventBus, InventoryEvent, MergeEvent, Topic};
pub use providers::InMemoryBackend;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
