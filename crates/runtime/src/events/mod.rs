//! Topic-based event bus for runtime events.
//!
//! Board mutations, merge lifecycle and inventory refetches are published to
//! separate topics so consumers subscribe only to what they render.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{BoardEvent, InventoryEvent, MergeEvent};
