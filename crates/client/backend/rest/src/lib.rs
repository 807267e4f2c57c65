//! REST implementation of the inventory source and merge RPC.
//!
//! [`RestBackend`] plugs into [`board_runtime::RuntimeBuilder::backend`]:
//!
//! - `GET {base}/inventory?search=<text>` returns the player's items.
//! - `POST {base}/merge` with `{ "item1": <target>, "item2": <dropped> }`
//!   returns the crafted item `{ "id", "handle", "emoji" }`.
mod client;
mod config;
mod error;
mod types;

pub use client::RestBackend;
pub use config::RestConfig;
pub use error::RestError;
pub use types::{CraftedPayload, InventoryPayload, ItemPayload, MergeRequest, WireId, WireIds};
