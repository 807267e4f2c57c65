//! Trait describing a runnable client front-end.
use anyhow::Result;
use async_trait::async_trait;
use board_runtime::RuntimeHandle;

/// Frontend abstraction for UI layers.
///
/// Frontends talk to the board through a [`RuntimeHandle`]: they subscribe
/// to board, merge and inventory events, feed drag gestures through a
/// [`DragInteractionAdapter`](crate::DragInteractionAdapter) and query
/// snapshots to render. They never own the runtime.
#[async_trait]
pub trait Frontend: Send {
    /// Run the frontend until the user quits.
    async fn run(&mut self, handle: RuntimeHandle) -> Result<()>;
}
