//! Cross-frontend primitives for presenting the merge board.
//!
//! Houses the drag interaction adapter, the toast log and event handling
//! that terminal and graphical clients can reuse.
pub mod config;
pub mod drag;
pub mod event;
pub mod frontend;
pub mod message;

pub use config::{FrontendConfig, MessageConfig};
pub use drag::{
    BoardIntent, ClientPoint, DragEnd, DragInteractionAdapter, DragSource, DropOutcome,
    DropTarget, PointerSample, PointerTracker,
};
pub use event::{EventConsumer, EventImpact, ToastConsumer};
pub use frontend::Frontend;
pub use message::{MessageEntry, MessageLevel, MessageLog};
