//! Worker tasks that back the runtime orchestration.
//!
//! The board worker is the single owner of board state; everything else
//! reaches it through its command queue.

mod board;

pub use board::{BoardWorker, Command, WorkerSettings};
