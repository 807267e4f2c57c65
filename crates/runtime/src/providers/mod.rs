//! Backend implementations bundled with the runtime.

pub mod memory;

pub use memory::InMemoryBackend;
