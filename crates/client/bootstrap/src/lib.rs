//! Shared bootstrap utilities for client front-ends.
//!
//! Loads configuration from the environment, picks a backend and assembles
//! the board runtime that CLI or graphical front-ends drive.
pub mod backends;
pub mod builder;
pub mod config;

pub use backends::{BackendFactory, DemoBackendFactory, RestBackendFactory};
pub use builder::{RuntimeBuilder, RuntimeSetup};
pub use config::BootstrapConfig;
