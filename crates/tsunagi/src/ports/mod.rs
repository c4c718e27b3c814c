//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the core interacts with
//! external collaborators (platforms, the agent pipeline, search tools).
//!
//! Implementations of these traits live in adapter crates and modules.

pub mod platform;
pub mod processor;
pub mod search;

// Re-exports
pub use platform::*;
pub use processor::*;
pub use search::*;
