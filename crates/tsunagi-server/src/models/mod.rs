//! Skill API Data Models
//!
//! - Workspace: addressing a conversation's workspace
//! - Memory: memory log requests and resolved memories

mod memory;
mod workspace;

pub use memory::*;
pub use workspace::*;
