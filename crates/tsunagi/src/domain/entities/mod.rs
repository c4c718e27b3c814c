//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Workspace: per-conversation trust boundary
//! - Memory: append-only log events and their resolved projection
//! - Message: normalized inbound events and platform messages
//! - Session: outcome of handling one event

mod memory;
mod message;
mod session;
mod workspace;

pub use memory::*;
pub use message::*;
pub use session::*;
pub use workspace::*;
