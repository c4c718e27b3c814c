//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod importance;
mod platform;
mod visibility;

pub use importance::*;
pub use platform::*;
pub use visibility::*;
