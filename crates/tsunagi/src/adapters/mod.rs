//! Adapters
//!
//! Infrastructure implementations of core ports.

mod ripgrep;

pub use ripgrep::RipgrepBackend;
