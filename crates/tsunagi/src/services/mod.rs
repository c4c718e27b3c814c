//! Services
//!
//! Stateful building blocks of the session and memory core.

pub mod clock;
pub mod keyword_search;
pub mod memory_store;
pub mod message_handler;
pub mod path_guard;
pub mod reply_dispatcher;
pub mod workspace;

// Re-exports
pub use clock::MonotonicClock;
pub use keyword_search::KeywordSearch;
pub use memory_store::{AddMemoryOptions, MemoryStore, SearchMemoriesOptions};
pub use message_handler::MessageHandler;
pub use reply_dispatcher::ReplyDispatcher;
pub use workspace::WorkspaceManager;
