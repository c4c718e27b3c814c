//! Tsunagi Core Library
//!
//! Session and memory core for the Tsunagi chat-agent bridge.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Workspaces, memory log events, normalized events, sessions
//!   - `value_objects/`: Immutable value types (Platform, Visibility, Importance)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `PlatformAdapter`: outbound chat platform operations
//!   - `EventProcessor`: the agent pipeline behind the bridge
//!   - `SearchBackend`: optional fast path for keyword search
//!
//! - **Services** (`services/`): Workspace manager, memory store, keyword
//!   search, message handler and reply dispatcher
//!
//! - **Adapters** (`adapters/`): Ripgrep search backend
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tsunagi::{KeywordSearch, MemoryStore, WorkspaceManager};
//!
//! let workspaces = Arc::new(WorkspaceManager::new("workspaces")?);
//! let store = MemoryStore::new(workspaces, KeywordSearch::new(), Default::default());
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use config::{BridgeConfig, MemoryConfig, ReplyConfig, SearchConfig};
pub use domain::{
    DedupKey, DomainError, Importance, MemoryChanges, MemoryEntry, MemoryEvent, MemoryPatch,
    NormalizedEvent, Platform, PlatformMessage, ResolvedMemory, SessionResponse, Visibility,
    WorkspaceInfo, WorkspaceKeyComponents,
};
pub use ports::{
    EventProcessor, PlatformAdapter, ReplyOptions, SearchBackend, SearchOptions, SearchResult,
    SentMessage, SessionContext,
};
pub use services::{
    AddMemoryOptions, KeywordSearch, MemoryStore, MessageHandler, ReplyDispatcher,
    SearchMemoriesOptions, WorkspaceManager,
};
