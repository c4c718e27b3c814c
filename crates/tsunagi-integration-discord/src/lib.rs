//! Discord Integration for Tsunagi
//!
//! This crate provides the Discord platform adapter for the Tsunagi
//! chat-agent bridge: outbound replies and history through the
//! `PlatformAdapter` port, and inbound gateway messages normalized and fed
//! into the core `MessageHandler`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tsunagi_integration_discord::{run, DiscordConfig};
//!
//! let config = DiscordConfig::new("your-bot-token");
//! run(Arc::new(MessageHandler::new(processor, workspaces)), config).await?;
//! ```

mod client;
mod config;
mod gateway;
mod handler;
mod integration;

pub use client::{truncate_content, DiscordClient, MAX_MESSAGE_CHARS};
pub use config::DiscordConfig;
pub use gateway::DiscordEventParser;
pub use handler::{bridge_intents, run, DiscordEventHandler};
pub use integration::DiscordIntegration;
