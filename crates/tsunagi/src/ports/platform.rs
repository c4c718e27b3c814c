//! Platform Adapter Port
//!
//! Abstract interface for the chat platforms the bridge talks to
//! (Discord, Misskey). Implementations live in separate crates
//! (e.g., tsunagi-integration-discord) and own API calls, rate limiting
//! and gateway reconnection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::PlatformMessage;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::Platform;

/// Options for an outbound reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyOptions {
    /// Thread the reply to this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<String>,
}

impl ReplyOptions {
    pub fn reply_to(message_id: impl Into<String>) -> Self {
        Self {
            reply_to_message_id: Some(message_id.into()),
        }
    }
}

/// Confirmation of a delivered message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Platform adapter interface
///
/// # Example
///
/// ```rust,ignore
/// use tsunagi::ports::PlatformAdapter;
///
/// struct MisskeyAdapter { /* ... */ }
///
/// #[async_trait]
/// impl PlatformAdapter for MisskeyAdapter {
///     async fn send_reply(&self, channel_id: &str, content: &str, options: ReplyOptions)
///         -> Result<SentMessage, DomainError> {
///         // POST notes/create
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Platform this adapter serves
    fn platform(&self) -> Platform;

    /// Send a message to a channel, optionally threaded to another message
    ///
    /// Failures are reported as `DomainError::PlatformSendFailed`.
    async fn send_reply(
        &self,
        channel_id: &str,
        content: &str,
        options: ReplyOptions,
    ) -> Result<SentMessage, DomainError>;

    /// Fetch the most recent messages of a channel, newest first
    async fn fetch_recent_messages(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<PlatformMessage>, DomainError>;

    /// Search a channel's history for messages related to a query
    async fn search_related_messages(
        &self,
        _channel_id: &str,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<PlatformMessage>, DomainError> {
        Ok(Vec::new())
    }

    /// Check if the adapter is connected and healthy
    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }
}
