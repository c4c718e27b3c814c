//! Message Entities
//!
//! Inbound events and platform messages, normalized across platforms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::WorkspaceKeyComponents;
use crate::domain::value_objects::Platform;

/// Platform-agnostic inbound message descriptor
///
/// Produced by platform adapters; the core derives a workspace and a
/// dedup key from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub platform: Platform,
    pub channel_id: String,
    pub user_id: String,
    pub message_id: String,
    pub is_dm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Original platform payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl NormalizedEvent {
    pub fn new(
        platform: Platform,
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        message_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            message_id: message_id.into(),
            is_dm: false,
            guild_id: None,
            content: content.into(),
            timestamp: Utc::now(),
            raw: None,
        }
    }

    /// Mark as a direct message
    pub fn with_dm(mut self, is_dm: bool) -> Self {
        self.is_dm = is_dm;
        self
    }

    pub fn with_guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn workspace_components(&self) -> WorkspaceKeyComponents {
        WorkspaceKeyComponents::new(self.platform, self.user_id.clone(), self.channel_id.clone())
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.platform, self.message_id.clone())
    }
}

/// Admission key for one inbound event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub platform: Platform,
    pub message_id: String,
}

impl DedupKey {
    pub fn new(platform: Platform, message_id: impl Into<String>) -> Self {
        Self {
            platform,
            message_id: message_id.into(),
        }
    }
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.platform, self.message_id)
    }
}

/// A message fetched from a platform for context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMessage {
    /// Platform-specific message ID
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub platform: Platform,
    /// Platform-specific metadata (attachments, embeds, etc.)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl PlatformMessage {
    pub fn new(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        content: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            author_id: author_id.into(),
            author_name: author_name.into(),
            content: content.into(),
            timestamp: Utc::now(),
            platform,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
