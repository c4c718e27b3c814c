//! Discord API client wrapper

use serenity::http::Http;
use serenity::model::channel::Message as SerenityMessage;
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;
use tracing::{debug, error};

use tsunagi::DomainError;

use crate::config::DiscordConfig;

/// Discord's per-message character limit
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Discord API client
pub struct DiscordClient {
    http: Arc<Http>,
    config: DiscordConfig,
}

impl DiscordClient {
    /// Create a new Discord client
    pub fn new(config: DiscordConfig) -> Self {
        let http = Arc::new(Http::new(&config.token));
        Self { http, config }
    }

    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    /// Get recent messages from a channel, newest first
    pub async fn get_messages(
        &self,
        channel_id: u64,
        limit: u8,
    ) -> Result<Vec<SerenityMessage>, serenity::Error> {
        let channel = ChannelId::new(channel_id);
        debug!(channel_id = %channel_id, limit = %limit, "Fetching messages from Discord");

        let messages = channel
            .messages(
                &self.http,
                serenity::builder::GetMessages::new().limit(limit),
            )
            .await?;

        Ok(messages)
    }

    /// Send a message to a channel
    pub async fn send_message(
        &self,
        channel_id: u64,
        content: &str,
    ) -> Result<SerenityMessage, serenity::Error> {
        let channel = ChannelId::new(channel_id);
        let content = truncate_content(content);
        debug!(channel_id = %channel_id, content_len = %content.len(), "Sending message to Discord");

        let message = channel
            .say(&self.http, content)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to send Discord message"))?;

        Ok(message)
    }

    /// Reply to a message
    pub async fn reply(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<SerenityMessage, serenity::Error> {
        let channel = ChannelId::new(channel_id);
        debug!(
            channel_id = %channel_id,
            message_id = %message_id,
            "Replying to Discord message"
        );

        let message = channel
            .send_message(
                &self.http,
                serenity::builder::CreateMessage::new()
                    .content(truncate_content(content))
                    .reference_message((channel, MessageId::new(message_id))),
            )
            .await
            .inspect_err(|e| error!(error = %e, "Failed to send Discord reply"))?;

        Ok(message)
    }

    /// Get the underlying HTTP client for advanced operations
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }
}

/// Cut `content` to Discord's limit, counting characters
pub fn truncate_content(content: &str) -> &str {
    match content.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((end, _)) => &content[..end],
        None => content,
    }
}

/// Parse a Discord snowflake carried as a string
pub fn parse_snowflake(kind: &str, raw: &str) -> Result<u64, DomainError> {
    match raw.parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(DomainError::Validation(format!(
            "invalid Discord {kind} id: {raw:?}"
        ))),
    }
}
