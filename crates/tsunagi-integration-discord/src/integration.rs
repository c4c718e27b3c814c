//! PlatformAdapter implementation for Discord

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use tsunagi::ports::{PlatformAdapter, ReplyOptions, SentMessage};
use tsunagi::{DomainError, Platform, PlatformMessage};

use crate::client::{parse_snowflake, DiscordClient};
use crate::config::DiscordConfig;

/// Discord integration implementing the PlatformAdapter port
pub struct DiscordIntegration {
    client: DiscordClient,
}

impl DiscordIntegration {
    /// Create a new Discord integration
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            client: DiscordClient::new(config),
        }
    }

    pub fn client(&self) -> &DiscordClient {
        &self.client
    }

    /// Convert serenity Message to domain PlatformMessage
    fn convert_message(msg: &serenity::model::channel::Message) -> PlatformMessage {
        // serenity's time::OffsetDateTime to chrono::DateTime<Utc>
        let timestamp = DateTime::<Utc>::from_timestamp(
            msg.timestamp.unix_timestamp(),
            msg.timestamp.nanosecond(),
        )
        .unwrap_or_else(Utc::now);

        PlatformMessage::new(
            msg.id.to_string(),
            msg.channel_id.to_string(),
            msg.author.id.to_string(),
            msg.author.name.clone(),
            msg.content.clone(),
            Platform::Discord,
        )
        .with_timestamp(timestamp)
        .with_metadata(serde_json::json!({
            "guild_id": msg.guild_id.map(|g| g.to_string()),
            "attachments_count": msg.attachments.len(),
            "embeds_count": msg.embeds.len(),
            "is_bot": msg.author.bot,
        }))
    }
}

#[async_trait]
impl PlatformAdapter for DiscordIntegration {
    fn platform(&self) -> Platform {
        Platform::Discord
    }

    async fn send_reply(
        &self,
        channel_id: &str,
        content: &str,
        options: ReplyOptions,
    ) -> Result<SentMessage, DomainError> {
        let channel = parse_snowflake("channel", channel_id)?;

        let sent = match options.reply_to_message_id.as_deref() {
            Some(message_id) => {
                let message = parse_snowflake("message", message_id)?;
                self.client.reply(channel, message, content).await
            }
            None => self.client.send_message(channel, content).await,
        }
        .map_err(|e| DomainError::PlatformSendFailed(format!("Discord API error: {}", e)))?;

        Ok(SentMessage {
            message_id: Some(sent.id.to_string()),
        })
    }

    async fn fetch_recent_messages(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<PlatformMessage>, DomainError> {
        let channel = parse_snowflake("channel", channel_id)?;
        let limit = limit.clamp(1, self.client.config().history_limit as usize) as u8;
        debug!(channel_id = %channel_id, limit = %limit, "Reading messages from Discord");

        let messages = self
            .client
            .get_messages(channel, limit)
            .await
            .map_err(|e| DomainError::ExternalService(format!("Discord API error: {}", e)))?;

        Ok(messages.iter().map(Self::convert_message).collect())
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        // Fetching the current user proves the token works
        match self.client.http().get_current_user().await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Discord health check failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_reply_rejects_malformed_ids_before_calling_discord() {
        let integration = DiscordIntegration::new(DiscordConfig::new("test-token"));

        let err = integration
            .send_reply("general", "hi", ReplyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = integration
            .send_reply("123", "hi", ReplyOptions::reply_to("not-a-snowflake"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_platform() {
        let integration = DiscordIntegration::new(DiscordConfig::default());
        assert_eq!(integration.platform(), Platform::Discord);
    }
}
