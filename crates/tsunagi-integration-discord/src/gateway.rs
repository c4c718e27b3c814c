//! Discord gateway event normalization

use serde::{Deserialize, Serialize};
use tracing::debug;
use tsunagi::{DomainError, NormalizedEvent, Platform};

use crate::config::DiscordConfig;

/// Turns Discord `MESSAGE_CREATE` payloads into [`NormalizedEvent`]s,
/// dropping what the bot should not answer
#[derive(Debug, Clone)]
pub struct DiscordEventParser {
    respond_to_dms: bool,
    respond_to_mentions: bool,
    guild_id: Option<u64>,
    bot_user_id: Option<u64>,
}

impl DiscordEventParser {
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            respond_to_dms: config.respond_to_dms,
            respond_to_mentions: config.respond_to_mentions,
            guild_id: config.guild_id,
            bot_user_id: None,
        }
    }

    /// Guild messages must mention this user to be handled
    pub fn with_bot_user_id(mut self, bot_user_id: u64) -> Self {
        self.bot_user_id = Some(bot_user_id);
        self
    }

    /// Parse a Discord gateway dispatch
    pub fn parse_gateway_event(
        &self,
        event_type: &str,
        data: &serde_json::Value,
    ) -> Result<Option<NormalizedEvent>, DomainError> {
        match event_type {
            "MESSAGE_CREATE" => self.parse_message_create(data),
            _ => {
                debug!(event_type = %event_type, "Ignoring Discord gateway event");
                Ok(None)
            }
        }
    }

    fn parse_message_create(
        &self,
        data: &serde_json::Value,
    ) -> Result<Option<NormalizedEvent>, DomainError> {
        let msg: DiscordMessage = serde_json::from_value(data.clone())
            .map_err(|e| DomainError::Validation(format!("Invalid MESSAGE_CREATE: {}", e)))?;

        let mentions_bot = self.bot_user_id.is_some_and(|bot| {
            msg.mentions
                .iter()
                .any(|user| user.id.parse::<u64>().ok() == Some(bot))
        });
        let guild_id = msg.guild_id.as_deref().and_then(|g| g.parse::<u64>().ok());
        if !self.should_handle(msg.author.bot.unwrap_or(false), guild_id, mentions_bot) {
            return Ok(None);
        }

        let mut event = NormalizedEvent::new(
            Platform::Discord,
            msg.channel_id,
            msg.author.id,
            msg.id,
            msg.content,
        )
        .with_dm(msg.guild_id.is_none())
        .with_raw(data.clone());
        if let Some(guild_id) = msg.guild_id {
            event = event.with_guild_id(guild_id);
        }
        if let Some(timestamp) = msg
            .timestamp
            .as_deref()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
        {
            event = event.with_timestamp(timestamp.with_timezone(&chrono::Utc));
        }
        Ok(Some(event))
    }

    /// Bots are never answered. DMs follow `respond_to_dms`; guild messages
    /// need `respond_to_mentions`, a mention of the bot and, when a guild is
    /// configured, that guild.
    pub fn should_handle(&self, is_bot: bool, guild_id: Option<u64>, mentions_bot: bool) -> bool {
        if is_bot {
            return false;
        }
        match guild_id {
            None => self.respond_to_dms,
            Some(guild) => {
                self.respond_to_mentions
                    && mentions_bot
                    && self.guild_id.map_or(true, |configured| configured == guild)
            }
        }
    }
}

// Internal types for parsing Discord events

#[derive(Debug, Deserialize, Serialize)]
struct DiscordMessage {
    id: String,
    channel_id: String,
    guild_id: Option<String>,
    author: DiscordUser,
    content: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    mentions: Vec<DiscordUser>,
}

#[derive(Debug, Deserialize, Serialize)]
struct DiscordUser {
    id: String,
    #[serde(default)]
    username: String,
    bot: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: u64 = 999;

    fn parser() -> DiscordEventParser {
        DiscordEventParser::new(&DiscordConfig::new("t")).with_bot_user_id(BOT)
    }

    fn guild_message(mentions: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "123",
            "channel_id": "456",
            "guild_id": "789",
            "author": { "id": "111", "username": "testuser", "bot": false },
            "content": "<@999> Hello, world!",
            "timestamp": "2024-05-01T12:00:00.000000+00:00",
            "mentions": mentions,
        })
    }

    #[test]
    fn test_parse_guild_mention() {
        let data = guild_message(serde_json::json!([{ "id": "999", "username": "tsunagi" }]));

        let event = parser()
            .parse_gateway_event("MESSAGE_CREATE", &data)
            .unwrap()
            .expect("event");

        assert_eq!(event.platform, Platform::Discord);
        assert_eq!(event.channel_id, "456");
        assert_eq!(event.user_id, "111");
        assert_eq!(event.message_id, "123");
        assert_eq!(event.guild_id.as_deref(), Some("789"));
        assert!(!event.is_dm);
        assert_eq!(event.timestamp.to_rfc3339(), "2024-05-01T12:00:00+00:00");
        assert_eq!(event.raw.as_ref(), Some(&data));
    }

    #[test]
    fn test_guild_message_without_mention_is_ignored() {
        let data = guild_message(serde_json::json!([]));
        assert!(parser()
            .parse_gateway_event("MESSAGE_CREATE", &data)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_ignore_bot_messages() {
        let data = serde_json::json!({
            "id": "123",
            "channel_id": "456",
            "author": { "id": "bot123", "username": "botuser", "bot": true },
            "content": "Bot message"
        });

        assert!(parser()
            .parse_gateway_event("MESSAGE_CREATE", &data)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_dm() {
        let data = serde_json::json!({
            "id": "123",
            "channel_id": "456",
            "author": { "id": "user123", "username": "testuser" },
            "content": "DM message"
        });

        let event = parser()
            .parse_gateway_event("MESSAGE_CREATE", &data)
            .unwrap()
            .expect("event");
        assert!(event.is_dm);
        assert_eq!(event.guild_id, None);
        assert_eq!(event.content, "DM message");
    }

    #[test]
    fn test_should_handle_follows_config() {
        let no_dms =
            DiscordEventParser::new(&DiscordConfig::new("t").with_respond_to_dms(false));
        assert!(!no_dms.should_handle(false, None, false));

        let one_guild = DiscordEventParser::new(&DiscordConfig::new("t").with_guild_id(1));
        assert!(one_guild.should_handle(false, Some(1), true));
        assert!(!one_guild.should_handle(false, Some(2), true));
        assert!(one_guild.should_handle(false, None, false));
    }

    #[test]
    fn test_other_events_and_bad_payloads() {
        assert!(parser()
            .parse_gateway_event("TYPING_START", &serde_json::json!({}))
            .unwrap()
            .is_none());
        assert!(matches!(
            parser().parse_gateway_event("MESSAGE_CREATE", &serde_json::json!({ "id": 1 })),
            Err(DomainError::Validation(_))
        ));
    }
}
