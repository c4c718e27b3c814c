//! Discord configuration

use serde::{Deserialize, Serialize};

/// Messages fetched per channel when the agent asks for history
pub const DEFAULT_HISTORY_LIMIT: u8 = 50;

/// Configuration for Discord integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Discord bot token
    pub token: String,
    /// Application ID
    pub application_id: Option<u64>,
    /// Only handle messages from this guild (DMs are unaffected)
    pub guild_id: Option<u64>,
    /// Whether to respond to mentions in guild channels
    pub respond_to_mentions: bool,
    /// Whether to respond to DMs
    pub respond_to_dms: bool,
    /// Upper bound for `fetch_recent_messages` (Discord allows 1..=100)
    pub history_limit: u8,
}

impl DiscordConfig {
    /// Create a new Discord configuration with just a token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Set the application ID
    pub fn with_application_id(mut self, app_id: u64) -> Self {
        self.application_id = Some(app_id);
        self
    }

    /// Set the guild ID
    pub fn with_guild_id(mut self, guild_id: u64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn with_respond_to_mentions(mut self, enable: bool) -> Self {
        self.respond_to_mentions = enable;
        self
    }

    pub fn with_respond_to_dms(mut self, enable: bool) -> Self {
        self.respond_to_dms = enable;
        self
    }

    pub fn with_history_limit(mut self, limit: u8) -> Self {
        self.history_limit = limit.clamp(1, 100);
        self
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            application_id: None,
            guild_id: None,
            respond_to_mentions: true,
            respond_to_dms: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
