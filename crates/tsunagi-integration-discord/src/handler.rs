//! Serenity event handler feeding Discord messages into the bridge

use std::sync::{Arc, OnceLock};

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, info, warn};
use tsunagi::{DomainError, EventProcessor, MessageHandler, NormalizedEvent, PlatformAdapter};

use crate::config::DiscordConfig;
use crate::gateway::DiscordEventParser;
use crate::integration::DiscordIntegration;

/// Gateway intents the bridge needs to see guild mentions and DMs
pub fn bridge_intents() -> GatewayIntents {
    GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Routes every `MESSAGE_CREATE` through [`MessageHandler::handle_and_reply`]
pub struct DiscordEventHandler<P: EventProcessor> {
    handler: Arc<MessageHandler<P>>,
    adapter: Arc<DiscordIntegration>,
    parser: DiscordEventParser,
    bot_user_id: OnceLock<u64>,
}

impl<P: EventProcessor> DiscordEventHandler<P> {
    pub fn new(handler: Arc<MessageHandler<P>>, config: DiscordConfig) -> Self {
        let parser = DiscordEventParser::new(&config);
        Self {
            handler,
            adapter: Arc::new(DiscordIntegration::new(config)),
            parser,
            bot_user_id: OnceLock::new(),
        }
    }

    pub fn adapter(&self) -> Arc<DiscordIntegration> {
        Arc::clone(&self.adapter)
    }

    /// Normalize through the same parser that handles raw gateway payloads
    fn normalize(&self, msg: &Message) -> Result<Option<NormalizedEvent>, DomainError> {
        let raw = serde_json::to_value(msg)
            .map_err(|e| DomainError::Validation(format!("Unserializable Discord message: {}", e)))?;
        let parser = match self.bot_user_id.get() {
            Some(bot) => self.parser.clone().with_bot_user_id(*bot),
            None => self.parser.clone(),
        };
        parser.parse_gateway_event("MESSAGE_CREATE", &raw)
    }
}

#[async_trait]
impl<P: EventProcessor> EventHandler for DiscordEventHandler<P> {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        if self.bot_user_id.set(ready.user.id.get()).is_err() {
            debug!("Gateway ready again after reconnect; bot user id already known");
        }
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Discord gateway ready");
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let event = match self.normalize(&msg) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(message_id = %msg.id, "Skipping Discord message");
                return;
            }
            Err(e) => {
                warn!(message_id = %msg.id, error = %e, "Failed to normalize Discord message");
                return;
            }
        };

        let adapter: Arc<dyn PlatformAdapter> = self.adapter.clone();
        let response = self.handler.handle_and_reply(event, adapter).await;
        if !response.success {
            warn!(
                message_id = %msg.id,
                error = response.error.as_deref().unwrap_or("unknown"),
                "Discord message was not handled"
            );
        }
    }
}

/// Connect to the gateway and serve until the client stops
pub async fn run<P: EventProcessor>(
    handler: Arc<MessageHandler<P>>,
    config: DiscordConfig,
) -> Result<(), serenity::Error> {
    let token = config.token.clone();
    let mut client = serenity::Client::builder(&token, bridge_intents())
        .event_handler(DiscordEventHandler::new(handler, config))
        .await?;
    client.start().await
}
