//! Reply Dispatcher
//!
//! Last line of defense for the single-reply invariant: a channel gets at
//! most one bot message per inbound event, either the reply produced
//! upstream or this fallback error notice, never both.

use crate::config::ReplyConfig;
use crate::domain::entities::SessionResponse;
use crate::ports::{PlatformAdapter, ReplyOptions};

/// Failures that are not the user's business
const EXPECTED_FAILURES: &[&str] = &["already being processed", "cancelled", "canceled"];

/// Sends a generic error reply when processing failed silently
#[derive(Debug, Clone)]
pub struct ReplyDispatcher {
    error_message: String,
}

impl ReplyDispatcher {
    pub fn new() -> Self {
        Self::from_config(&ReplyConfig::default())
    }

    pub fn from_config(config: &ReplyConfig) -> Self {
        Self::with_message(config.error_message.clone())
    }

    pub fn with_message(error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
        }
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Duplicate and cancelled events fail without telling the user
    pub fn is_expected_failure(error: &str) -> bool {
        let error = error.to_lowercase();
        EXPECTED_FAILURES.iter().any(|known| error.contains(known))
    }

    /// Send the fallback error reply if one is owed.
    ///
    /// Returns `true` only when a fallback was sent and the platform
    /// confirmed it.
    pub async fn dispatch_error_if_needed(
        &self,
        adapter: &dyn PlatformAdapter,
        channel_id: &str,
        response: &SessionResponse,
        reply_to_message_id: Option<&str>,
    ) -> bool {
        if response.success || response.reply_sent {
            return false;
        }

        let error = response.error.as_deref().unwrap_or("unknown error");
        if Self::is_expected_failure(error) {
            tracing::debug!(channel_id = %channel_id, error = %error, "Suppressing error reply");
            return false;
        }

        tracing::warn!(
            platform = %adapter.platform(),
            channel_id = %channel_id,
            error = %error,
            "Processing failed without a reply, sending fallback"
        );

        let options = ReplyOptions {
            reply_to_message_id: reply_to_message_id.map(str::to_string),
        };
        match adapter
            .send_reply(channel_id, &self.error_message, options)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    platform = %adapter.platform(),
                    channel_id = %channel_id,
                    error = %e,
                    "Failed to send fallback error reply"
                );
                false
            }
        }
    }
}

impl Default for ReplyDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
