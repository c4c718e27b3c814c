//! Session outcome of handling one inbound event

use serde::{Deserialize, Serialize};

/// Error text returned when the same event is already in flight
pub const ALREADY_PROCESSING: &str = "Event already being processed";

/// Error text returned when processing was cancelled
pub const PROCESSING_CANCELLED: &str = "Processing cancelled";

/// Result of processing an inbound event
///
/// Failures are data here: nothing downstream of the message handler
/// raises past a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    /// A bot-authored message already reached the channel
    pub reply_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionResponse {
    pub fn ok(reply_sent: bool) -> Self {
        Self {
            success: true,
            reply_sent,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, reply_sent: bool) -> Self {
        Self {
            success: false,
            reply_sent,
            error: Some(error.into()),
        }
    }

    /// Rejection for an event whose dedup key is already in flight
    pub fn duplicate() -> Self {
        Self::failed(ALREADY_PROCESSING, false)
    }

    pub fn cancelled() -> Self {
        Self::failed(PROCESSING_CANCELLED, false)
    }
}
