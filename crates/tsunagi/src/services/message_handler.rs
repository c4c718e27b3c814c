//! Message Handler
//!
//! Admission control for inbound events: at most one in-flight handling per
//! `(platform, messageId)`. A second arrival is rejected at once, not
//! queued. Distinct events run fully in parallel.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::domain::entities::{DedupKey, NormalizedEvent, SessionResponse};
use crate::domain::value_objects::Platform;
use crate::ports::{EventProcessor, PlatformAdapter, SessionContext};
use crate::services::reply_dispatcher::ReplyDispatcher;
use crate::services::workspace::WorkspaceManager;

type InFlight = Arc<Mutex<HashSet<DedupKey>>>;

/// Removes its key from the in-flight set when dropped, on every exit path
struct InFlightGuard {
    in_flight: InFlight,
    key: DedupKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.key);
    }
}

/// Routes inbound events through workspace resolution, admission control
/// and the agent pipeline
pub struct MessageHandler<P: EventProcessor> {
    processor: Arc<P>,
    workspaces: Arc<WorkspaceManager>,
    dispatcher: ReplyDispatcher,
    in_flight: InFlight,
}

impl<P: EventProcessor> MessageHandler<P> {
    pub fn new(processor: Arc<P>, workspaces: Arc<WorkspaceManager>) -> Self {
        Self::with_dispatcher(processor, workspaces, ReplyDispatcher::new())
    }

    pub fn with_dispatcher(
        processor: Arc<P>,
        workspaces: Arc<WorkspaceManager>,
        dispatcher: ReplyDispatcher,
    ) -> Self {
        Self {
            processor,
            workspaces,
            dispatcher,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn try_admit(&self, key: DedupKey) -> Option<InFlightGuard> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            key,
        })
    }

    /// Handle one inbound event. Never fails: every error becomes
    /// `SessionResponse { success: false, .. }`.
    pub async fn handle_event(
        &self,
        event: NormalizedEvent,
        adapter: Arc<dyn PlatformAdapter>,
    ) -> SessionResponse {
        let key = event.dedup_key();
        let Some(guard) = self.try_admit(key.clone()) else {
            tracing::debug!(event = %key, "Rejecting event already in flight");
            return SessionResponse::duplicate();
        };

        let workspace = match self.workspaces.get_or_create_workspace(&event).await {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::error!(event = %key, error = %e, "Failed to resolve workspace");
                return SessionResponse::failed(e.to_string(), false);
            }
        };

        tracing::debug!(event = %key, workspace = %workspace.key, "Processing event");

        let processor = Arc::clone(&self.processor);
        let session = SessionContext { event, workspace };
        // the key stays in flight until processing ends, even if this caller is dropped
        let task = tokio::spawn(async move {
            let _guard = guard;
            processor.process(session, adapter).await
        });

        match task.await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(event = %key, error = %e, "Event processing failed");
                SessionResponse::failed(e.to_string(), false)
            }
            Err(e) if e.is_cancelled() => SessionResponse::cancelled(),
            Err(e) => {
                tracing::error!(event = %key, error = %e, "Event processing panicked");
                SessionResponse::failed("Event processing panicked", false)
            }
        }
    }

    /// [`handle_event`](Self::handle_event), then the fallback error reply
    /// threaded to the inbound message when nothing was sent.
    pub async fn handle_and_reply(
        &self,
        event: NormalizedEvent,
        adapter: Arc<dyn PlatformAdapter>,
    ) -> SessionResponse {
        let channel_id = event.channel_id.clone();
        let message_id = event.message_id.clone();

        let response = self.handle_event(event, Arc::clone(&adapter)).await;
        self.dispatcher
            .dispatch_error_if_needed(adapter.as_ref(), &channel_id, &response, Some(&message_id))
            .await;
        response
    }

    pub fn is_processing(&self, platform: Platform, message_id: &str) -> bool {
        let set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.contains(&DedupKey::new(platform, message_id))
    }

    pub fn get_active_count(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
