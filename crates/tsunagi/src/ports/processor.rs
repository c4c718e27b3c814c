//! Event Processor Port
//!
//! The agent processing pipeline: hands an admitted event to the external
//! reasoning agent and reports how the session ended. The subprocess
//! connector that implements this lives outside the core.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{NormalizedEvent, SessionResponse, WorkspaceInfo};
use crate::domain::errors::DomainError;
use crate::ports::PlatformAdapter;

/// Everything a processor needs for one admitted event
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub event: NormalizedEvent,
    pub workspace: WorkspaceInfo,
}

/// Agent processing pipeline
///
/// An `Err` is turned into `SessionResponse { success: false, .. }` by the
/// message handler. Processors that already replied before failing should
/// return `Ok(SessionResponse::failed(.., true))` instead so no fallback
/// error reply follows.
#[async_trait]
pub trait EventProcessor: Send + Sync + 'static {
    async fn process(
        &self,
        session: SessionContext,
        adapter: Arc<dyn PlatformAdapter>,
    ) -> Result<SessionResponse, DomainError>;
}
