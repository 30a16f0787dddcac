use async_trait::async_trait;
use kisan_types::OutboundPayload;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::streaming::EventStream;

/// Client for the conversational agent backend
///
/// Provides the one-shot and the streamed variant of the same request.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Single request/response round trip; the body must be valid JSON
    async fn complete(&self, payload: &OutboundPayload) -> Result<Value>;

    /// Streamed completion.
    ///
    /// Resolves once response headers arrive with a success status; events
    /// then follow on the returned stream until the body ends or `cancel`
    /// fires.
    async fn stream_events(
        &self,
        payload: &OutboundPayload,
        cancel: CancellationToken,
    ) -> Result<EventStream>;

    /// Liveness probe
    async fn health(&self) -> Result<()>;
}
