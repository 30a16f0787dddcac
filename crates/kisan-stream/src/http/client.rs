// HTTP client for the agent backend (reqwest, no SDK)

use async_trait::async_trait;
use kisan_types::OutboundPayload;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, USER_AGENT,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{join_url, ClientConfig};
use crate::error::{AgentError, Result};
use crate::streaming::{decode_event_stream, drive_sink, spawn_channel, EventStream, StreamEvent};
use crate::traits::AgentClient;

const EVENT_STREAM: &str = "text/event-stream";

/// Agent backend client over HTTP.
///
/// Cheap to clone; clones share the connection pool. Every streamed call
/// gets its own frame decoder, so concurrent calls never share state.
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    http_client: reqwest::Client,
    base_url: String,
    config: ClientConfig,
}

impl HttpAgentClient {
    pub fn builder() -> HttpAgentClientBuilder {
        HttpAgentClientBuilder::default()
    }

    /// Client with default routes for `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Streamed completion delivered to `on_event`.
    ///
    /// `on_event` runs synchronously once per event, in arrival order. The
    /// call returns `Ok(())` when the body ends and `Err(Aborted)` when
    /// `cancel` fires; no event is delivered after cancellation is observed.
    pub async fn stream<F>(
        &self,
        payload: &OutboundPayload,
        on_event: F,
        cancel: Option<CancellationToken>,
    ) -> Result<()>
    where
        F: FnMut(StreamEvent),
    {
        let cancel = cancel.unwrap_or_else(CancellationToken::new);
        let events = self.stream_events(payload, cancel).await?;
        drive_sink(events, on_event).await
    }

    /// Streamed completion delivered through a bounded channel.
    ///
    /// The pull loop runs on its own task; the handle yields its outcome.
    pub async fn stream_channel(
        &self,
        payload: &OutboundPayload,
        cancel: CancellationToken,
    ) -> Result<(mpsc::Receiver<StreamEvent>, JoinHandle<Result<()>>)> {
        let events = self.stream_events(payload, cancel).await?;
        Ok(spawn_channel(events, self.config.channel_capacity))
    }

    /// One-shot completion deserialized into `T`
    pub async fn complete_as<T: DeserializeOwned>(&self, payload: &OutboundPayload) -> Result<T> {
        let url = join_url(&self.base_url, &self.config.complete_path);
        tracing::debug!(%url, messages = payload.messages.len(), "sending completion request");

        let request = self.post_json(&url, payload)?;
        let response = ensure_success(request.send().await?).await?;
        read_json(response).await
    }

    fn post_json(&self, url: &str, payload: &OutboundPayload) -> Result<RequestBuilder> {
        let body = serde_json::to_vec(payload)?;
        Ok(self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body))
    }
}

/// Send `request` unless `cancel` fires first
async fn send_cancellable(request: RequestBuilder, cancel: &CancellationToken) -> Result<Response> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AgentError::Aborted),
        response = request.send() => Ok(response?),
    }
}

/// Map a non-2xx response to `RequestFailed`, keeping its body text
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.ok();
    tracing::debug!(status = status.as_u16(), "agent request failed");
    Err(AgentError::request_failed(status, body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;

    serde_json::from_slice(&bytes).map_err(|e| AgentError::InvalidResponse {
        status,
        reason: e.to_string(),
    })
}

fn has_no_body(response: &Response) -> bool {
    matches!(
        response.status(),
        StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT
    ) || response.content_length() == Some(0)
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for HttpAgentClient
#[derive(Debug, Default)]
pub struct HttpAgentClientBuilder {
    config: Option<ClientConfig>,
    base_url: Option<String>,
    headers: Vec<(String, String)>,
    http_client: Option<reqwest::Client>,
}

impl HttpAgentClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the base URL from `config`
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Extra header sent with every request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Use a preconfigured reqwest client; `header` and timeouts are then ignored
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<HttpAgentClient> {
        let mut config = self.config.unwrap_or_default();
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        let base_url = config.normalized_base_url()?;
        if config.channel_capacity == 0 {
            return Err(AgentError::Config(
                "Channel capacity must be greater than zero".to_string(),
            ));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::new();
                for (name, value) in &self.headers {
                    let name = HeaderName::from_bytes(name.as_bytes())
                        .map_err(|_| AgentError::Config(format!("Invalid header name: {}", name)))?;
                    let value = HeaderValue::from_str(value)
                        .map_err(|_| AgentError::Config(format!("Invalid value for header {}", name)))?;
                    headers.insert(name, value);
                }
                if let Some(agent) = &config.user_agent {
                    let value = HeaderValue::from_str(agent)
                        .map_err(|_| AgentError::Config("Invalid user agent".to_string()))?;
                    headers.insert(USER_AGENT, value);
                }

                reqwest::Client::builder()
                    .default_headers(headers)
                    .connect_timeout(config.connect_timeout())
                    .build()?
            }
        };

        Ok(HttpAgentClient {
            http_client,
            base_url,
            config,
        })
    }
}

// ============================================================================
// TRAIT IMPLEMENTATION
// ============================================================================

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn complete(&self, payload: &OutboundPayload) -> Result<Value> {
        self.complete_as(payload).await
    }

    async fn stream_events(
        &self,
        payload: &OutboundPayload,
        cancel: CancellationToken,
    ) -> Result<EventStream> {
        let url = join_url(&self.base_url, &self.config.stream_path);
        tracing::debug!(%url, messages = payload.messages.len(), "opening event stream");

        let request = self
            .post_json(&url, payload)?
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache");
        let response = send_cancellable(request, &cancel).await?;

        let status = response.status();
        if !status.is_success() {
            // The error body is not read as an event stream
            tracing::debug!(status = status.as_u16(), "event stream request failed");
            return Err(AgentError::request_failed(status, None));
        }
        if has_no_body(&response) {
            return Err(AgentError::NoResponseBody);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with(EVENT_STREAM) {
            tracing::warn!(content_type, "unexpected content type for event stream");
        }

        Ok(decode_event_stream(response.bytes_stream(), cancel))
    }

    async fn health(&self) -> Result<()> {
        let url = join_url(&self.base_url, &self.config.health_path);
        let response = ensure_success(self.http_client.get(&url).send().await?).await?;
        let status = response.status().as_u16();
        let body: Value = read_json(response).await?;

        match body.get("status").and_then(Value::as_str) {
            Some("ok") => Ok(()),
            other => Err(AgentError::InvalidResponse {
                status,
                reason: format!("unexpected health status {:?}", other),
            }),
        }
    }
}
