use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::buffer_utils::{DecodedFrame, FrameDecoder};
use crate::error::{AgentError, Result};

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Payload of a stream event: parsed JSON, or the raw text when the frame
/// data is not valid JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventData {
    Json(Value),
    Text(String),
}

impl EventData {
    pub fn parse(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(raw),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }
}

/// Event types the agent backend sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Token,
    Final,
    Error,
    Other,
}

/// One decoded event delivered to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamEvent {
    pub event: String,
    pub data: EventData,
}

impl StreamEvent {
    pub fn new(event: impl Into<String>, data: EventData) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.event.as_str() {
            "token" => EventKind::Token,
            "final" => EventKind::Final,
            "error" => EventKind::Error,
            _ => EventKind::Other,
        }
    }

    /// Deserialize JSON data into a typed body
    pub fn parse_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.data
            .as_json()
            .and_then(|value| T::deserialize(value).ok())
    }
}

impl From<DecodedFrame> for StreamEvent {
    fn from(frame: DecodedFrame) -> Self {
        let data = EventData::parse(frame.data());
        if let EventData::Text(raw) = &data {
            tracing::debug!(event = %frame.event_name, len = raw.len(), "frame data is not JSON, delivering raw text");
        }
        Self {
            event: frame.event_name,
            data,
        }
    }
}

/// Turn a chunked response body into an ordered stream of events.
///
/// Every chunk is decoded as soon as it arrives and all frames it completes
/// are yielded before the next read. The stream ends when the body ends;
/// a trailing partial frame is dropped. If `cancel` fires, the pending read
/// is abandoned, the stream yields `Aborted` and nothing after it.
pub fn decode_event_stream<S, E>(body: S, cancel: CancellationToken) -> EventStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<AgentError> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut body = Box::pin(body);
        let mut decoder = FrameDecoder::new();
        let mut chunks = 0usize;
        let mut events = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                chunk = body.next() => Some(chunk),
            };

            let chunk = match next {
                None => {
                    tracing::debug!(chunks, events, "stream cancelled");
                    yield Err(AgentError::Aborted);
                    return;
                }
                Some(None) => break,
                Some(Some(Ok(bytes))) => bytes,
                Some(Some(Err(e))) => {
                    let err: AgentError = e.into();
                    tracing::debug!(chunks, events, error = %err, "stream body failed");
                    yield Err(err);
                    return;
                }
            };

            chunks += 1;
            tracing::trace!(len = chunk.len(), "chunk received");
            decoder.push(&chunk);

            while let Some(frame) = decoder.next_frame() {
                if cancel.is_cancelled() {
                    tracing::debug!(chunks, events, "stream cancelled");
                    yield Err(AgentError::Aborted);
                    return;
                }
                events += 1;
                tracing::trace!(event = %frame.event_name, "frame decoded");
                yield Ok(StreamEvent::from(frame));
            }
        }

        if decoder.buffered_len() > 0 {
            tracing::debug!(
                remainder = decoder.buffered_len(),
                "body ended mid-frame, discarding remainder"
            );
        }
        tracing::debug!(chunks, events, "stream completed");
    })
}

/// Feed every event to `on_event` in order, returning the terminal outcome
pub async fn drive_sink<F>(mut events: EventStream, mut on_event: F) -> Result<()>
where
    F: FnMut(StreamEvent),
{
    while let Some(item) = events.next().await {
        on_event(item?);
    }
    Ok(())
}

/// Run `events` on a background task, forwarding into a bounded channel.
///
/// The join handle resolves to the stream's terminal outcome. Dropping the
/// receiver stops the task, which then resolves to `Aborted`.
pub fn spawn_channel(
    mut events: EventStream,
    capacity: usize,
) -> (mpsc::Receiver<StreamEvent>, JoinHandle<Result<()>>) {
    let (tx, rx) = mpsc::channel(capacity);

    let handle = tokio::spawn(async move {
        loop {
            let item = tokio::select! {
                biased;
                _ = tx.closed() => {
                    tracing::debug!("event receiver dropped");
                    return Err(AgentError::Aborted);
                }
                item = events.next() => item,
            };

            let Some(item) = item else {
                return Ok(());
            };
            if tx.send(item?).await.is_err() {
                tracing::debug!("event receiver dropped");
                return Err(AgentError::Aborted);
            }
        }
    });

    (rx, handle)
}
