pub mod buffer_utils;
pub mod config;
pub mod error;
pub mod http;
pub mod streaming;
pub mod traits;

pub use buffer_utils::{DecodedFrame, FrameDecoder, Utf8ChunkDecoder};
pub use config::ClientConfig;
pub use error::{AgentError, Result, GENERIC_FAILURE_MESSAGE};
pub use http::{HttpAgentClient, HttpAgentClientBuilder};
pub use streaming::{
    decode_event_stream, drive_sink, spawn_channel, EventData, EventKind, EventStream, StreamEvent,
};
pub use traits::AgentClient;

pub use kisan_types::{
    CompleteResponse, ConversationMessage, ErrorEvent, FinalEvent, OutboundPayload,
    RequestContext, Role, TokenEvent,
};
pub use tokio_util::sync::CancellationToken;
