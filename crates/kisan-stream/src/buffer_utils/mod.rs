mod buffering;
mod sse_parser;

pub use buffering::Utf8ChunkDecoder;
pub use sse_parser::{DecodedFrame, FrameDecoder, DEFAULT_EVENT_NAME};
