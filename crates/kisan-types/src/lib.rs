pub mod context;
pub mod events;
pub mod message;
pub mod payload;

pub use context::RequestContext;
pub use events::{ErrorEvent, FinalEvent, TokenEvent};
pub use message::{ConversationMessage, Role};
pub use payload::{CompleteResponse, OutboundPayload};
