use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::message::ConversationMessage;

/// Request body shared by the streaming and one-shot endpoints.
///
/// The last message is the new user turn. `context` is omitted from the
/// wire when it is absent or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundPayload {
    pub messages: Vec<ConversationMessage>,

    #[serde(default, skip_serializing_if = "context_is_empty")]
    pub context: Option<RequestContext>,
}

fn context_is_empty(context: &Option<RequestContext>) -> bool {
    context.as_ref().map_or(true, RequestContext::is_empty)
}

impl OutboundPayload {
    pub fn new(messages: Vec<ConversationMessage>) -> Self {
        Self {
            messages,
            context: None,
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// The newest user turn, if the history ends with one
    pub fn last_user_message(&self) -> Option<&ConversationMessage> {
        self.messages
            .last()
            .filter(|m| m.role == crate::message::Role::User)
    }
}

/// Body returned by the one-shot completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    #[serde(default)]
    pub citations: Vec<Value>,
}
