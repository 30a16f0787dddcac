use serde::{Deserialize, Serialize};
use serde_json::Value;

// Bodies of the events the agent backend streams. Each frame's `event:` line
// carries the type name and its `data:` line carries one of these objects
// encoded as JSON (the object repeats the name in its `type` field).

/// Incremental piece of the answer text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEvent {
    #[serde(default)]
    pub text: String,
}

/// Complete answer, sent once at the end of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEvent {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub intents: Vec<String>,

    #[serde(default)]
    pub citations: Vec<Value>,
}

/// Backend-side failure reported in-band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub error: String,
}
