use thiserror::Error;

/// Message shown to end users for every failure except cancellation
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, the assistant is unavailable right now. Please try again.";

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Request failed: {status} {status_text}")]
    RequestFailed {
        status: u16,
        status_text: String,
        body: Option<String>,
    },

    #[error("Response has no readable body")]
    NoResponseBody,

    #[error("Request aborted")]
    Aborted,

    #[error("Invalid response body (HTTP {status}): {reason}")]
    InvalidResponse { status: u16, reason: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to encode request payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    pub(crate) fn request_failed(status: reqwest::StatusCode, body: Option<String>) -> Self {
        Self::RequestFailed {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.filter(|b| !b.is_empty()),
        }
    }

    /// User-initiated cancellation, not a failure worth reporting
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } | Self::InvalidResponse { status, .. } => {
                Some(*status)
            }
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text to show the user, `None` when the error should stay silent
    pub fn user_message(&self) -> Option<&'static str> {
        if self.is_aborted() {
            None
        } else {
            Some(GENERIC_FAILURE_MESSAGE)
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_fields() {
        let err = AgentError::request_failed(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            Some(String::new()),
        );

        match &err {
            AgentError::RequestFailed { status, status_text, body } => {
                assert_eq!(*status, 500);
                assert_eq!(status_text, "Internal Server Error");
                assert_eq!(*body, None);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Request failed: 500 Internal Server Error");
    }

    #[test]
    fn test_aborted_is_silent() {
        assert!(AgentError::Aborted.is_aborted());
        assert_eq!(AgentError::Aborted.user_message(), None);
        assert_eq!(
            AgentError::NoResponseBody.user_message(),
            Some(GENERIC_FAILURE_MESSAGE)
        );
    }
}
