// Connection settings for the agent backend.
// Routes default to the ones the agent API mounts under `/agent`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AgentError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_STREAM_PATH: &str = "/agent/stream";
pub const DEFAULT_COMPLETE_PATH: &str = "/agent/complete";
pub const DEFAULT_HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_stream_path")]
    pub stream_path: String,

    #[serde(default = "default_complete_path")]
    pub complete_path: String,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// TCP/TLS connect timeout. No whole-request timeout is applied;
    /// streams end only through the body, an error or the caller's token.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Buffer size of the receiver returned by `stream_channel`
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_stream_path() -> String {
    DEFAULT_STREAM_PATH.to_string()
}

fn default_complete_path() -> String {
    DEFAULT_COMPLETE_PATH.to_string()
}

fn default_health_path() -> String {
    DEFAULT_HEALTH_PATH.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stream_path: default_stream_path(),
            complete_path: default_complete_path(),
            health_path: default_health_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: None,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    pub fn with_complete_path(mut self, path: impl Into<String>) -> Self {
        self.complete_path = path.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check the base URL and return it without a trailing slash
    pub fn normalized_base_url(&self) -> Result<String> {
        let base = self.base_url.trim().trim_end_matches('/');

        if base.is_empty() {
            return Err(AgentError::Config("Base URL is required".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(AgentError::Config(format!(
                "Base URL must start with http:// or https://, got {}",
                base
            )));
        }

        Ok(base.to_string())
    }
}

/// Join a base URL and a route, tolerating a missing leading slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
