use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form request context forwarded to the agent backend.
///
/// No key is required and unknown keys are passed through untouched, so the
/// dashboard can attach whatever the backend understands (session id,
/// locale, geolocation, feature flags).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestContext(Map<String, Value>);

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn session_id(self, session_id: impl Into<String>) -> Self {
        self.with("session_id", session_id.into())
    }

    pub fn locale(self, locale: impl Into<String>) -> Self {
        self.with("locale", locale.into())
    }

    pub fn geolocation(self, lat: f64, lon: f64) -> Self {
        self.with("geolocation", serde_json::json!({ "lat": lat, "lon": lon }))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RequestContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
