// session-client/src/state.rs
use chrono::{DateTime, Utc};
use common::models::ExchangeResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// In-memory results of the user's actions, as shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Application session token held in memory
    pub app_token: Option<String>,
    /// Outcome of the last exchange, success or failure
    pub last_exchange: Option<Value>,
    pub verify_result: Option<Value>,
    pub profile: Option<Value>,
    /// Timestamp of the last state change
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            app_token: None,
            last_exchange: None,
            verify_result: None,
            profile: None,
            updated_at: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record a successful exchange and keep its token
    pub fn authenticate(&mut self, token: String, response: &ExchangeResponse) {
        self.app_token = Some(token);
        self.last_exchange = serde_json::to_value(response).ok();
        self.touch();
    }

    /// Record a failed exchange; the in-memory token is dropped
    pub fn reject(&mut self, error_body: Value) {
        self.app_token = None;
        self.last_exchange = Some(error_body);
        self.touch();
    }

    /// Record an exchange that never got an answer; the token is kept
    pub fn record_failure(&mut self, error_body: Value) {
        self.last_exchange = Some(error_body);
        self.touch();
    }

    pub fn clear_token(&mut self) {
        self.app_token = None;
        self.touch();
    }

    pub fn set_verify_result(&mut self, result: Value) {
        self.verify_result = Some(result);
        self.touch();
    }

    pub fn set_profile(&mut self, profile: Value) {
        self.profile = Some(profile);
        self.touch();
    }
}
