// common/src/models/exchange.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::user::PrivyUser;

/// Status value the backend uses for a successful exchange
pub const EXCHANGE_SUCCESS: &str = "success";

/// Body posted to the backend's exchange route
#[derive(Debug, Serialize)]
pub struct ExchangeRequest<'a> {
    #[serde(rename = "bodyAuthToken")]
    pub body_auth_token: &'a PrivyUser,
}

/// Reply of the backend's exchange route.
///
/// Every field is read loosely: any JSON object is a valid reply, and
/// whether it grants a token is decided by `session_token`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Value> for ExchangeResponse {
    /// A body that is not a JSON object becomes a reply without status
    fn from(body: Value) -> Self {
        match serde_json::from_value(body.clone()) {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!("Exchange reply is not a JSON object: {}", body);
                Self::default()
            }
        }
    }
}

impl ExchangeResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_ref().and_then(Value::as_str) == Some(EXCHANGE_SUCCESS)
    }

    /// Application session token carried by a successful reply
    pub fn session_token(&self) -> Option<&str> {
        if !self.is_success() {
            return None;
        }
        self.data
            .as_ref()
            .and_then(|data| data.get("token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
    }

    /// Reason reported by the backend for a failed exchange
    pub fn failure_message(&self) -> String {
        match &self.message {
            Some(Value::String(message)) => message.clone(),
            Some(message) => message.to_string(),
            None => match &self.status {
                Some(Value::String(status)) => format!("Exchange failed with status '{}'", status),
                Some(status) => format!("Exchange failed with status {}", status),
                None => "Exchange failed without a status".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Value) -> ExchangeResponse {
        ExchangeResponse::from(body)
    }

    #[test]
    fn test_request_uses_body_auth_token_field() {
        let user: PrivyUser = serde_json::from_value(json!({ "id": "did:privy:1" })).unwrap();
        let body = serde_json::to_value(ExchangeRequest { body_auth_token: &user }).unwrap();
        assert_eq!(body, json!({ "bodyAuthToken": { "id": "did:privy:1" } }));
    }

    #[test]
    fn test_success_carries_token() {
        let response = response(json!({ "status": "success", "data": { "token": "xyz" } }));
        assert!(response.is_success());
        assert_eq!(response.session_token(), Some("xyz"));
    }

    #[test]
    fn test_error_exposes_message() {
        let response = response(json!({ "status": "error", "message": "bad" }));
        assert!(!response.is_success());
        assert_eq!(response.session_token(), None);
        assert_eq!(response.failure_message(), "bad");
    }

    #[test]
    fn test_token_ignored_without_success_status() {
        let response = response(json!({ "status": "pending", "data": { "token": "xyz" } }));
        assert_eq!(response.session_token(), None);
        assert_eq!(response.failure_message(), "Exchange failed with status 'pending'");
    }

    #[test]
    fn test_odd_shapes_are_failures_not_parse_errors() {
        let missing_status = response(json!({ "message": "Unauthorized" }));
        assert!(!missing_status.is_success());
        assert_eq!(missing_status.failure_message(), "Unauthorized");

        let numeric_status = response(json!({ "status": 401, "message": "bad" }));
        assert!(!numeric_status.is_success());
        assert_eq!(numeric_status.failure_message(), "bad");

        let object_message = response(json!({ "status": "error", "message": { "code": 7 } }));
        assert_eq!(object_message.failure_message(), r#"{"code":7}"#);

        let numeric_only = response(json!({ "status": 500 }));
        assert_eq!(numeric_only.failure_message(), "Exchange failed with status 500");

        let not_an_object = response(json!(["success"]));
        assert_eq!(not_an_object.session_token(), None);
        assert_eq!(not_an_object.failure_message(), "Exchange failed without a status");
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let body = json!({
            "status": "success",
            "data": { "token": "xyz", "expiresIn": 3600 },
            "message": "Authenticated",
            "requestId": "req-1"
        });
        let response = response(body.clone());
        assert_eq!(response.extra["requestId"], "req-1");
        assert_eq!(serde_json::to_value(&response).unwrap(), body);
    }
}
