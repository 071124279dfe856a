// common/src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failures shared by the verification server and the session client.
///
/// Every variant is scoped to the single request or user action that
/// produced it; none of them is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was presented (neither cookie nor header)
    #[error("Missing auth token")]
    MissingToken,

    /// The verifier rejected the token; the reason is propagated as-is
    #[error("{0}")]
    Verification(String),

    /// A request failed or the peer answered with something unreadable
    #[error("{0}")]
    Network(String),

    /// The backend answered the exchange with a non-success status
    #[error("{0}")]
    Exchange(String),

    /// No application session token is held in memory or in storage
    #[error("Please get an auth token first by running the authentication exchange")]
    NoSessionToken,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// JSON body used both for HTTP error responses and for client-side results
    pub fn to_error_body(&self) -> serde_json::Value {
        json!({ "error": self.to_string() })
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::Verification(_) | AuthError::NoSessionToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Network(_) | AuthError::Exchange(_) => StatusCode::BAD_GATEWAY,
            AuthError::Storage(_) | AuthError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_error_body())
    }
}
