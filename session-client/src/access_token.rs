// session-client/src/access_token.rs
use async_trait::async_trait;
use common::token::{cookie_value, PRIVY_TOKEN_COOKIE};

/// Where the current Privy access token comes from.
///
/// Resolves to `None` while the Privy session is not established.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

/// A token handed over explicitly, e.g. from the command line
#[derive(Debug, Clone, Default)]
pub struct StaticAccessToken {
    token: Option<String>,
}

impl StaticAccessToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl AccessTokenSource for StaticAccessToken {
    async fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// The `privy-token` entry of a cookie string
#[derive(Debug, Clone)]
pub struct CookieAccessToken {
    cookie_header: String,
}

impl CookieAccessToken {
    pub fn new(cookie_header: impl Into<String>) -> Self {
        Self {
            cookie_header: cookie_header.into(),
        }
    }
}

#[async_trait]
impl AccessTokenSource for CookieAccessToken {
    async fn access_token(&self) -> Option<String> {
        cookie_value(&self.cookie_header, PRIVY_TOKEN_COOKIE)
    }
}
