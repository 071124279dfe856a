// session-client/src/flow.rs
//! Exchange of a Privy access token for an application session token.
//!
//! Every operation here is a single independent action: no retries, no
//! de-duplication of repeated calls, and failures stay scoped to the call
//! that produced them.

use common::models::{ExchangeRequest, ExchangeResponse, PrivyUser};
use common::token::{bearer_header, cookie_value, PRIVY_TOKEN_COOKIE};
use common::{describe_token, AuthError, Config};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::access_token::AccessTokenSource;
use crate::state::SessionState;
use crate::storage::TokenStore;

const EXCHANGE_NETWORK_ERROR: &str = "Failed to send data to custom endpoint";
const PROFILE_NETWORK_ERROR: &str = "Failed to fetch character profile";
const VERIFY_NETWORK_ERROR: &str = "Failed to reach verification endpoint";

/// Absolute URLs of the routes the flow talks to
#[derive(Debug, Clone)]
pub struct BackendEndpoints {
    pub exchange_url: Url,
    pub profile_url: Url,
    pub verify_url: Url,
}

impl BackendEndpoints {
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        let parse = |raw: &str| {
            Url::parse(raw)
                .map_err(|e| AuthError::Configuration(format!("Invalid URL '{}': {}", raw, e)))
        };

        let base = parse(&config.backend.base_url)?;
        let join = |route: &str| {
            base.join(route)
                .map_err(|e| AuthError::Configuration(format!("Invalid route '{}': {}", route, e)))
        };

        Ok(Self {
            exchange_url: join(&config.backend.exchange_path)?,
            profile_url: join(&config.backend.profile_path)?,
            verify_url: parse(&config.client.verify_url)?,
        })
    }
}

/// Tokens visible to the client, as reported by the diagnostics action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthTokenReport {
    pub cookie_token: Option<String>,
    pub header_token: Option<String>,
}

pub struct SessionFlow<S, A> {
    http_client: Client,
    endpoints: BackendEndpoints,
    store: S,
    access_tokens: A,
    storage_key: String,
    state: SessionState,
}

impl<S, A> SessionFlow<S, A>
where
    S: TokenStore,
    A: AccessTokenSource,
{
    pub fn new(
        endpoints: BackendEndpoints,
        store: S,
        access_tokens: A,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client: Client::new(),
            endpoints,
            store,
            access_tokens,
            storage_key: storage_key.into(),
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Entry point once the Privy SDK reports an authenticated user
    pub async fn start_session(
        &mut self,
        user: &PrivyUser,
        cookie_header: Option<&str>,
    ) -> Result<ExchangeResponse, AuthError> {
        tracing::info!(user_id = user.id().unwrap_or("<unknown>"), "User authenticated");
        self.log_auth_tokens(cookie_header).await;
        self.exchange(user).await
    }

    /// Report the cookie token and the SDK access token
    pub async fn log_auth_tokens(&self, cookie_header: Option<&str>) -> AuthTokenReport {
        let cookie_token =
            cookie_header.and_then(|header| cookie_value(header, PRIVY_TOKEN_COOKIE));
        let header_token = self.access_tokens.access_token().await;

        tracing::info!(
            "Client-side cookie auth token: {}",
            describe_token(cookie_token.as_deref())
        );
        tracing::info!(
            "Authorization header token: {}",
            describe_token(header_token.as_deref())
        );

        AuthTokenReport {
            cookie_token,
            header_token,
        }
    }

    /// Ask the verification endpoint about the current access token.
    ///
    /// The JSON body is returned whatever the status, since both the claims
    /// and the error shape are worth displaying.
    pub async fn verify_token(&mut self) -> Result<Value, AuthError> {
        let access_token = self.access_tokens.access_token().await;
        tracing::info!("Verifying access token: {}", describe_token(access_token.as_deref()));

        let request = with_bearer(
            self.http_client.get(self.endpoints.verify_url.clone()),
            access_token.as_deref(),
        );
        let result = read_json(request, VERIFY_NETWORK_ERROR).await?;

        tracing::info!("Token verification response: {}", result);
        self.state.set_verify_result(result.clone());
        Ok(result)
    }

    /// Trade the Privy access token and user object for an application token.
    ///
    /// Success persists the token and keeps it in memory. Any other JSON
    /// reply removes the stored and in-memory token. A failed request or a
    /// body that is not JSON leaves both as they are.
    pub async fn exchange(&mut self, user: &PrivyUser) -> Result<ExchangeResponse, AuthError> {
        let access_token = self.access_tokens.access_token().await;
        tracing::info!(
            "Sending to exchange endpoint with access token: {}",
            describe_token(access_token.as_deref())
        );

        let request = with_bearer(
            self.http_client
                .post(self.endpoints.exchange_url.clone())
                .json(&ExchangeRequest { body_auth_token: user }),
            access_token.as_deref(),
        );

        let body = match read_json(request, EXCHANGE_NETWORK_ERROR).await {
            Ok(body) => body,
            Err(e) => {
                self.state.record_failure(e.to_error_body());
                return Err(e);
            }
        };

        let response = ExchangeResponse::from(body);

        match response.session_token() {
            Some(token) => {
                let token = token.to_string();
                tracing::info!("Application token received: {}", describe_token(Some(&token)));
                self.store.set(&self.storage_key, &token)?;
                self.state.authenticate(token, &response);
                Ok(response)
            }
            None => {
                let err = AuthError::Exchange(response.failure_message());
                tracing::error!("Failed to retrieve token: {}", err);
                if let Err(storage_err) = self.store.remove(&self.storage_key) {
                    tracing::warn!("Could not clear stored token: {}", storage_err);
                }
                self.state.reject(err.to_error_body());
                Err(err)
            }
        }
    }

    /// In-memory token first, then the stored one; empty values count as absent
    pub fn current_session_token(&self) -> Result<Option<String>, AuthError> {
        let in_memory = self.state.app_token.clone().filter(|token| !token.is_empty());
        match in_memory {
            Some(token) => Ok(Some(token)),
            None => Ok(self.store.get(&self.storage_key)?.filter(|token| !token.is_empty())),
        }
    }

    /// Fetch the profile resource; no request is made without a token
    pub async fn fetch_profile(&mut self) -> Result<Value, AuthError> {
        let token = match self.current_session_token()? {
            Some(token) => token,
            None => {
                tracing::error!("No application token available");
                return Err(AuthError::NoSessionToken);
            }
        };

        tracing::info!(
            "Fetching profile with application token: {}",
            describe_token(Some(&token))
        );

        let request = with_bearer(
            self.http_client.get(self.endpoints.profile_url.clone()),
            Some(&token),
        );
        let profile = read_json(request, PROFILE_NETWORK_ERROR).await?;

        tracing::info!("Profile response: {}", profile);
        self.state.set_profile(profile.clone());
        Ok(profile)
    }

    /// Forget the application token, both stored and in memory
    pub fn clear_session(&mut self) -> Result<(), AuthError> {
        self.store.remove(&self.storage_key)?;
        self.state.clear_token();
        tracing::info!("Application token cleared");
        Ok(())
    }
}

/// Pretty-printed user object, as it is embedded in the exchange body
pub fn log_body(user: &PrivyUser) -> serde_json::Result<String> {
    let body = serde_json::to_string_pretty(user)?;
    tracing::info!("Request body user object:\n{}", body);
    Ok(body)
}

/// The header is left out entirely when there is no token
fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header(AUTHORIZATION, bearer_header(token)),
        None => request,
    }
}

async fn read_json(request: RequestBuilder, failure: &str) -> Result<Value, AuthError> {
    let response = request.send().await.map_err(|e| {
        tracing::error!("{}: {}", failure, e);
        AuthError::Network(failure.to_string())
    })?;

    response.json::<Value>().await.map_err(|e| {
        tracing::error!("{}: unreadable response: {}", failure, e);
        AuthError::Network(failure.to_string())
    })
}
