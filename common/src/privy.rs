// common/src/privy.rs
//! Verification of Privy identity tokens.
//!
//! Privy signs its tokens with ES256 using a per-app key pair. The public
//! half is either configured directly or looked up once through the Privy
//! API and kept for the life of the client. Verification results are never
//! cached.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::PrivyConfig;
use crate::error::AuthError;
use crate::models::user::LinkedAccount;

/// Issuer claim of every Privy token
pub const PRIVY_ISSUER: &str = "privy.io";

/// Claims as they appear inside the signed token
#[derive(Debug, Deserialize)]
struct PrivyTokenClaims {
    sid: String,
    iss: String,
    iat: i64,
    exp: i64,
    aud: String,
    sub: String,
    /// JSON-encoded account list, present on identity tokens
    #[serde(default)]
    linked_accounts: Option<String>,
}

/// Decoded claims returned to callers of the verification endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenClaims {
    pub app_id: String,
    pub issuer: String,
    pub issued_at: i64,
    pub expiration: i64,
    pub session_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_accounts: Option<Vec<LinkedAccount>>,
}

impl PrivyTokenClaims {
    fn into_auth_claims(self) -> AuthTokenClaims {
        let linked_accounts = self.linked_accounts.and_then(|raw| {
            serde_json::from_str::<Vec<LinkedAccount>>(&raw)
                .map_err(|e| tracing::warn!("Ignoring unreadable linked_accounts claim: {}", e))
                .ok()
        });

        AuthTokenClaims {
            app_id: self.aud,
            issuer: self.iss,
            issued_at: self.iat,
            expiration: self.exp,
            session_id: self.sid,
            user_id: self.sub,
            linked_accounts,
        }
    }
}

/// Anything able to turn a bearer token into verified claims
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_auth_token(&self, token: &str) -> Result<AuthTokenClaims, AuthError>;
}

/// App settings returned by the Privy API; only the key is of interest
#[derive(Debug, Deserialize)]
struct AppSettings {
    verification_key: String,
}

/// Server-side Privy client
pub struct PrivyClient {
    config: PrivyConfig,
    http_client: Client,
    verification_key: RwLock<Option<DecodingKey>>,
}

impl PrivyClient {
    pub fn new(config: PrivyConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let verification_key = config
            .verification_key
            .as_deref()
            .map(parse_verification_key)
            .transpose()?;

        Ok(Self {
            config,
            http_client: Client::new(),
            verification_key: RwLock::new(verification_key),
        })
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    async fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.verification_key.read().await.as_ref() {
            return Ok(key.clone());
        }

        let mut slot = self.verification_key.write().await;
        // Another request may have filled the slot while we waited
        if let Some(key) = slot.as_ref() {
            return Ok(key.clone());
        }

        let pem = self.fetch_verification_key().await?;
        let key = parse_verification_key(&pem)?;
        *slot = Some(key.clone());
        Ok(key)
    }

    async fn fetch_verification_key(&self) -> Result<String, AuthError> {
        let url = format!(
            "{}/api/v1/apps/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.app_id
        );
        tracing::info!("Fetching Privy verification key from {}", url);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.config.app_id, Some(&self.config.app_secret))
            .header("privy-app-id", &self.config.app_id)
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Failed to reach Privy API: {}", e)))?
            .error_for_status()
            .map_err(|e| AuthError::Network(format!("Privy API rejected key lookup: {}", e)))?;

        let settings: AppSettings = response
            .json()
            .await
            .map_err(|e| AuthError::Network(format!("Unreadable Privy app settings: {}", e)))?;

        Ok(settings.verification_key)
    }

    /// Check signature, issuer, audience and expiry against a known key
    pub fn verify_with_key(
        &self,
        token: &str,
        key: &DecodingKey,
    ) -> Result<AuthTokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_issuer(&[PRIVY_ISSUER]);
        validation.set_audience(&[self.config.app_id.as_str()]);

        decode::<PrivyTokenClaims>(token, key, &validation)
            .map(|data| data.claims.into_auth_claims())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AuthError::Verification("Authentication token expired".to_string())
                }
                _ => AuthError::Verification(format!(
                    "Failed to verify authentication token: {}",
                    e
                )),
            })
    }
}

#[async_trait]
impl TokenVerifier for PrivyClient {
    async fn verify_auth_token(&self, token: &str) -> Result<AuthTokenClaims, AuthError> {
        let key = self.decoding_key().await?;
        self.verify_with_key(token, &key)
    }
}

/// Parse a PEM public key, tolerating newlines escaped as `\n` in env vars
fn parse_verification_key(pem: &str) -> Result<DecodingKey, AuthError> {
    let pem = pem.replace("\\n", "\n");
    DecodingKey::from_ec_pem(pem.trim().as_bytes())
        .map_err(|e| AuthError::Configuration(format!("Invalid Privy verification key: {}", e)))
}
