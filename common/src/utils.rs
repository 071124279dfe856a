// common/src/utils.rs
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

/// Setup tracing for consistent logging across services
///
/// Honours `RUST_LOG`, defaulting to `info`.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Hash a string using SHA-256
pub fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Short, log-safe identifier for a credential
pub fn token_fingerprint(token: &str) -> String {
    let mut hash = hash_string(token);
    hash.truncate(12);
    hash
}

/// Log line describing whether a token was provided
pub fn describe_token(token: Option<&str>) -> String {
    match token {
        Some(token) => format!("present (sha256:{})", token_fingerprint(token)),
        None => "Not provided".to_string(),
    }
}
