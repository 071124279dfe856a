// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use ::config::{Config as ConfigFile, Environment, File};

use crate::error::AuthError;

/// Privy's public API origin
pub const DEFAULT_PRIVY_API_URL: &str = "https://auth.privy.io";

/// Central configuration for the verification server and the session client
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web_server_addr: String,
    pub privy: PrivyConfig,
    pub backend: BackendConfig,
    pub client: ClientConfig,

    // Game assets served under /game
    pub static_files: StaticFilesConfig,
}

/// Credentials of the Privy app whose tokens are verified
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivyConfig {
    pub app_id: String,
    pub app_secret: String,
    /// PEM verification key; fetched from the Privy API when absent
    pub verification_key: Option<String>,
    pub api_url: String,
}

/// External backend that exchanges Privy tokens for application tokens
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub exchange_path: String,
    pub profile_path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Verification endpoint used for diagnostic checks
    pub verify_url: String,
    /// File backing the persistent token storage
    pub storage_path: String,
    /// Storage key under which the application session token lives
    pub storage_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub path: String,
    pub mount_path: String,
    pub index: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:3000".to_string(),
            privy: PrivyConfig::default(),
            backend: BackendConfig::default(),
            client: ClientConfig::default(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl Default for PrivyConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            verification_key: None,
            api_url: DEFAULT_PRIVY_API_URL.to_string(),
        }
    }
}

impl PrivyConfig {
    /// A verifier needs the app id plus either a key or the secret to fetch one
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.app_id.is_empty() {
            return Err(AuthError::Configuration("Privy app id is not set".to_string()));
        }
        if self.verification_key.is_none() && self.app_secret.is_empty() {
            return Err(AuthError::Configuration(
                "Privy app secret or verification key is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            exchange_path: "/api/v1/auth/privyAuth".to_string(),
            profile_path: "/api/v1/character/profile".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            verify_url: "http://127.0.0.1:3000/api/verify".to_string(),
            storage_path: "./.session/storage.json".to_string(),
            storage_key: "harvestia_token".to_string(),
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            path: "./public/game".to_string(),
            mount_path: "/game".to_string(),
            index: "index.html".to_string(),
        }
    }
}

/// First non-empty value among the given environment variables
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, ::config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Privy credentials keep their conventional variable names
            .set_override_option(
                "privy.app_id",
                first_env(&["PRIVY_APP_ID", "NEXT_PUBLIC_PRIVY_APP_ID"]),
            )?
            .set_override_option("privy.app_secret", first_env(&["PRIVY_APP_SECRET"]))?
            .set_override_option(
                "privy.verification_key",
                first_env(&["PRIVY_VERIFICATION_KEY"]),
            )?
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from files when possible, otherwise from plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");
                Self::from_plain_env()
            }
        }
    }

    fn from_plain_env() -> Self {
        let defaults = Self::default();

        let web_server_addr = first_env(&["WEB_SERVER_ADDR"]).unwrap_or(defaults.web_server_addr);

        let privy = PrivyConfig {
            app_id: first_env(&["PRIVY_APP_ID", "NEXT_PUBLIC_PRIVY_APP_ID"]).unwrap_or_default(),
            app_secret: first_env(&["PRIVY_APP_SECRET"]).unwrap_or_default(),
            verification_key: first_env(&["PRIVY_VERIFICATION_KEY"]),
            api_url: first_env(&["PRIVY_API_URL"]).unwrap_or(defaults.privy.api_url),
        };

        let backend = BackendConfig {
            base_url: first_env(&["BACKEND_BASE_URL"]).unwrap_or(defaults.backend.base_url),
            ..defaults.backend
        };

        let client = ClientConfig {
            verify_url: first_env(&["VERIFY_URL"]).unwrap_or(defaults.client.verify_url),
            storage_path: first_env(&["TOKEN_STORAGE_PATH"])
                .unwrap_or(defaults.client.storage_path),
            ..defaults.client
        };

        let static_files = StaticFilesConfig {
            path: first_env(&["STATIC_FILES_PATH"]).unwrap_or(defaults.static_files.path),
            ..defaults.static_files
        };

        Self {
            web_server_addr,
            privy,
            backend,
            client,
            static_files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.exchange_path, "/api/v1/auth/privyAuth");
        assert_eq!(config.client.storage_key, "harvestia_token");
        assert_eq!(config.privy.api_url, DEFAULT_PRIVY_API_URL);
    }

    #[test]
    fn test_privy_config_requires_app_id() {
        let privy = PrivyConfig {
            app_secret: "secret".to_string(),
            ..PrivyConfig::default()
        };
        assert!(matches!(privy.validate(), Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_privy_config_accepts_key_without_secret() {
        let privy = PrivyConfig {
            app_id: "app".to_string(),
            verification_key: Some("-----BEGIN PUBLIC KEY-----".to_string()),
            ..PrivyConfig::default()
        };
        assert!(privy.validate().is_ok());
    }
}
