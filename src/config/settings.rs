//! # Configuration Settings
//!
//! Defines the Vault connection settings consumed by the key client and the
//! logging settings consumed by the binary.

use crate::errors::{Result, VaultError};
use crate::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

/// Default Vault listener port
pub const DEFAULT_VAULT_PORT: u16 = 8200;

/// Default connect and request timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Connection settings for the Vault server.
///
/// The configuration is immutable for the lifetime of a client. Exactly one
/// token source is effective: the literal `token` when it is non-empty,
/// otherwise the contents of `token_file`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault server host name
    #[validate(length(min = 1, message = "Vault server name cannot be empty"))]
    pub server_name: String,

    /// Vault server port
    #[validate(range(min = 1, message = "Vault port must be between 1 and 65535"))]
    pub port: u16,

    /// Use plain HTTP instead of HTTPS
    pub disable_tls: bool,

    /// PEM bundle used instead of the built-in root certificates
    pub server_ca_file: Option<PathBuf>,

    /// Literal Vault token
    pub token: Option<SecretString>,

    /// File holding the Vault token
    pub token_file: Option<PathBuf>,

    /// Connect and request timeout in seconds
    #[validate(range(
        min = 1,
        max = 3600,
        message = "Vault timeout must be between 1 and 3600 seconds"
    ))]
    pub timeout_seconds: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            server_name: "127.0.0.1".to_string(),
            port: DEFAULT_VAULT_PORT,
            disable_tls: false,
            server_ca_file: None,
            token: None,
            token_file: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl VaultConfig {
    /// Create a configuration for `server_name:port` with defaults elsewhere
    pub fn new(server_name: impl Into<String>, port: u16) -> Self {
        Self { server_name: server_name.into(), port, ..Self::default() }
    }

    /// Set the literal token
    pub fn with_token(mut self, token: impl Into<SecretString>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the token file
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Set the CA bundle
    pub fn with_ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.server_ca_file = Some(path.into());
        self
    }

    /// Toggle plain HTTP
    pub fn with_tls_disabled(mut self, disable_tls: bool) -> Self {
        self.disable_tls = disable_tls;
        self
    }

    /// Set the timeout in seconds
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Connect and request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// URL scheme selected by the TLS toggle
    pub fn scheme(&self) -> &'static str {
        if self.disable_tls {
            "http"
        } else {
            "https"
        }
    }

    /// `<scheme>://<host>:<port>` without a trailing slash
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.server_name, self.port)
    }

    /// Whether a non-empty literal token is configured
    pub fn has_literal_token(&self) -> bool {
        self.token.as_ref().is_some_and(|token| !token.is_empty())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(VaultError::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if !self.has_literal_token() && self.token_file.is_none() {
            return Err(VaultError::config(
                "Vault token is not configured: set either a token or a token file",
            ));
        }

        if self.server_name.contains('/') || self.server_name.contains("://") {
            return Err(VaultError::config(format!(
                "Vault server name must be a bare host name, got '{}'",
                self.server_name
            )));
        }

        Ok(())
    }

    /// Create configuration from environment variables
    ///
    /// - `VAULT_SERVER_NAME` (default `127.0.0.1`)
    /// - `VAULT_PORT` (default `8200`)
    /// - `VAULT_DISABLE_TLS` (`1`/`true`/`yes`/`on`)
    /// - `VAULT_CACERT`
    /// - `VAULT_TOKEN`
    /// - `VAULT_TOKEN_FILE`
    /// - `VAULT_TIMEOUT_SECONDS` (default `15`)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let server_name = std::env::var("VAULT_SERVER_NAME")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.server_name);

        let port = match std::env::var("VAULT_PORT") {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| VaultError::config(format!("Invalid VAULT_PORT '{}': {}", value, e)))?,
            Err(_) => defaults.port,
        };

        let timeout_seconds = match std::env::var("VAULT_TIMEOUT_SECONDS") {
            Ok(value) => value.trim().parse().map_err(|e| {
                VaultError::config(format!("Invalid VAULT_TIMEOUT_SECONDS '{}': {}", value, e))
            })?,
            Err(_) => defaults.timeout_seconds,
        };

        let disable_tls = std::env::var("VAULT_DISABLE_TLS")
            .ok()
            .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            server_name,
            port,
            disable_tls,
            server_ca_file: non_empty_env("VAULT_CACERT").map(PathBuf::from),
            token: non_empty_env("VAULT_TOKEN").map(SecretString::new),
            token_file: non_empty_env("VAULT_TOKEN_FILE").map(PathBuf::from),
            timeout_seconds,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VaultError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Logging configuration for the binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json: false }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: non_empty_env("VAULT_KEYSTORE_LOG_LEVEL").unwrap_or(defaults.log_level),
            json: std::env::var("VAULT_KEYSTORE_LOG_JSON")
                .ok()
                .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.json),
        }
    }
}
