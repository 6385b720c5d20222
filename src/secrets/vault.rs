//! HashiCorp Vault KV v2 key client.
//!
//! Every call resolves the token, performs exactly one round trip and
//! validates the response before anything is returned. There is no caching
//! and no retry; the caller owns both decisions.
//!
//! # Example
//!
//! ```rust,ignore
//! use vault_keystore::config::VaultConfig;
//! use vault_keystore::secrets::{SecretVersion, VaultKeyClient};
//!
//! let config = VaultConfig::new("vault.local", 8200).with_token_file("/etc/vault/token");
//! let client = VaultKeyClient::new(config)?;
//!
//! let key = client.read_secret("secret/data/db-key", SecretVersion::LATEST).await?;
//! if key.is_not_found() {
//!     let version = client.write_secret("secret/data/db-key", &generate_key()).await?;
//! }
//! ```

use async_trait::async_trait;
use tracing::{debug, info, Instrument};

use super::client::KeyVault;
use super::request::{build_read, build_write, Operation};
use super::response::{validate_read, validate_write};
use super::token::resolve_token;
use super::transport::Transport;
use super::types::{SecretVersion, VersionedSecret};
use super::version::{parse_version, reconcile, READ_VERSION_FIELD, WRITE_VERSION_FIELD};
use crate::config::VaultConfig;
use crate::errors::Result;
use crate::vault_span;

/// Vault KV v2 client for versioned key material.
///
/// `Send + Sync` and free of mutable state; share it behind an `Arc` to
/// issue calls from many tasks at once.
#[derive(Debug, Clone)]
pub struct VaultKeyClient {
    config: VaultConfig,
    transport: Transport,
}

impl VaultKeyClient {
    /// Creates a client for the server described by `config`.
    ///
    /// # Errors
    ///
    /// [`VaultError::Configuration`](crate::VaultError::Configuration) when the
    /// configuration is invalid or the CA bundle cannot be loaded.
    pub fn new(config: VaultConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::new(&config)?;

        info!(
            server = %config.server_name,
            port = config.port,
            tls = !config.disable_tls,
            ca_file = ?config.server_ca_file,
            timeout_seconds = config.timeout_seconds,
            "Vault key client configured"
        );

        Ok(Self { config, transport })
    }

    /// Creates a client from `VAULT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(VaultConfig::from_env()?)
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Read the secret at `path`, optionally pinned to `version`.
    ///
    /// See [`KeyVault::read_secret`].
    pub async fn read_secret(&self, path: &str, version: SecretVersion) -> Result<VersionedSecret> {
        let span = vault_span!(Operation::Read.as_str(), path, requested_version = version.get());

        async move {
            let token = resolve_token(&self.config)?;
            let request = build_read(&self.config, path, version, token);

            let response = self.transport.execute(&request).await?;
            debug!(http_code = response.status, "HTTP code (GET)");

            let Some(envelope) = validate_read(&response)? else {
                info!("Secret does not exist in Vault");
                return Ok(VersionedSecret::not_found());
            };

            let got = parse_version(&envelope.metadata, READ_VERSION_FIELD)?;
            let version = reconcile(version, got)?;

            debug!(version = version.get(), "Read secret from Vault");
            Ok(VersionedSecret { value: envelope.value, version })
        }
        .instrument(span)
        .await
    }

    /// Store `value` as a new revision at `path`.
    ///
    /// See [`KeyVault::write_secret`].
    pub async fn write_secret(&self, path: &str, value: &str) -> Result<SecretVersion> {
        let span = vault_span!(Operation::Write.as_str(), path);

        async move {
            let token = resolve_token(&self.config)?;
            let request = build_write(&self.config, path, value, token)?;

            let response = self.transport.execute(&request).await?;
            debug!(http_code = response.status, "HTTP code (POST)");

            let envelope = validate_write(&response)?;
            let version = parse_version(&envelope.data, WRITE_VERSION_FIELD)?;

            info!(version = version.get(), "Stored new secret version in Vault");
            Ok(version)
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl KeyVault for VaultKeyClient {
    async fn read_secret(&self, path: &str, version: SecretVersion) -> Result<VersionedSecret> {
        VaultKeyClient::read_secret(self, path, version).await
    }

    async fn write_secret(&self, path: &str, value: &str) -> Result<SecretVersion> {
        VaultKeyClient::write_secret(self, path, value).await
    }
}
