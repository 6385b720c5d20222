//! Blocking facade over [`VaultKeyClient`].
//!
//! For callers without an async runtime, such as a server fetching its
//! encryption key during synchronous startup. Each call blocks the calling
//! thread for one round trip, bounded by the configured timeout.

use tokio::runtime::{Builder, Runtime};

use super::types::{SecretVersion, VersionedSecret};
use super::vault::VaultKeyClient;
use crate::config::VaultConfig;
use crate::errors::{Result, VaultError};

/// Blocking Vault KV v2 key client.
///
/// Owns a private current-thread runtime. Do not call it from inside an
/// async context; use [`VaultKeyClient`] there.
pub struct BlockingVaultKeyClient {
    inner: VaultKeyClient,
    runtime: Runtime,
}

impl BlockingVaultKeyClient {
    pub fn new(config: VaultConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build().map_err(|e| {
            VaultError::config(format!("Failed to start Vault client runtime: {}", e))
        })?;
        let inner = VaultKeyClient::new(config)?;

        Ok(Self { inner, runtime })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(VaultConfig::from_env()?)
    }

    pub fn config(&self) -> &VaultConfig {
        self.inner.config()
    }

    /// Blocking [`VaultKeyClient::read_secret`].
    pub fn read_secret(&self, path: &str, version: SecretVersion) -> Result<VersionedSecret> {
        self.runtime.block_on(self.inner.read_secret(path, version))
    }

    /// Blocking [`VaultKeyClient::write_secret`].
    pub fn write_secret(&self, path: &str, value: &str) -> Result<SecretVersion> {
        self.runtime.block_on(self.inner.write_secret(path, value))
    }
}

impl std::fmt::Debug for BlockingVaultKeyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingVaultKeyClient").field("inner", &self.inner).finish()
    }
}
