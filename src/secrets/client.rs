//! The key vault seam used by the enclosing process.

use async_trait::async_trait;

use super::types::{SecretVersion, VersionedSecret};
use crate::errors::Result;

/// Versioned key storage.
///
/// This is the whole boundary the database process relies on for encryption
/// key retrieval and rotation.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use vault_keystore::secrets::{KeyVault, SecretVersion, VersionedSecret};
/// use vault_keystore::Result;
/// use async_trait::async_trait;
///
/// struct FixedKey;
///
/// #[async_trait]
/// impl KeyVault for FixedKey {
///     async fn read_secret(&self, _path: &str, _version: SecretVersion) -> Result<VersionedSecret> {
///         Ok(VersionedSecret::new("k3y", SecretVersion::new(1)))
///     }
///
///     async fn write_secret(&self, _path: &str, _value: &str) -> Result<SecretVersion> {
///         Ok(SecretVersion::new(2))
///     }
/// }
/// ```
#[async_trait]
pub trait KeyVault: Send + Sync {
    /// Read the secret at `path`.
    ///
    /// With [`SecretVersion::LATEST`] the newest revision is returned; any
    /// other version must match the revision Vault returns exactly.
    ///
    /// A path that does not exist is not an error: the result is
    /// [`VersionedSecret::not_found`], an empty value at version 0.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Configuration`](crate::VaultError::Configuration) if no usable token
    /// - [`VaultError::Transport`](crate::VaultError::Transport) if Vault is unreachable
    /// - [`VaultError::Remote`](crate::VaultError::Remote) for non-2xx statuses other than 404
    /// - [`VaultError::ResponseFormat`](crate::VaultError::ResponseFormat) for a bad envelope
    /// - [`VaultError::Version`](crate::VaultError::Version) for a bad version field
    /// - [`VaultError::VersionMismatch`](crate::VaultError::VersionMismatch) if pinned
    ///   and Vault returned another revision
    async fn read_secret(&self, path: &str, version: SecretVersion) -> Result<VersionedSecret>;

    /// Store `value` as a new revision of the secret at `path` and return the
    /// revision number Vault assigned. Any non-2xx status, 404 included, is an error.
    async fn write_secret(&self, path: &str, value: &str) -> Result<SecretVersion>;
}
