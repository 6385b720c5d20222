//! # Vault Keystore
//!
//! Client for reading and rotating versioned encryption keys stored in a
//! HashiCorp Vault KV v2 secrets engine.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vault_keystore::{SecretVersion, VaultConfig, VaultKeyClient};
//!
//! #[tokio::main]
//! async fn main() -> vault_keystore::Result<()> {
//!     let config = VaultConfig::new("vault.local", 8200).with_token_file("/etc/vault/token");
//!     let client = VaultKeyClient::new(config)?;
//!
//!     let key = client.read_secret("secret/data/db-key", SecretVersion::LATEST).await?;
//!     if key.is_not_found() {
//!         client.write_secret("secret/data/db-key", "new-key-material").await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod secrets;

pub use config::{LoggingConfig, VaultConfig};
pub use errors::{ErrorKind, Result, VaultError};
pub use secrets::{
    BlockingVaultKeyClient, KeyVault, SecretString, SecretVersion, VaultKeyClient, VersionedSecret,
};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
