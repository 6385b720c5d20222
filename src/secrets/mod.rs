//! Versioned secret access for HashiCorp Vault's KV v2 engine.
//!
//! Used by the database server to fetch its encryption key at startup and to
//! store a new key version on rotation.
//!
//! # Architecture
//!
//! Both operations share one pipeline:
//!
//! ```text
//! token → request → transport → response → version → VersionedSecret / SecretVersion
//! ```
//!
//! - [`token`]: literal token or token file, resolved on every call
//! - [`request`]: URL, `X-Vault-Token` header, JSON write body
//! - [`transport`]: TLS-verified reqwest session with connect/request timeouts
//! - [`response`]: status and envelope validation
//! - [`version`]: version extraction and pinned-version reconciliation
//!
//! A read of a missing path returns [`VersionedSecret::not_found`] rather than
//! an error, so callers can tell "no key yet" from every failure.
//!
//! # Security Considerations
//!
//! - Tokens and key material are [`SecretString`]s: redacted and zeroed on drop
//! - Certificate and host name verification cannot be turned off
//! - Redirects are not followed, so the token only goes to the configured host

pub mod blocking;
pub mod client;
pub mod request;
pub mod response;
pub mod token;
pub mod transport;
pub mod types;
pub mod vault;
pub mod version;

pub use blocking::BlockingVaultKeyClient;
pub use client::KeyVault;
pub use transport::install_crypto_provider;
pub use types::{SecretString, SecretVersion, VersionedSecret};
pub use vault::VaultKeyClient;
