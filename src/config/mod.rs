//! # Configuration Management
//!
//! Vault connection settings, logging settings and CA bundle loading.

mod settings;
mod tls;

pub use settings::{LoggingConfig, VaultConfig, DEFAULT_TIMEOUT_SECONDS, DEFAULT_VAULT_PORT};
pub use tls::load_ca_bundle;
