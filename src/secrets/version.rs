//! Version extraction and reconciliation.

use serde_json::{Map, Value};

use super::types::SecretVersion;
use crate::errors::{Result, VaultError, VersionFault};

/// Path of the version field in a read envelope
pub const READ_VERSION_FIELD: &str = "data.metadata.version";

/// Path of the version field in a write envelope
pub const WRITE_VERSION_FIELD: &str = "data.version";

/// Extract the `version` member of `node` as a strictly positive integer.
///
/// `field` is the full path of the member and only feeds error messages.
pub fn parse_version(node: &Map<String, Value>, field: &'static str) -> Result<SecretVersion> {
    let value =
        node.get("version").ok_or_else(|| VaultError::version(field, VersionFault::Missing))?;

    let Value::Number(number) = value else {
        return Err(VaultError::version(field, VersionFault::NotInteger));
    };

    if let Some(version) = number.as_u64() {
        return match version {
            0 => Err(VaultError::version(field, VersionFault::NonPositive)),
            // Vault versions are signed 64-bit integers
            v if v > i64::MAX as u64 => Err(VaultError::version(field, VersionFault::NotInteger)),
            v => Ok(SecretVersion::new(v)),
        };
    }

    if number.is_i64() {
        // as_u64 failed, so the value is negative
        return Err(VaultError::version(field, VersionFault::NonPositive));
    }

    Err(VaultError::version(field, VersionFault::NotInteger))
}

/// Check the version Vault returned against the one the caller asked for.
pub fn reconcile(requested: SecretVersion, got: SecretVersion) -> Result<SecretVersion> {
    if !requested.is_latest() && requested != got {
        return Err(VaultError::version_mismatch(requested.get(), got.get()));
    }
    Ok(got)
}
