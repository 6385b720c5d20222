//! Vault token resolution.

use std::path::Path;

use tracing::debug;

use super::types::SecretString;
use crate::config::VaultConfig;
use crate::errors::{Result, VaultError};

/// Resolve the bearer token for one request.
///
/// A non-empty literal token wins. Otherwise the token file is read on every
/// call, so a rotated token file takes effect without restarting the process.
pub fn resolve_token(config: &VaultConfig) -> Result<SecretString> {
    if let Some(token) = config.token.as_ref().filter(|token| !token.is_empty()) {
        debug!("Using literal Vault token from configuration");
        return Ok(token.clone());
    }

    let path = config.token_file.as_deref().ok_or_else(|| {
        VaultError::config("Vault token is not configured: set either a token or a token file")
    })?;

    read_token_file(path)
}

/// Read a token from `path`, trimming surrounding whitespace.
pub fn read_token_file(path: &Path) -> Result<SecretString> {
    debug!(path = %path.display(), "Reading Vault token from file");

    check_permissions(path)?;

    let contents = std::fs::read_to_string(path).map_err(|e| {
        VaultError::config(format!("Failed to read Vault token file {}: {}", path.display(), e))
    })?;
    let contents = SecretString::new(contents);

    let token = contents.expose_secret().trim();
    if token.is_empty() {
        return Err(VaultError::config(format!(
            "Vault token file is empty: {}",
            path.display()
        )));
    }

    Ok(SecretString::new(token))
}

#[cfg(unix)]
fn check_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).map_err(|e| {
        VaultError::config(format!("Failed to read Vault token file {}: {}", path.display(), e))
    })?;

    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(VaultError::config(format!(
            "Permissions on Vault token file {} are too open ({:o}); it must not be accessible \
             by group or others",
            path.display(),
            mode & 0o777
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
