use std::path::Path;

use crate::errors::{Result, VaultError};

/// Load the PEM CA bundle used to verify the Vault server.
///
/// Every certificate in the file is returned; an unreadable file, a file
/// without certificates or a malformed PEM block is a configuration error.
pub fn load_ca_bundle(path: &Path) -> Result<Vec<reqwest::Certificate>> {
    let pem = std::fs::read(path).map_err(|e| {
        VaultError::config(format!("Failed to read Vault CA file {}: {}", path.display(), e))
    })?;

    let certificates = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
        VaultError::config(format!("Invalid Vault CA file {}: {}", path.display(), e))
    })?;

    if certificates.is_empty() {
        return Err(VaultError::config(format!(
            "Vault CA file {} contains no certificates",
            path.display()
        )));
    }

    Ok(certificates)
}
