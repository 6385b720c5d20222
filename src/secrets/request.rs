//! Request construction for KV v2 reads and writes.
//!
//! Building a request is pure: no I/O, no retries. The token is carried as a
//! [`SecretString`] until the transport puts it on the wire.

use reqwest::Method;
use serde::Serialize;

use super::types::{SecretString, SecretVersion};
use crate::config::VaultConfig;
use crate::errors::{Result, VaultError};

/// Header carrying the Vault token
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Which side of the KV v2 API a request talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    pub fn method(self) -> Method {
        match self {
            Operation::Read => Method::GET,
            Operation::Write => Method::POST,
        }
    }

    /// Context string used in transport error messages.
    pub fn context(self) -> &'static str {
        match self {
            Operation::Read => "reading key from the Vault",
            Operation::Write => "writing key to the Vault",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
        }
    }
}

/// A fully formed request, ready for the transport.
#[derive(Debug, Clone)]
pub struct VaultRequest {
    pub operation: Operation,
    pub url: String,
    pub token: SecretString,
    /// Serialized JSON body for writes. Holds key material, hence redacted.
    pub body: Option<SecretString>,
}

impl VaultRequest {
    pub fn method(&self) -> Method {
        self.operation.method()
    }
}

#[derive(Serialize)]
struct WriteBody<'a> {
    data: WriteData<'a>,
}

#[derive(Serialize)]
struct WriteData<'a> {
    value: &'a str,
}

/// `<scheme>://<host>:<port>/v1/<path>`; the secret path is used verbatim.
pub fn secret_url(config: &VaultConfig, path: &str) -> String {
    format!("{}/v1/{}", config.base_url(), path)
}

/// Build a GET for `path`, pinned to `version` unless it is [`SecretVersion::LATEST`].
pub fn build_read(
    config: &VaultConfig,
    path: &str,
    version: SecretVersion,
    token: SecretString,
) -> VaultRequest {
    let mut url = secret_url(config, path);
    if !version.is_latest() {
        url.push_str(&format!("?version={}", version));
    }

    VaultRequest { operation: Operation::Read, url, token, body: None }
}

/// Build a POST storing `value` under `path` as `{"data":{"value":...}}`.
pub fn build_write(
    config: &VaultConfig,
    path: &str,
    value: &str,
    token: SecretString,
) -> Result<VaultRequest> {
    let body = serde_json::to_string(&WriteBody { data: WriteData { value } })
        .map_err(|e| VaultError::config(format!("Failed to encode Vault write request: {}", e)))?;

    Ok(VaultRequest {
        operation: Operation::Write,
        url: secret_url(config, path),
        token,
        body: Some(SecretString::new(body)),
    })
}
