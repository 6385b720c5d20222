//! TLS-verified HTTP transport to Vault.
//!
//! The transport is built once per client as a sequence of named, fallible
//! configuration steps. Peer certificate and host name verification are
//! always on; a configured CA bundle replaces the built-in roots but never
//! relaxes verification.

use std::error::Error as StdError;
use std::sync::Once;

use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, error, trace};

use super::request::{VaultRequest, VAULT_TOKEN_HEADER};
use crate::config::{load_ca_bundle, VaultConfig};
use crate::errors::{Result, VaultError};
use crate::{APP_NAME, VERSION};

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the process-wide rustls crypto provider.
///
/// Safe to call any number of times; only the first call does any work, and an
/// already-installed provider (e.g. from the host process) is left in place.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        use rustls::crypto::{ring, CryptoProvider};

        if CryptoProvider::get_default().is_none()
            && ring::default_provider().install_default().is_err()
        {
            debug!("rustls crypto provider was installed concurrently");
        }
    });
}

/// Status code and raw body of one round trip.
#[derive(Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("body", &format!("[{} bytes]", self.body.len()))
            .finish()
    }
}

type ConfigureStep = fn(ClientBuilder, &VaultConfig) -> Result<ClientBuilder>;

const CONFIGURE_STEPS: &[(&str, ConfigureStep)] = &[
    ("tls-verification", configure_tls_verification),
    ("load-ca-bundle", configure_ca_bundle),
    ("timeouts", configure_timeouts),
    ("redirects", configure_redirects),
];

fn configure_tls_verification(
    builder: ClientBuilder,
    config: &VaultConfig,
) -> Result<ClientBuilder> {
    Ok(builder
        .use_rustls_tls()
        .danger_accept_invalid_certs(false)
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .https_only(!config.disable_tls))
}

fn configure_ca_bundle(builder: ClientBuilder, config: &VaultConfig) -> Result<ClientBuilder> {
    let Some(path) = config.server_ca_file.as_deref() else {
        return Ok(builder);
    };

    let certificates = load_ca_bundle(path)?;
    debug!(ca_file = %path.display(), certificates = certificates.len(), "Using Vault CA bundle");

    Ok(certificates
        .into_iter()
        .fold(builder.tls_built_in_root_certs(false), |builder, cert| {
            builder.add_root_certificate(cert)
        }))
}

fn configure_timeouts(builder: ClientBuilder, config: &VaultConfig) -> Result<ClientBuilder> {
    let timeout = config.timeout();
    Ok(builder.connect_timeout(timeout).timeout(timeout))
}

// Redirects are never followed; a 3xx reaches the validator as a status.
fn configure_redirects(builder: ClientBuilder, _config: &VaultConfig) -> Result<ClientBuilder> {
    Ok(builder.redirect(reqwest::redirect::Policy::none()))
}

/// HTTP session to one Vault server.
///
/// Cloning is cheap and clones share the connection pool, which is released
/// when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    /// Build the transport for `config`.
    pub fn new(config: &VaultConfig) -> Result<Self> {
        install_crypto_provider();

        let builder = Client::builder().user_agent(format!("{}/{}", APP_NAME, VERSION));
        let builder = CONFIGURE_STEPS.iter().try_fold(builder, |builder, (name, step)| {
            step(builder, config).inspect_err(|e| {
                error!(step = %name, error = %e, "Failed to configure Vault transport");
            })
        })?;

        let client = builder.build().map_err(|e| {
            error!(step = "build-client", error = %e, "Failed to configure Vault transport");
            VaultError::config(format!("Failed to build Vault HTTP client: {}", error_chain(&e)))
        })?;

        Ok(Self { client })
    }

    /// Perform one round trip and collect the status and the full body.
    pub async fn execute(&self, request: &VaultRequest) -> Result<RawResponse> {
        let mut token = HeaderValue::from_str(request.token.expose_secret()).map_err(|_| {
            VaultError::config("Vault token contains characters not allowed in an HTTP header")
        })?;
        token.set_sensitive(true);

        trace!(method = %request.method(), url = %request.url, "Sending Vault request");

        let mut builder =
            self.client.request(request.method(), &request.url).header(VAULT_TOKEN_HEADER, token);
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.expose_secret().to_owned());
        }

        let context = request.operation.context();
        let response = builder
            .send()
            .await
            .map_err(|e| VaultError::transport(context, error_chain(&e)))?;

        let status = response.status().as_u16();
        let body =
            response.bytes().await.map_err(|e| VaultError::transport(context, error_chain(&e)))?;

        Ok(RawResponse { status, body })
    }
}

/// Render an error and its sources as one diagnostic line.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
