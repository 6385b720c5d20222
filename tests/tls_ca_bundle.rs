//! TLS tests for private CA bundles.
//!
//! A throwaway CA signs a certificate for a local TLS listener that speaks
//! just enough HTTP/1.1 to answer one KV v2 read per connection.

use std::io::Write;
use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Context;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, KeyUsagePurpose, SanType,
};
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio_rustls::rustls::{self, ServerConfig};
use tokio_rustls::TlsAcceptor;
use vault_keystore::config::load_ca_bundle;
use vault_keystore::secrets::install_crypto_provider;
use vault_keystore::{SecretVersion, VaultConfig, VaultError, VaultKeyClient};

const KEY_PATH: &str = "secret/data/db-key";
const READ_BODY: &str = r#"{"data":{"metadata":{"version":3},"data":{"value":"k3y"}}}"#;

/// Ephemeral certificate authority for a single test.
struct TestCa {
    cert: Certificate,
    key: KeyPair,
}

impl TestCa {
    fn new(name: &str) -> anyhow::Result<Self> {
        let mut params = CertificateParams::new(Vec::<String>::new()).context("ca params")?;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        params.distinguished_name.push(DnType::CommonName, name);

        let key = KeyPair::generate().context("generate ca key")?;
        let cert = params.self_signed(&key).context("self-sign ca")?;
        Ok(Self { cert, key })
    }

    /// Server certificate for `localhost` and `127.0.0.1`.
    fn issue_server_cert(
        &self,
    ) -> anyhow::Result<(CertificateDer<'static>, PrivateKeyDer<'static>)> {
        let mut params =
            CertificateParams::new(vec!["localhost".to_string()]).context("server params")?;
        params.subject_alt_names.push(SanType::IpAddress(Ipv4Addr::LOCALHOST.into()));
        params.distinguished_name.push(DnType::CommonName, "vault.test");
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];

        let key = KeyPair::generate().context("generate server key")?;
        let cert = params.signed_by(&key, &self.cert, &self.key).context("sign server cert")?;

        let private_key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));
        Ok((cert.der().clone(), private_key))
    }

    fn pem(&self) -> String {
        self.cert.pem()
    }

    fn write_bundle(cas: &[&TestCa]) -> anyhow::Result<NamedTempFile> {
        let mut file = NamedTempFile::new().context("create ca file")?;
        for ca in cas {
            file.write_all(ca.pem().as_bytes()).context("write ca file")?;
        }
        Ok(file)
    }
}

/// Start a TLS listener on 127.0.0.1 that answers every request with `READ_BODY`.
async fn spawn_vault_listener(ca: &TestCa) -> anyhow::Result<u16> {
    install_crypto_provider();

    let (cert, key) = ca.issue_server_cert()?;
    let provider = rustls::crypto::ring::default_provider();
    let config = ServerConfig::builder_with_provider(provider.into())
        .with_safe_default_protocol_versions()
        .context("protocol versions")?
        .with_no_client_auth()
        .with_single_cert(vec![cert], key)
        .context("server certificate")?;
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.context("bind")?;
    let port = listener.local_addr().context("local addr")?.port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // Clients that reject the certificate end here.
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\
                     connection: close\r\n\r\n{}",
                    READ_BODY.len(),
                    READ_BODY
                );
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    Ok(port)
}

#[test]
fn test_load_ca_bundle_returns_every_certificate() {
    let first = TestCa::new("Vault Test CA 1").unwrap();
    let second = TestCa::new("Vault Test CA 2").unwrap();
    let bundle = TestCa::write_bundle(&[&first, &second]).unwrap();

    let certificates = load_ca_bundle(bundle.path()).unwrap();
    assert_eq!(certificates.len(), 2);
}

#[test]
fn test_client_builds_with_valid_ca_bundle() {
    let ca = TestCa::new("Vault Test CA").unwrap();
    let bundle = TestCa::write_bundle(&[&ca]).unwrap();

    let config =
        VaultConfig::new("vault.local", 8200).with_token("s.token").with_ca_file(bundle.path());
    assert!(VaultKeyClient::new(config).is_ok());
}

#[tokio::test]
async fn test_server_signed_by_configured_ca_is_trusted() {
    let ca = TestCa::new("Vault Test CA").unwrap();
    let bundle = TestCa::write_bundle(&[&ca]).unwrap();
    let port = spawn_vault_listener(&ca).await.unwrap();

    let config =
        VaultConfig::new("127.0.0.1", port).with_token("s.token").with_ca_file(bundle.path());
    let client = VaultKeyClient::new(config).unwrap();

    let secret = client.read_secret(KEY_PATH, SecretVersion::LATEST).await.unwrap();
    assert_eq!(secret.value.expose_secret(), "k3y");
    assert_eq!(secret.version.get(), 3);
}

#[tokio::test]
async fn test_built_in_roots_do_not_trust_private_ca() {
    let ca = TestCa::new("Vault Test CA").unwrap();
    let port = spawn_vault_listener(&ca).await.unwrap();

    let config = VaultConfig::new("127.0.0.1", port).with_token("s.token");
    let client = VaultKeyClient::new(config).unwrap();

    let err = client.read_secret(KEY_PATH, SecretVersion::LATEST).await.unwrap_err();
    assert!(matches!(err, VaultError::Transport { .. }));
}

#[tokio::test]
async fn test_ca_bundle_without_issuer_is_rejected() {
    let server_ca = TestCa::new("Vault Test CA").unwrap();
    let other_ca = TestCa::new("Unrelated CA").unwrap();
    let bundle = TestCa::write_bundle(&[&other_ca]).unwrap();
    let port = spawn_vault_listener(&server_ca).await.unwrap();

    let config =
        VaultConfig::new("127.0.0.1", port).with_token("s.token").with_ca_file(bundle.path());
    let client = VaultKeyClient::new(config).unwrap();

    let err = client.read_secret(KEY_PATH, SecretVersion::LATEST).await.unwrap_err();
    assert!(matches!(err, VaultError::Transport { context: "reading key from the Vault", .. }));
}
