//! # Command Line Interface
//!
//! Operator commands for inspecting and rotating keys stored in Vault.
//! Connection settings come from a TOML file or `VAULT_*` environment
//! variables, with command line flags taking precedence.

pub mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::config::{LoggingConfig, VaultConfig};
use crate::observability::init_logging;
use crate::secrets::{SecretString, SecretVersion, VaultKeyClient};
use output::{print_output, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "vault-keystore")]
#[command(about = "Read and rotate versioned keys stored in HashiCorp Vault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML configuration file (defaults to VAULT_* environment variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Vault server host name
    #[arg(long, global = true)]
    pub server_name: Option<String>,

    /// Vault server port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Talk to Vault over plain HTTP
    #[arg(long, global = true)]
    pub disable_tls: bool,

    /// PEM CA bundle used to verify the Vault server
    #[arg(long, global = true)]
    pub ca_file: Option<PathBuf>,

    /// Vault token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Path to file containing the Vault token
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Connect and request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a secret
    Read {
        /// Secret path, e.g. secret/data/db-key
        path: String,

        /// Version to read (0 reads the latest)
        #[arg(long, default_value_t = 0)]
        version: u64,

        /// Include the secret value in the output
        #[arg(long)]
        reveal: bool,
    },

    /// Store a new version of a secret
    Write {
        /// Secret path, e.g. secret/data/db-key
        path: String,

        /// Secret value
        #[arg(long, conflicts_with = "value_file", required_unless_present = "value_file")]
        value: Option<String>,

        /// File holding the secret value
        #[arg(long)]
        value_file: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
pub struct ReadOutput {
    pub path: String,
    pub found: bool,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteOutput {
    pub path: String,
    pub version: u64,
}

/// Build the Vault configuration: file or environment first, then flags.
pub fn resolve_config(cli: &Cli) -> Result<VaultConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!("Loading Vault configuration from {}", path.display());
            VaultConfig::from_toml_file(path)?
        }
        None => VaultConfig::from_env()?,
    };

    if let Some(server_name) = &cli.server_name {
        config.server_name = server_name.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if cli.disable_tls {
        config.disable_tls = true;
    }
    if let Some(ca_file) = &cli.ca_file {
        config.server_ca_file = Some(ca_file.clone());
    }
    if let Some(token) = &cli.token {
        config.token = Some(SecretString::new(token.clone()));
    }
    if let Some(token_file) = &cli.token_file {
        config.token_file = Some(token_file.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_seconds = timeout;
    }

    Ok(config)
}

/// Parse arguments, set up logging and run the requested command.
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    initialise_logging(cli.verbose);

    execute(cli).await
}

/// Run an already parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let client = VaultKeyClient::new(config)?;

    match cli.command {
        Commands::Read { path, version, reveal } => {
            let secret = client.read_secret(&path, SecretVersion::new(version)).await?;
            let output = ReadOutput {
                found: !secret.is_not_found(),
                version: secret.version.get(),
                value: reveal
                    .then(|| secret.value.expose_secret().to_string())
                    .filter(|_| !secret.is_not_found()),
                path,
            };
            print_output(&output, cli.output)?;
        }
        Commands::Write { path, value, value_file } => {
            let value = match (value, value_file) {
                (Some(value), _) => SecretString::new(value),
                (None, Some(file)) => read_value_file(&file)?,
                (None, None) => anyhow::bail!("Either --value or --value-file is required"),
            };

            let version = client.write_secret(&path, value.expose_secret()).await?;
            print_output(&WriteOutput { path, version: version.get() }, cli.output)?;
        }
    }

    Ok(())
}

fn initialise_logging(verbose: bool) {
    let mut logging = LoggingConfig::from_env();
    if verbose {
        logging.log_level = "debug".to_string();
    }

    // Subscriber already set elsewhere (e.g. integration tests); ignore.
    let _ = init_logging(&logging);
}

fn read_value_file(path: &Path) -> Result<SecretString> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read value file: {}", path.display()))?;
    let contents = SecretString::new(contents);
    let value = contents.expose_secret().trim_end_matches(['\r', '\n']);

    if value.is_empty() {
        anyhow::bail!("Value file is empty: {}", path.display());
    }

    Ok(SecretString::new(value))
}
