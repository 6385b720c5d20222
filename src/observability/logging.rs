//! # Structured Logging
//!
//! `tracing` setup for the binary plus span helpers for Vault round trips.
//! Secret values and tokens never appear in events or span fields.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Create a tracing span for one Vault operation.
///
/// ```rust,ignore
/// let span = vault_span!("read", "secret/data/db-key");
/// let span = vault_span!("read", "secret/data/db-key", requested_version = 3);
/// ```
#[macro_export]
macro_rules! vault_span {
    ($operation:expr, $path:expr) => {
        tracing::info_span!(
            "vault_operation",
            operation = %$operation,
            path = %$path,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "vault_operation",
            operation = %$operation,
            path = %$path,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.log_level`. Returns `false` when a subscriber
/// was already installed (e.g. by the host process or a test harness), in
/// which case nothing changes.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.json {
        tracing::subscriber::set_global_default(
            fmt().json().with_env_filter(filter).with_writer(std::io::stderr).finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            fmt().with_env_filter(filter).with_writer(std::io::stderr).finish(),
        )
    };

    result.is_ok()
}
