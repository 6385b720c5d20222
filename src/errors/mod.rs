//! # Error Handling
//!
//! Typed failures for the Vault key client. Every failure site in the request
//! pipeline maps to exactly one [`VaultError`] variant, so callers can tell a
//! transport hiccup from a malformed envelope or from stale key material.
//!
//! A missing secret on read is not an error; see
//! [`VersionedSecret::not_found`](crate::secrets::VersionedSecret::not_found).

use std::fmt;

/// Result type for Vault key client operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Main error type for the Vault key client
#[derive(thiserror::Error, Debug)]
pub enum VaultError {
    /// Token or CA file unreadable, or required configuration missing/invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Network or TLS failure while talking to Vault
    #[error("Error {context}: {message}")]
    Transport { context: &'static str, message: String },

    /// Vault answered with a non-success HTTP status
    #[error("Vault returned HTTP status {status}")]
    Remote { status: u16 },

    /// Response body does not match the expected envelope
    #[error("Invalid Vault response: {reason}")]
    ResponseFormat { reason: FormatFault },

    /// Version field missing, malformed or not positive
    #[error(
        "Invalid Vault response: '{field}' {fault}. Please make sure the secret is stored in \
         the engine of the `kv-v2` type."
    )]
    Version { field: &'static str, fault: VersionFault },

    /// Vault returned a different version than the one requested
    #[error("Invalid Vault response: requested the key of version {requested} but got version {got}")]
    VersionMismatch { requested: u64, got: u64 },
}

/// Structural defects in a Vault response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFault {
    MalformedBody,
    MissingData,
    MissingMetadata,
    MissingValue,
}

impl fmt::Display for FormatFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatFault::MalformedBody => write!(f, "malformed body"),
            FormatFault::MissingData => write!(f, "missing data"),
            FormatFault::MissingMetadata => write!(f, "missing metadata"),
            FormatFault::MissingValue => write!(f, "missing or invalid value"),
        }
    }
}

/// Reasons a version field is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFault {
    Missing,
    NotInteger,
    NonPositive,
}

impl fmt::Display for VersionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionFault::Missing => write!(f, "is missing"),
            VersionFault::NotInteger => write!(f, "is not an integer"),
            VersionFault::NonPositive => write!(f, "does not have a positive value"),
        }
    }
}

/// Coarse classification of a [`VaultError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Remote,
    ResponseFormat,
    Version,
    VersionMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Remote => write!(f, "remote"),
            ErrorKind::ResponseFormat => write!(f, "response_format"),
            ErrorKind::Version => write!(f, "version"),
            ErrorKind::VersionMismatch => write!(f, "version_mismatch"),
        }
    }
}

impl VaultError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(context: &'static str, message: S) -> Self {
        Self::Transport { context, message: message.into() }
    }

    /// Create a new remote status error
    pub fn remote(status: u16) -> Self {
        Self::Remote { status }
    }

    /// Create a new response format error
    pub fn format(reason: FormatFault) -> Self {
        Self::ResponseFormat { reason }
    }

    /// Create a new version error for the field at `field`
    pub fn version(field: &'static str, fault: VersionFault) -> Self {
        Self::Version { field, fault }
    }

    /// Create a new version mismatch error
    pub fn version_mismatch(requested: u64, got: u64) -> Self {
        Self::VersionMismatch { requested, got }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::Configuration { .. } => ErrorKind::Configuration,
            VaultError::Transport { .. } => ErrorKind::Transport,
            VaultError::Remote { .. } => ErrorKind::Remote,
            VaultError::ResponseFormat { .. } => ErrorKind::ResponseFormat,
            VaultError::Version { .. } => ErrorKind::Version,
            VaultError::VersionMismatch { .. } => ErrorKind::VersionMismatch,
        }
    }

    /// Whether a caller-side retry can reasonably help. Only connectivity
    /// failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VaultError::Transport { .. })
    }
}

impl From<validator::ValidationErrors> for VaultError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Validation failed: {}", message))
    }
}

impl From<toml::de::Error> for VaultError {
    fn from(error: toml::de::Error) -> Self {
        Self::config(format!("Invalid configuration file: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = VaultError::config("token file is empty");
        assert!(matches!(err, VaultError::Configuration { .. }));
        assert_eq!(err.to_string(), "Configuration error: token file is empty");

        let err = VaultError::remote(503);
        assert!(matches!(err, VaultError::Remote { status: 503 }));

        let err = VaultError::version_mismatch(5, 3);
        assert!(matches!(err, VaultError::VersionMismatch { requested: 5, got: 3 }));
    }

    #[test]
    fn test_error_display() {
        let err = VaultError::transport("reading key from the Vault", "connection refused");
        assert_eq!(err.to_string(), "Error reading key from the Vault: connection refused");

        let err = VaultError::format(FormatFault::MissingData);
        assert_eq!(err.to_string(), "Invalid Vault response: missing data");

        let err = VaultError::version("data.metadata.version", VersionFault::NonPositive);
        assert!(err.to_string().contains("'data.metadata.version' does not have a positive value"));
        assert!(err.to_string().contains("kv-v2"));

        let err = VaultError::version_mismatch(5, 3);
        assert!(err.to_string().contains("requested the key of version 5 but got version 3"));
    }

    #[test]
    fn test_only_transport_errors_are_retryable() {
        assert!(VaultError::transport("writing key to the Vault", "timed out").is_retryable());
        assert!(!VaultError::remote(500).is_retryable());
        assert!(!VaultError::config("missing token").is_retryable());
        assert!(!VaultError::format(FormatFault::MalformedBody).is_retryable());
        assert!(!VaultError::version("data.version", VersionFault::Missing).is_retryable());
        assert!(!VaultError::version_mismatch(2, 1).is_retryable());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(VaultError::remote(404).kind(), ErrorKind::Remote);
        assert_eq!(VaultError::format(FormatFault::MissingValue).kind(), ErrorKind::ResponseFormat);
        assert_eq!(ErrorKind::VersionMismatch.to_string(), "version_mismatch");
    }
}
