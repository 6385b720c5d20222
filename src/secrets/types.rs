//! Value types flowing through the key client.
//!
//! Key material and tokens travel as [`SecretString`], which never shows its
//! contents in logs or serialized output and is zeroed on drop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string wrapper that redacts its contents in Debug, Display, and serialization.
///
/// - Debug output shows `SecretString([REDACTED])`
/// - Display output shows `[REDACTED]`
/// - Serialization outputs `"[REDACTED]"`, never the value
/// - Deserialization accepts real values (e.g. a token in a config file)
/// - Memory is zeroed when dropped
///
/// The value is only reachable through [`SecretString::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value.
    ///
    /// Only call this where the value has to leave the process (request
    /// headers, request bodies, key derivation). Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Default for SecretString {
    fn default() -> Self {
        Self::new("")
    }
}

/// Revision number of a secret in a KV v2 engine.
///
/// Stored revisions start at 1. The value 0 is [`SecretVersion::LATEST`] and
/// means "no particular version" on reads, or "not found" in a read result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretVersion(u64);

impl SecretVersion {
    /// Unspecified version; reads return the newest revision.
    pub const LATEST: SecretVersion = SecretVersion(0);

    pub const fn new(version: u64) -> Self {
        Self(version)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_latest(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for SecretVersion {
    fn from(version: u64) -> Self {
        Self(version)
    }
}

impl fmt::Display for SecretVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A secret value paired with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedSecret {
    pub value: SecretString,
    pub version: SecretVersion,
}

impl VersionedSecret {
    pub fn new(value: impl Into<SecretString>, version: SecretVersion) -> Self {
        Self { value: value.into(), version }
    }

    /// Result of reading a path that does not exist: empty value, version 0.
    pub fn not_found() -> Self {
        Self { value: SecretString::default(), version: SecretVersion::LATEST }
    }

    pub fn is_not_found(&self) -> bool {
        self.version.is_latest()
    }
}
