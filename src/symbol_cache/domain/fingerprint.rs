//! Content fingerprints used to detect stale cache entries.

use super::SymbolCacheDomainError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const DIGEST_HEX_LENGTH: usize = 64;

/// SHA-256 digest of a file's raw bytes, in lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `bytes`.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(bytes)))
    }

    /// Parses a previously rendered fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheDomainError::InvalidFingerprint`] unless `value`
    /// is exactly 64 lowercase hex characters.
    pub fn parse(value: impl Into<String>) -> Result<Self, SymbolCacheDomainError> {
        let raw = value.into();
        let is_digest = raw.len() == DIGEST_HEX_LENGTH
            && raw
                .chars()
                .all(|character| character.is_ascii_digit() || ('a'..='f').contains(&character));
        if !is_digest {
            return Err(SymbolCacheDomainError::InvalidFingerprint(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = SymbolCacheDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Fingerprint of the live source, computed at the moment of use.
///
/// `Unavailable` is distinct from any digest: it never matches a stored
/// entry and is never written into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveFingerprint {
    /// The source was read and hashed.
    Available(Fingerprint),
    /// The source could not be read.
    Unavailable {
        /// Why the source could not be fingerprinted.
        reason: String,
    },
}

impl LiveFingerprint {
    /// Creates an `Unavailable` outcome.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns the fingerprint when available.
    #[must_use]
    pub const fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Self::Available(fingerprint) => Some(fingerprint),
            Self::Unavailable { .. } => None,
        }
    }
}

impl From<Fingerprint> for LiveFingerprint {
    fn from(value: Fingerprint) -> Self {
        Self::Available(value)
    }
}
