//! Logical file identity used as the cache key.

use super::SymbolCacheDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalised, workspace-relative file identity.
///
/// Backslashes become `/`, leading `./` and `/` are stripped and repeated
/// separators collapse, so `./src//lib.rs` and `src\lib.rs` name the same
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileKey(String);

impl FileKey {
    /// Creates a validated file key.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheDomainError::EmptyFileKey`] when nothing remains
    /// after normalisation, or
    /// [`SymbolCacheDomainError::ParentSegmentInFileKey`] when a segment is
    /// `..`.
    pub fn new(value: impl Into<String>) -> Result<Self, SymbolCacheDomainError> {
        let raw = value.into();
        let unified = raw.trim().replace('\\', "/");
        let segments: Vec<&str> = unified
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();

        if segments.is_empty() {
            return Err(SymbolCacheDomainError::EmptyFileKey);
        }
        if segments.contains(&"..") {
            return Err(SymbolCacheDomainError::ParentSegmentInFileKey(raw));
        }

        Ok(Self(segments.join("/")))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FileKey {
    type Error = SymbolCacheDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FileKey> for String {
    fn from(value: FileKey) -> Self {
        value.0
    }
}

impl AsRef<str> for FileKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("src/lib.rs", "src/lib.rs")]
    #[case("./src/lib.rs", "src/lib.rs")]
    #[case("src//nested/./mod.rs", "src/nested/mod.rs")]
    #[case("src\\win\\main.rs", "src/win/main.rs")]
    #[case("  /abs/path.rs  ", "abs/path.rs")]
    fn keys_are_normalised(#[case] raw: &str, #[case] expected: &str) {
        let key = FileKey::new(raw).expect("key should be valid");
        assert_eq!(key.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("./")]
    fn empty_keys_are_rejected(#[case] raw: &str) {
        assert_eq!(FileKey::new(raw), Err(SymbolCacheDomainError::EmptyFileKey));
    }

    #[test]
    fn parent_segments_are_rejected() {
        assert!(matches!(
            FileKey::new("src/../secrets"),
            Err(SymbolCacheDomainError::ParentSegmentInFileKey(_))
        ));
    }
}
