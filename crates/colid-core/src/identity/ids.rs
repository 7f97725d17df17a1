//! Identifier newtypes: the run discriminator and BLAKE3 content IDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text prefix of every content ID.
pub const CONTENT_ID_PREFIX: &str = "b3-256:";

/// Length of the hex payload (32-byte digest).
const HEX_LEN: usize = 64;

/// Full text length of a content ID (`b3-256:` + 64 hex = 71).
pub const CONTENT_ID_LEN: usize = CONTENT_ID_PREFIX.len() + HEX_LEN;

/// Errors from parsing or constructing identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdParseError {
    /// Run discriminator was empty.
    #[error("run discriminator must not be empty")]
    EmptyRunDiscriminator,

    /// Content ID does not start with `b3-256:`.
    #[error("content id must start with \"{}\", got \"{got}\"", CONTENT_ID_PREFIX)]
    WrongPrefix {
        /// Leading characters of the rejected input.
        got: String,
    },

    /// Content ID has the wrong length.
    #[error("content id must be {} characters, got {got}", CONTENT_ID_LEN)]
    InvalidLength {
        /// Length of the rejected input.
        got: usize,
    },

    /// Content ID payload is not lowercase hex.
    #[error("content id payload must be lowercase hex")]
    InvalidHex,
}

/// Opaque identifier of the environment or run that scopes all IDs.
///
/// Identical configurations under different discriminators never share an
/// ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunDiscriminator(String);

impl RunDiscriminator {
    /// Wrap a non-empty discriminator.
    ///
    /// # Errors
    ///
    /// Returns [`IdParseError::EmptyRunDiscriminator`] for an empty string.
    pub fn new(value: impl Into<String>) -> Result<Self, IdParseError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdParseError::EmptyRunDiscriminator);
        }
        Ok(Self(value))
    }

    /// Discriminator text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RunDiscriminator {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RunDiscriminator> for String {
    fn from(value: RunDiscriminator) -> Self {
        value.0
    }
}

impl fmt::Display for RunDiscriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Domain-separated BLAKE3 content identifier, `b3-256:<64-lowercase-hex>`.
///
/// Stable across processes and machines: it depends only on the domain and
/// the hashed bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Hash `parts` under `domain`.
    ///
    /// The domain string and a NUL byte are hashed first, then each part in
    /// order. Callers frame the parts themselves.
    #[must_use]
    pub fn digest(domain: &str, parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(domain.as_bytes());
        hasher.update(b"\0");
        for part in parts {
            hasher.update(part);
        }
        Self(format!("{CONTENT_ID_PREFIX}{}", hasher.finalize().to_hex()))
    }

    /// Parse the canonical text form.
    ///
    /// # Errors
    ///
    /// Returns an error for a wrong prefix, a wrong length, or a payload that
    /// is not lowercase hex.
    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        let Some(hex) = input.strip_prefix(CONTENT_ID_PREFIX) else {
            let got = input
                .get(..CONTENT_ID_PREFIX.len())
                .map_or_else(|| input.to_string(), str::to_string);
            return Err(IdParseError::WrongPrefix { got });
        };
        if input.len() != CONTENT_ID_LEN {
            return Err(IdParseError::InvalidLength { got: input.len() });
        }
        if !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(IdParseError::InvalidHex);
        }
        Ok(Self(input.to_string()))
    }

    /// Canonical text form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex characters, for log lines and directory suffixes.
    #[must_use]
    pub fn short_hex(&self) -> &str {
        &self.0[CONTENT_ID_PREFIX.len()..CONTENT_ID_PREFIX.len() + 16]
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentId").field(&self.0).finish()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentId> for String {
    fn from(value: ContentId) -> Self {
        value.0
    }
}
