//! Metadata tags attached to a raw column.
//!
//! Tags are cosmetic: they never enter a column's base ID. They carry their
//! own content identifier so that the ID-with-tags tier can react to
//! metadata-only edits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBuf;
use crate::identity::{ContentId, TAGS_DOMAIN};

/// Unordered key/value metadata.
///
/// Backed by a `BTreeMap`, so iteration (and therefore the identifier) is
/// independent of authoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Empty tag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a tag, returning the previous value for `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no tags are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Deterministic content identifier of the tag set.
    ///
    /// Encoding: entry count, then each `(key, value)` pair in key order,
    /// both length-prefixed.
    #[must_use]
    pub fn id(&self) -> ContentId {
        let mut buf = CanonicalBuf::new();
        buf.push_len(self.0.len());
        for (key, value) in &self.0 {
            buf.push_str(key);
            buf.push_str(value);
        }
        ContentId::digest(TAGS_DOMAIN, &[buf.as_bytes()])
    }
}

impl<K, V> FromIterator<(K, V)> for Tags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
