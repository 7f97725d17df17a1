//! Two-tier identity derivation for raw column batches.
//!
//! # Derivation
//!
//! ```text
//! id           = blake3("colid.raw_column.id.v1\0" + encode_column(run, column))
//! id_with_tags = blake3("colid.raw_column.id_with_tags.v1\0"
//!                       + len(id) + id + len(tags_id) + tags_id)
//! ```
//!
//! The base ID never depends on tags. The ID-with-tags depends only on the
//! base ID and the tag set's own identifier.
//!
//! # Batch Semantics
//!
//! A batch either produces one record per input column or fails as a whole.
//! When several columns are invalid, the error for the lowest batch index is
//! reported, in both the sequential and the parallel deriver.

mod ids;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use self::ids::{CONTENT_ID_LEN, CONTENT_ID_PREFIX, ContentId, IdParseError, RunDiscriminator};
use crate::canonical::{CanonicalBuf, encode_column};
use crate::column::{ColumnConfig, ColumnEntry};
use crate::error::IdentityError;

/// Hash domain for base IDs.
pub const ID_DOMAIN: &str = "colid.raw_column.id.v1";

/// Hash domain for IDs-with-tags.
pub const ID_WITH_TAGS_DOMAIN: &str = "colid.raw_column.id_with_tags.v1";

/// Hash domain for tag set identifiers.
pub const TAGS_DOMAIN: &str = "colid.tags.v1";

/// Resource kind of a derived record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A column read directly from the input dataset.
    RawColumn,
}

impl ResourceType {
    /// Stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RawColumn => "raw_column",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one raw column.
///
/// Records serialize with serde for persistence. JSON has no NaN, so a
/// typed [`FloatColumn`](crate::column::FloatColumn) holding a NaN bound or
/// value derives normally but its record does not survive a JSON round trip.
/// The TOML loader rejects NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Content ID: run, name, type and constraints. Primary cache key.
    pub base_id: ContentId,
    /// Base ID layered with the tag set identifier.
    pub id_with_tags: ContentId,
    /// Always [`ResourceType::RawColumn`].
    pub resource_type: ResourceType,
    /// The configuration the IDs were derived from.
    pub column: ColumnConfig,
}

impl ResourceRecord {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.column.name()
    }
}

/// Derived records keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawColumns(BTreeMap<String, ResourceRecord>);

impl RawColumns {
    /// Record for the column named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceRecord> {
        self.0.get(name)
    }

    /// Record whose base ID is `id`.
    #[must_use]
    pub fn get_by_id(&self, id: &ContentId) -> Option<&ResourceRecord> {
        self.0.values().find(|record| &record.base_id == id)
    }

    /// Column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Records in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceRecord)> {
        self.0.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, ResourceRecord> {
        self.0
    }
}

impl IntoIterator for RawColumns {
    type Item = (String, ResourceRecord);
    type IntoIter = std::collections::btree_map::IntoIter<String, ResourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Base ID of `column` under `run`.
#[must_use]
pub fn base_id(run: &RunDiscriminator, column: &ColumnConfig) -> ContentId {
    ContentId::digest(ID_DOMAIN, &[encode_column(run, column).as_slice()])
}

/// ID-with-tags for a base ID and a tag set identifier.
#[must_use]
pub fn id_with_tags(base_id: &ContentId, tags_id: &ContentId) -> ContentId {
    let mut buf = CanonicalBuf::new();
    buf.push_str(base_id.as_str());
    buf.push_str(tags_id.as_str());
    ContentId::digest(ID_WITH_TAGS_DOMAIN, &[buf.as_bytes()])
}

/// Derive the record for one supported column.
#[must_use]
pub fn derive_record(run: &RunDiscriminator, column: &ColumnConfig) -> ResourceRecord {
    let base_id = base_id(run, column);
    let id_with_tags = id_with_tags(&base_id, &column.tags().id());
    ResourceRecord {
        base_id,
        id_with_tags,
        resource_type: ResourceType::RawColumn,
        column: column.clone(),
    }
}

/// Derive identities for every column of `batch`.
///
/// # Errors
///
/// Returns [`IdentityError::UnsupportedVariant`] for a column with an
/// unrecognized type label and [`IdentityError::DuplicateName`] for a
/// repeated name. The first failing index wins; no partial result is
/// returned.
pub fn derive_raw_columns(
    run: &RunDiscriminator,
    batch: &[ColumnEntry],
) -> Result<RawColumns, IdentityError> {
    let results = batch.iter().map(|entry| derive_entry(run, entry));
    let columns = merge(results).inspect_err(log_rejection)?;
    info!(run = %run, columns = columns.len(), "derived raw column identities");
    Ok(columns)
}

/// Parallel [`derive_raw_columns`].
///
/// Column identities are computed on the rayon pool; merging and the
/// duplicate-name check run afterwards in batch order, so the result and the
/// reported error are identical to the sequential deriver.
///
/// # Errors
///
/// Same as [`derive_raw_columns`].
#[cfg(feature = "parallel")]
pub fn derive_raw_columns_par(
    run: &RunDiscriminator,
    batch: &[ColumnEntry],
) -> Result<RawColumns, IdentityError> {
    use rayon::prelude::*;

    let results: Vec<_> = batch
        .par_iter()
        .map(|entry| derive_entry(run, entry))
        .collect();
    let columns = merge(results).inspect_err(log_rejection)?;
    info!(
        run = %run,
        columns = columns.len(),
        parallel = true,
        "derived raw column identities"
    );
    Ok(columns)
}

fn derive_entry(
    run: &RunDiscriminator,
    entry: &ColumnEntry,
) -> Result<ResourceRecord, IdentityError> {
    let column = entry.supported()?;
    let record = derive_record(run, column);
    debug!(
        column = column.name(),
        declared_type = %column.column_type(),
        id = record.base_id.short_hex(),
        "derived raw column identity"
    );
    Ok(record)
}

/// Insert records in batch order, stopping at the first error.
fn merge(
    results: impl IntoIterator<Item = Result<ResourceRecord, IdentityError>>,
) -> Result<RawColumns, IdentityError> {
    let mut columns = BTreeMap::new();
    let mut first_seen: BTreeMap<String, usize> = BTreeMap::new();

    for (index, result) in results.into_iter().enumerate() {
        let record = result?;
        let name = record.name().to_string();
        match first_seen.entry(name.clone()) {
            Entry::Occupied(seen) => {
                return Err(IdentityError::DuplicateName {
                    name,
                    first_index: *seen.get(),
                    duplicate_index: index,
                });
            },
            Entry::Vacant(slot) => {
                slot.insert(index);
            },
        }
        columns.insert(name, record);
    }

    Ok(RawColumns(columns))
}

fn log_rejection(err: &IdentityError) {
    warn!(
        kind = err.kind(),
        column = err.column_name(),
        error = %err,
        "rejected raw column batch"
    );
}
