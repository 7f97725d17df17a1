//! Typed raw column configurations.
//!
//! A raw column is a column read straight from the input dataset, described
//! by its name, its declared type and type-specific constraints. The
//! supported variants form the closed sum type [`ColumnConfig`]. Upstream
//! configurations whose type label has no variant arrive as
//! [`ColumnEntry::Unrecognized`] and are rejected at derivation time.

mod tags;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::tags::Tags;
use crate::error::IdentityError;

/// Declared type of a raw column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnType {
    /// 64-bit signed integers.
    #[serde(rename = "INT_COLUMN")]
    Integer,
    /// 32-bit floats.
    #[serde(rename = "FLOAT_COLUMN")]
    Float,
    /// UTF-8 strings.
    #[serde(rename = "STRING_COLUMN")]
    String,
}

impl ColumnType {
    /// Every supported raw column type, in label-listing order.
    pub const SUPPORTED: [Self; 3] = [Self::Integer, Self::Float, Self::String];

    /// Canonical label. This string, not the enum discriminant, is what
    /// enters the canonical encoding.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integer => "INT_COLUMN",
            Self::Float => "FLOAT_COLUMN",
            Self::String => "STRING_COLUMN",
        }
    }

    /// Resolve a label. Matching is exact.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::SUPPORTED.into_iter().find(|t| t.label() == label)
    }

    /// Labels of all supported types.
    #[must_use]
    pub fn supported_labels() -> Vec<&'static str> {
        Self::SUPPORTED.into_iter().map(Self::label).collect()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Integer raw column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntegerColumn {
    /// Column name, unique within a batch.
    pub name: String,
    /// Whether every row must carry a value.
    #[serde(default)]
    pub required: bool,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Allowed values. Set semantics; empty means unrestricted.
    #[serde(default, alias = "allowed_values", skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<i64>,
    /// Metadata tags.
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl IntegerColumn {
    /// Unconstrained, optional column named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            min: None,
            max: None,
            values: Vec::new(),
            tags: Tags::new(),
        }
    }
}

/// Float raw column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloatColumn {
    /// Column name, unique within a batch.
    pub name: String,
    /// Whether every row must carry a value.
    #[serde(default)]
    pub required: bool,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    /// Allowed values. Set semantics; empty means unrestricted.
    #[serde(default, alias = "allowed_values", skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f32>,
    /// Metadata tags.
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl FloatColumn {
    /// Unconstrained, optional column named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            min: None,
            max: None,
            values: Vec::new(),
            tags: Tags::new(),
        }
    }
}

/// String raw column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StringColumn {
    /// Column name, unique within a batch.
    pub name: String,
    /// Whether every row must carry a value.
    #[serde(default)]
    pub required: bool,
    /// Allowed values. Set semantics; empty means unrestricted.
    #[serde(default, alias = "allowed_values", skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Metadata tags.
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl StringColumn {
    /// Unconstrained, optional column named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            values: Vec::new(),
            tags: Tags::new(),
        }
    }
}

/// A supported raw column configuration.
///
/// Adding a column type means adding a variant here, a label in
/// [`ColumnType`], and one match arm in the canonical encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColumnConfig {
    /// `INT_COLUMN`
    #[serde(rename = "INT_COLUMN")]
    Integer(IntegerColumn),
    /// `FLOAT_COLUMN`
    #[serde(rename = "FLOAT_COLUMN")]
    Float(FloatColumn),
    /// `STRING_COLUMN`
    #[serde(rename = "STRING_COLUMN")]
    String(StringColumn),
}

impl ColumnConfig {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Integer(c) => &c.name,
            Self::Float(c) => &c.name,
            Self::String(c) => &c.name,
        }
    }

    /// Declared type.
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        match self {
            Self::Integer(_) => ColumnType::Integer,
            Self::Float(_) => ColumnType::Float,
            Self::String(_) => ColumnType::String,
        }
    }

    /// Metadata tags.
    #[must_use]
    pub const fn tags(&self) -> &Tags {
        match self {
            Self::Integer(c) => &c.tags,
            Self::Float(c) => &c.tags,
            Self::String(c) => &c.tags,
        }
    }
}

impl From<IntegerColumn> for ColumnConfig {
    fn from(column: IntegerColumn) -> Self {
        Self::Integer(column)
    }
}

impl From<FloatColumn> for ColumnConfig {
    fn from(column: FloatColumn) -> Self {
        Self::Float(column)
    }
}

impl From<StringColumn> for ColumnConfig {
    fn from(column: StringColumn) -> Self {
        Self::String(column)
    }
}

/// A configuration whose type label names no raw column variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedColumn {
    /// Column name as authored.
    pub name: String,
    /// Type label as authored.
    pub declared_type: String,
}

/// One element of an upstream raw column batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnEntry {
    /// A configuration with a supported type.
    Supported(ColumnConfig),
    /// A configuration with an unknown type label.
    Unrecognized(UnrecognizedColumn),
}

impl ColumnEntry {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Supported(c) => c.name(),
            Self::Unrecognized(c) => &c.name,
        }
    }

    /// Type label as declared.
    #[must_use]
    pub fn declared_type(&self) -> &str {
        match self {
            Self::Supported(c) => c.column_type().label(),
            Self::Unrecognized(c) => &c.declared_type,
        }
    }

    /// The supported configuration, or `UnsupportedVariant`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnsupportedVariant`] for an unrecognized type
    /// label.
    pub fn supported(&self) -> Result<&ColumnConfig, IdentityError> {
        match self {
            Self::Supported(c) => Ok(c),
            Self::Unrecognized(c) => Err(IdentityError::UnsupportedVariant {
                name: c.name.clone(),
                declared_type: c.declared_type.clone(),
                supported: ColumnType::supported_labels(),
            }),
        }
    }
}

impl From<ColumnConfig> for ColumnEntry {
    fn from(column: ColumnConfig) -> Self {
        Self::Supported(column)
    }
}

impl From<IntegerColumn> for ColumnEntry {
    fn from(column: IntegerColumn) -> Self {
        Self::Supported(ColumnConfig::Integer(column))
    }
}

impl From<FloatColumn> for ColumnEntry {
    fn from(column: FloatColumn) -> Self {
        Self::Supported(ColumnConfig::Float(column))
    }
}

impl From<StringColumn> for ColumnEntry {
    fn from(column: StringColumn) -> Self {
        Self::Supported(ColumnConfig::String(column))
    }
}

impl From<UnrecognizedColumn> for ColumnEntry {
    fn from(column: UnrecognizedColumn) -> Self {
        Self::Unrecognized(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for ty in ColumnType::SUPPORTED {
            assert_eq!(ColumnType::from_label(ty.label()), Some(ty));
        }
        assert_eq!(ColumnType::from_label("int_column"), None);
        assert_eq!(ColumnType::from_label(""), None);
    }

    #[test]
    fn test_supported_labels_order() {
        assert_eq!(
            ColumnType::supported_labels(),
            vec!["INT_COLUMN", "FLOAT_COLUMN", "STRING_COLUMN"]
        );
    }

    #[test]
    fn test_entry_accessors() {
        let entry = ColumnEntry::from(FloatColumn::new("ratio"));
        assert_eq!(entry.name(), "ratio");
        assert_eq!(entry.declared_type(), "FLOAT_COLUMN");
        assert!(entry.supported().is_ok());
    }

    #[test]
    fn test_unrecognized_entry_is_rejected() {
        let entry = ColumnEntry::from(UnrecognizedColumn {
            name: "when".to_string(),
            declared_type: "DATE_COLUMN".to_string(),
        });
        assert_eq!(entry.declared_type(), "DATE_COLUMN");
        let err = entry.supported().unwrap_err();
        assert_eq!(
            err,
            IdentityError::UnsupportedVariant {
                name: "when".to_string(),
                declared_type: "DATE_COLUMN".to_string(),
                supported: vec!["INT_COLUMN", "FLOAT_COLUMN", "STRING_COLUMN"],
            }
        );
    }

    #[test]
    fn test_config_serializes_with_type_label() {
        let config = ColumnConfig::from(IntegerColumn {
            required: true,
            min: Some(0),
            ..IntegerColumn::new("age")
        });
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "INT_COLUMN");
        assert_eq!(json["name"], "age");
        assert_eq!(json["min"], 0);
        assert!(json.get("max").is_none());
    }
}
