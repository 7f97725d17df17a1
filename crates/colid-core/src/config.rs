//! Run configuration loading.
//!
//! Parses a TOML run description (run discriminator plus raw column batch)
//! into typed [`ColumnEntry`] values:
//!
//! ```toml
//! run_id = "env-42"
//!
//! [[raw_column]]
//! name = "age"
//! type = "INT_COLUMN"
//! required = true
//! min = 0
//! max = 120
//! values = [5, 1, 3]
//! tags = { owner = "teamA" }
//! ```
//!
//! A column whose `type` label is unknown is not a parse error. It loads as
//! [`ColumnEntry::Unrecognized`] and the deriver rejects the batch with
//! `UnsupportedVariant`, naming the column and the supported labels.
//!
//! `FLOAT_COLUMN` bounds and values must be representable as `f32`. NaN and
//! finite values outside the `f32` range are rejected.

use std::path::Path;

use thiserror::Error;
use toml::{Table, Value};

use crate::column::{
    ColumnConfig, ColumnEntry, ColumnType, FloatColumn, IntegerColumn, StringColumn,
    UnrecognizedColumn,
};
use crate::error::IdentityError;
use crate::identity::{IdParseError, RawColumns, RunDiscriminator, derive_raw_columns};

/// Key of the run discriminator.
const RUN_ID_KEY: &str = "run_id";

/// Key of the raw column array.
const RAW_COLUMN_KEY: &str = "raw_column";

/// Key of a column's type label.
const TYPE_KEY: &str = "type";

/// Key of a column's name.
const NAME_KEY: &str = "name";

/// Float-valued keys of a `FLOAT_COLUMN` table, including the value alias.
const FLOAT_KEYS: [&str; 4] = ["min", "max", "values", "allowed_values"];

/// Errors from loading a run configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required key is missing.
    #[error("{context}: missing required key \"{key}\"")]
    MissingKey {
        /// Where the key was expected.
        context: String,
        /// The missing key.
        key: &'static str,
    },

    /// A key has a value of the wrong shape.
    #[error("{context}: invalid value for \"{key}\": expected {expected}")]
    InvalidValue {
        /// Where the key was found.
        context: String,
        /// The offending key.
        key: &'static str,
        /// Expected shape.
        expected: &'static str,
    },

    /// A column table failed typed validation.
    #[error("{name}: invalid {column_type} config: {source}")]
    Column {
        /// Column name.
        name: String,
        /// Declared type.
        column_type: ColumnType,
        /// Underlying deserialization error.
        source: toml::de::Error,
    },

    /// The run discriminator is invalid.
    #[error("invalid run_id: {0}")]
    RunId(#[from] IdParseError),
}

/// A run discriminator with its raw column batch.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityConfig {
    /// Scope of every derived ID.
    pub run_id: RunDiscriminator,
    /// Columns in authored order.
    pub raw_columns: Vec<ColumnEntry>,
}

impl IdentityConfig {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the TOML is invalid
    /// - `run_id` is missing, not a string, or empty
    /// - a column lacks `name` or `type`
    /// - a column of a known type has unknown keys or ill-typed values
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut doc: Table = content.parse()?;

        let run_id = match doc.remove(RUN_ID_KEY) {
            Some(Value::String(s)) => RunDiscriminator::new(s)?,
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    context: "config".to_string(),
                    key: RUN_ID_KEY,
                    expected: "a string",
                });
            },
            None => {
                return Err(ConfigError::MissingKey {
                    context: "config".to_string(),
                    key: RUN_ID_KEY,
                });
            },
        };

        let raw_columns = match doc.remove(RAW_COLUMN_KEY) {
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| parse_column(index, item))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    context: "config".to_string(),
                    key: RAW_COLUMN_KEY,
                    expected: "an array of tables",
                });
            },
            None => Vec::new(),
        };

        Ok(Self {
            run_id,
            raw_columns,
        })
    }

    /// Derive identities for the loaded batch.
    ///
    /// # Errors
    ///
    /// See [`derive_raw_columns`].
    pub fn derive(&self) -> Result<RawColumns, IdentityError> {
        derive_raw_columns(&self.run_id, &self.raw_columns)
    }
}

fn parse_column(index: usize, item: Value) -> Result<ColumnEntry, ConfigError> {
    let context = format!("{RAW_COLUMN_KEY}[{index}]");
    let Value::Table(mut table) = item else {
        return Err(ConfigError::InvalidValue {
            context,
            key: RAW_COLUMN_KEY,
            expected: "a table",
        });
    };

    let name = match table.get(NAME_KEY) {
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(ConfigError::InvalidValue {
                context,
                key: NAME_KEY,
                expected: "a string",
            });
        },
        None => {
            return Err(ConfigError::MissingKey {
                context,
                key: NAME_KEY,
            });
        },
    };

    let declared_type = match table.remove(TYPE_KEY) {
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(ConfigError::InvalidValue {
                context: name,
                key: TYPE_KEY,
                expected: "a string",
            });
        },
        None => {
            return Err(ConfigError::MissingKey {
                context: name,
                key: TYPE_KEY,
            });
        },
    };

    let Some(column_type) = ColumnType::from_label(&declared_type) else {
        return Ok(ColumnEntry::Unrecognized(UnrecognizedColumn {
            name,
            declared_type,
        }));
    };

    if column_type == ColumnType::Float {
        check_f32_range(&name, &table)?;
    }

    let body = Value::Table(table);
    let typed = match column_type {
        ColumnType::Integer => body.try_into::<IntegerColumn>().map(ColumnConfig::Integer),
        ColumnType::Float => body.try_into::<FloatColumn>().map(ColumnConfig::Float),
        ColumnType::String => body.try_into::<StringColumn>().map(ColumnConfig::String),
    };

    typed
        .map(ColumnEntry::Supported)
        .map_err(|source| ConfigError::Column {
            name,
            column_type,
            source,
        })
}

/// Reject float values that do not survive narrowing to `f32`.
///
/// A finite TOML float outside the `f32` range would otherwise load as an
/// infinity, so distinct authored bounds would share an ID. NaN is rejected
/// because it has no stable serialized form.
#[allow(clippy::cast_possible_truncation)]
fn check_f32_range(name: &str, table: &Table) -> Result<(), ConfigError> {
    for key in FLOAT_KEYS {
        let floats: Vec<f64> = match table.get(key) {
            Some(Value::Float(value)) => vec![*value],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_float).collect(),
            _ => continue,
        };
        for value in floats {
            let expected = if value.is_nan() {
                "a number, not NaN"
            } else if value.is_finite() && !(value as f32).is_finite() {
                "a value in f32 range"
            } else {
                continue;
            };
            return Err(ConfigError::InvalidValue {
                context: name.to_string(),
                key,
                expected,
            });
        }
    }
    Ok(())
}
