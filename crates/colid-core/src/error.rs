//! Error types for identity derivation.

use thiserror::Error;

/// Errors that reject a raw column batch.
///
/// Both variants are deterministic functions of the input batch. Retrying
/// without fixing the authored configuration produces the same error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdentityError {
    /// A column declares a type label that has no raw column variant.
    #[error(
        "{name}: invalid type \"{declared_type}\": expected one of {}",
        .supported.join(", ")
    )]
    UnsupportedVariant {
        /// Name of the offending column.
        name: String,
        /// The type label as authored.
        declared_type: String,
        /// Labels of every supported raw column type.
        supported: Vec<&'static str>,
    },

    /// Two columns in the same batch share a name.
    #[error(
        "{name}: duplicate raw column name (columns at index {first_index} and {duplicate_index})"
    )]
    DuplicateName {
        /// The shared name.
        name: String,
        /// Batch index of the first column carrying the name.
        first_index: usize,
        /// Batch index of the column that repeated it.
        duplicate_index: usize,
    },
}

impl IdentityError {
    /// Name of the configuration the error is about.
    #[must_use]
    pub fn column_name(&self) -> &str {
        match self {
            Self::UnsupportedVariant { name, .. } | Self::DuplicateName { name, .. } => name,
        }
    }

    /// Short stable kind label, used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedVariant { .. } => "unsupported_variant",
            Self::DuplicateName { .. } => "duplicate_name",
        }
    }
}
