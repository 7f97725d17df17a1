#![allow(clippy::doc_markdown)]

//! colid-core - content-addressed identities for raw column configurations
//!
//! Given a batch of typed raw column configurations and a run discriminator,
//! this crate derives two identifiers per column that downstream caches key
//! materialized columns by:
//!
//! - **base ID**: depends on the run, the column name, its declared type and
//!   its constraints. Never on tags.
//! - **ID-with-tags**: the base ID layered with the tag set's identifier, for
//!   cache entries that must react to metadata-only edits.
//!
//! Set-like fields are canonicalized before hashing, so re-ordering the
//! allowed values of a column never changes its ID, while any semantic edit
//! does.
//!
//! # Modules
//!
//! - [`column`]: Typed column configurations and tags
//! - [`canonical`]: Canonical byte encoding of a configuration
//! - [`identity`]: ID derivation over a batch
//! - [`config`]: TOML run configuration loading
//! - [`error`]: Batch rejection errors
//!
//! # Example
//!
//! ```
//! use colid_core::column::{ColumnEntry, IntegerColumn};
//! use colid_core::identity::{RunDiscriminator, derive_raw_columns};
//!
//! let run = RunDiscriminator::new("env-42").unwrap();
//! let age = IntegerColumn {
//!     required: true,
//!     min: Some(0),
//!     max: Some(120),
//!     values: vec![5, 1, 3],
//!     ..IntegerColumn::new("age")
//! };
//! let reordered = IntegerColumn {
//!     values: vec![1, 3, 5],
//!     ..age.clone()
//! };
//!
//! let a = derive_raw_columns(&run, &[ColumnEntry::from(age)]).unwrap();
//! let b = derive_raw_columns(&run, &[ColumnEntry::from(reordered)]).unwrap();
//! assert_eq!(a.get("age").unwrap().base_id, b.get("age").unwrap().base_id);
//! ```

pub mod canonical;
pub mod column;
pub mod config;
pub mod error;
pub mod identity;

pub use column::{ColumnConfig, ColumnEntry, ColumnType, Tags};
pub use config::{ConfigError, IdentityConfig};
pub use error::IdentityError;
#[cfg(feature = "parallel")]
pub use identity::derive_raw_columns_par;
pub use identity::{
    ContentId, RawColumns, ResourceRecord, ResourceType, RunDiscriminator, derive_raw_columns,
};
