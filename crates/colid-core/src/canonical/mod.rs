//! Canonical encoding of raw column configurations.
//!
//! Produces the byte sequence a column's base ID is hashed from. Two
//! configurations encode to the same bytes if and only if they are the same
//! column for caching purposes.
//!
//! # Layout
//!
//! ```text
//! run_discriminator || name || type_label || variant fields
//! ```
//!
//! Variant fields, in declared order:
//!
//! | Type            | Fields                              |
//! |-----------------|-------------------------------------|
//! | `INT_COLUMN`    | `required`, `min`, `max`, `values`  |
//! | `FLOAT_COLUMN`  | `required`, `min`, `max`, `values`  |
//! | `STRING_COLUMN` | `required`, `values`                |
//!
//! # Framing
//!
//! - string: `u64` LE byte length, then UTF-8 bytes
//! - bool: `0x00` or `0x01`
//! - optional: `0x00` when absent; `0x01` followed by the value when present
//! - `i64`: 8 bytes LE
//! - `f32`: 4 bytes LE of the normalized IEEE-754 bits
//! - set: `u64` LE element count, then elements in canonical order
//!
//! Length and presence prefixes make the encoding injective: no two distinct
//! field sequences share a byte sequence, and an absent bound never encodes
//! like a present one.
//!
//! Tags are not part of the encoding.

pub mod order;

use self::order::{canonical_f32s, canonical_i64s, canonical_strs, normalize_f32};
use crate::column::{ColumnConfig, FloatColumn, IntegerColumn, StringColumn};
use crate::identity::RunDiscriminator;

/// Presence marker for an absent optional field.
const ABSENT: u8 = 0x00;

/// Presence marker for a present optional field.
const PRESENT: u8 = 0x01;

/// Append-only buffer with injective field framing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CanonicalBuf {
    bytes: Vec<u8>,
}

impl CanonicalBuf {
    /// Empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Length or count prefix.
    pub fn push_len(&mut self, len: usize) {
        self.bytes.extend_from_slice(&(len as u64).to_le_bytes());
    }

    /// Length-prefixed string.
    pub fn push_str(&mut self, value: &str) {
        self.push_len(value.len());
        self.bytes.extend_from_slice(value.as_bytes());
    }

    /// Single-byte boolean.
    pub fn push_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    /// Fixed-width integer.
    pub fn push_i64(&mut self, value: i64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Fixed-width float, normalized first.
    pub fn push_f32(&mut self, value: f32) {
        self.bytes
            .extend_from_slice(&normalize_f32(value).to_bits().to_le_bytes());
    }

    /// Optional integer with presence marker.
    pub fn push_opt_i64(&mut self, value: Option<i64>) {
        match value {
            Some(v) => {
                self.bytes.push(PRESENT);
                self.push_i64(v);
            },
            None => self.bytes.push(ABSENT),
        }
    }

    /// Optional float with presence marker.
    pub fn push_opt_f32(&mut self, value: Option<f32>) {
        match value {
            Some(v) => {
                self.bytes.push(PRESENT);
                self.push_f32(v);
            },
            None => self.bytes.push(ABSENT),
        }
    }

    /// Integer set in canonical order.
    pub fn push_i64_set(&mut self, values: &[i64]) {
        let ordered = canonical_i64s(values);
        self.push_len(ordered.len());
        for v in ordered {
            self.push_i64(v);
        }
    }

    /// Float set in canonical order.
    pub fn push_f32_set(&mut self, values: &[f32]) {
        let ordered = canonical_f32s(values);
        self.push_len(ordered.len());
        for v in ordered {
            self.push_f32(v);
        }
    }

    /// String set in canonical order.
    pub fn push_str_set(&mut self, values: &[String]) {
        let ordered = canonical_strs(values);
        self.push_len(ordered.len());
        for v in ordered {
            self.push_str(v);
        }
    }

    /// Encoded bytes so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode `column` under `run` into its canonical byte sequence.
///
/// Pure and infallible: unsupported type labels never reach this point
/// because [`ColumnConfig`] only has supported variants. The result is never
/// empty.
#[must_use]
pub fn encode_column(run: &RunDiscriminator, column: &ColumnConfig) -> Vec<u8> {
    let mut buf = CanonicalBuf::new();
    buf.push_str(run.as_str());
    buf.push_str(column.name());
    buf.push_str(column.column_type().label());

    match column {
        ColumnConfig::Integer(c) => encode_integer(&mut buf, c),
        ColumnConfig::Float(c) => encode_float(&mut buf, c),
        ColumnConfig::String(c) => encode_string(&mut buf, c),
    }

    buf.into_bytes()
}

fn encode_integer(buf: &mut CanonicalBuf, column: &IntegerColumn) {
    buf.push_bool(column.required);
    buf.push_opt_i64(column.min);
    buf.push_opt_i64(column.max);
    buf.push_i64_set(&column.values);
}

fn encode_float(buf: &mut CanonicalBuf, column: &FloatColumn) {
    buf.push_bool(column.required);
    buf.push_opt_f32(column.min);
    buf.push_opt_f32(column.max);
    buf.push_f32_set(&column.values);
}

fn encode_string(buf: &mut CanonicalBuf, column: &StringColumn) {
    buf.push_bool(column.required);
    buf.push_str_set(&column.values);
}
