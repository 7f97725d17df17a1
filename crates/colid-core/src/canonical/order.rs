//! Canonical ordering of set-like fields.
//!
//! Allowed-value sets carry no meaning in their authored order. Before
//! encoding, each set is copied, sorted by a total order over its element
//! type and deduplicated, so every authoring of the same set yields the same
//! sequence.

use std::cmp::Ordering;

/// Bit pattern every NaN is normalized to.
pub const CANONICAL_NAN_BITS: u32 = 0x7fc0_0000;

/// Sort and deduplicate a copy of `values` under the total order `cmp`.
///
/// `cmp` must be a total order; elements comparing `Equal` are treated as
/// the same set member.
#[must_use]
pub fn canonical_order<T, F>(values: &[T], cmp: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let mut out = values.to_vec();
    out.sort_by(&cmp);
    out.dedup_by(|a, b| cmp(a, b) == Ordering::Equal);
    out
}

/// Canonical order of an integer set.
#[must_use]
pub fn canonical_i64s(values: &[i64]) -> Vec<i64> {
    canonical_order(values, Ord::cmp)
}

/// Canonical order of a float set, after [`normalize_f32`].
#[must_use]
pub fn canonical_f32s(values: &[f32]) -> Vec<f32> {
    let normalized: Vec<f32> = values.iter().copied().map(normalize_f32).collect();
    canonical_order(&normalized, f32::total_cmp)
}

/// Canonical order of a string set (byte-wise lexicographic).
#[must_use]
pub fn canonical_strs(values: &[String]) -> Vec<&str> {
    let borrowed: Vec<&str> = values.iter().map(String::as_str).collect();
    canonical_order(&borrowed, |a, b| a.cmp(b))
}

/// Collapse float representations that denote the same value.
///
/// `-0.0` becomes `+0.0`; every NaN payload becomes [`CANONICAL_NAN_BITS`].
#[must_use]
#[allow(clippy::float_cmp)] // matches both signed zeros
pub fn normalize_f32(value: f32) -> f32 {
    if value.is_nan() {
        f32::from_bits(CANONICAL_NAN_BITS)
    } else if value == 0.0 {
        0.0
    } else {
        value
    }
}
