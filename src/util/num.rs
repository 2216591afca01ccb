/// Relative tolerance used by `equal` and `not_equal`.
pub const REL_TOLERANCE: f64 = 1e-10;

/// Whether a scalar counts as true: any value other than zero.
///
/// NaN is true, matching the IEEE-754 comparison `NaN != 0`.
///
/// # Example
/// ```
/// use formulary::util::num::is_true;
///
/// assert!(is_true(-0.5));
/// assert!(!is_true(0.0));
/// assert!(!is_true(-0.0));
/// ```
#[must_use]
pub fn is_true(value: f64) -> bool {
    value != 0.0
}

/// Encodes a boolean as `1.0` or `0.0`.
#[must_use]
pub const fn from_bool(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Converts a length or count to `f64`.
///
/// Lengths in this crate are far below `2^53`, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub const fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Converts a scalar to an index, truncating towards zero.
///
/// Returns `None` for negative, infinite and NaN values.
///
/// # Example
/// ```
/// use formulary::util::num::to_index;
///
/// assert_eq!(to_index(2.9), Some(2));
/// assert_eq!(to_index(-0.5), Some(0));
/// assert_eq!(to_index(-1.0), None);
/// assert_eq!(to_index(f64::NAN), None);
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn to_index(value: f64) -> Option<usize> {
    let index = value.trunc();
    if !index.is_finite() || index < 0.0 || index >= usize_to_f64(usize::MAX) {
        return None;
    }
    Some(index as usize)
}

/// Compares two scalars with a relative tolerance.
///
/// # Example
/// ```
/// use formulary::util::num::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-12));
/// assert!(!approx_equal(1.0, 1.001));
/// assert!(approx_equal(0.0, 0.0));
/// ```
#[must_use]
pub fn approx_equal(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= REL_TOLERANCE * scale
}

/// Rounds `value` to `digits` decimal places.
///
/// # Example
/// ```
/// use formulary::util::num::round_to;
///
/// assert_eq!(round_to(3.14159, 2.0), 3.14);
/// assert_eq!(round_to(1234.5, -2.0), 1200.0);
/// ```
#[must_use]
pub fn round_to(value: f64, digits: f64) -> f64 {
    let digits = digits.trunc();
    if digits < 0.0 {
        let factor = 10f64.powf(-digits);
        return (value / factor).round() * factor;
    }
    let factor = 10f64.powf(digits);
    (value * factor).round() / factor
}
