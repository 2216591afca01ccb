use crate::util::num::from_bool;

/// Clamps `x` to the range `[lower, upper]`.
///
/// # Example
/// ```
/// use formulary::interpreter::evaluator::function::clamp::clamp;
///
/// assert_eq!(clamp(0.0, 5.0, 3.0), 3.0);
/// assert_eq!(clamp(0.0, -1.0, 3.0), 0.0);
/// assert_eq!(clamp(0.0, 2.0, 3.0), 2.0);
/// ```
#[must_use]
pub fn clamp(lower: f64, x: f64, upper: f64) -> f64 {
    if x < lower {
        lower
    } else if x > upper {
        upper
    } else {
        x
    }
}

/// Inverse clamp: values strictly inside `(lower, upper)` snap to the closest
/// bound, values outside are returned unchanged.
///
/// # Example
/// ```
/// use formulary::interpreter::evaluator::function::clamp::iclamp;
///
/// assert_eq!(iclamp(0.0, 1.0, 10.0), 0.0);
/// assert_eq!(iclamp(0.0, 7.0, 10.0), 10.0);
/// assert_eq!(iclamp(0.0, 12.0, 10.0), 12.0);
/// ```
#[must_use]
pub fn iclamp(lower: f64, x: f64, upper: f64) -> f64 {
    if x <= lower || x >= upper {
        x
    } else if x - lower < upper - x {
        lower
    } else {
        upper
    }
}

/// `1.0` when `lower <= x <= upper`.
#[must_use]
pub fn inrange(lower: f64, x: f64, upper: f64) -> f64 {
    from_bool(lower <= x && x <= upper)
}
