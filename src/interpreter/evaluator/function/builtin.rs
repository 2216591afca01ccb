use crate::util::num::{approx_equal, from_bool, is_true, round_to};

/// Returns the numeric sign of a value: `-1`, `0` or `1`.
///
/// NaN is returned unchanged.
///
/// # Example
/// ```
/// use formulary::interpreter::evaluator::function::builtin::sgn;
///
/// assert_eq!(sgn(-42.0), -1.0);
/// assert_eq!(sgn(0.0), 0.0);
/// assert!(sgn(f64::NAN).is_nan());
/// ```
#[must_use]
pub fn sgn(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        x * 0.0
    }
}

/// The cardinal sine, `sin(x) / x`, continuous at zero.
#[must_use]
pub fn sinc(x: f64) -> f64 {
    if x.abs() < f64::EPSILON { 1.0 } else { x.sin() / x }
}

/// Cotangent.
#[must_use]
pub fn cot(x: f64) -> f64 {
    1.0 / x.tan()
}

/// Cosecant.
#[must_use]
pub fn csc(x: f64) -> f64 {
    1.0 / x.sin()
}

/// Secant.
#[must_use]
pub fn sec(x: f64) -> f64 {
    1.0 / x.cos()
}

/// Converts degrees to gradians.
#[must_use]
pub fn deg2grad(x: f64) -> f64 {
    x * 10.0 / 9.0
}

/// Converts gradians to degrees.
#[must_use]
pub fn grad2deg(x: f64) -> f64 {
    x * 9.0 / 10.0
}

/// Normalizes a truth value to `1.0` or `0.0`.
#[must_use]
pub fn notnot(x: f64) -> f64 {
    from_bool(is_true(x))
}

/// Logarithm of `x` in base `n`.
///
/// # Example
/// ```
/// use formulary::interpreter::evaluator::function::builtin::logn;
///
/// assert!((logn(8.0, 2.0) - 3.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn logn(x: f64, n: f64) -> f64 {
    x.ln() / n.ln()
}

/// The `n`-th root of `x`.
///
/// Odd integral roots of negative numbers are real.
///
/// # Example
/// ```
/// use formulary::interpreter::evaluator::function::builtin::root;
///
/// assert_eq!(root(27.0, 3.0), 3.0);
/// assert_eq!(root(-8.0, 3.0), -2.0);
/// assert!(root(-4.0, 2.0).is_nan());
/// ```
#[must_use]
pub fn root(x: f64, n: f64) -> f64 {
    if n == 3.0 {
        return x.cbrt();
    }
    if x < 0.0 && n.fract() == 0.0 && n % 2.0 != 0.0 {
        return -(-x).powf(n.recip());
    }
    x.powf(n.recip())
}

/// Rounds `x` to `n` decimal places.
#[must_use]
pub fn roundn(x: f64, n: f64) -> f64 {
    round_to(x, n)
}

/// Tolerant equality: `1.0` when `a` and `b` agree to a relative tolerance.
#[must_use]
pub fn equal(a: f64, b: f64) -> f64 {
    from_bool(approx_equal(a, b))
}

/// Negation of [`equal`].
#[must_use]
pub fn not_equal(a: f64, b: f64) -> f64 {
    from_bool(!approx_equal(a, b))
}
