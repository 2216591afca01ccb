use crate::ast::BinaryOperator;

/// Evaluates an arithmetic operator.
///
/// Follows IEEE-754: division by zero yields an infinity or NaN, `%` is the
/// floating point remainder with the sign of the dividend.
///
/// # Parameters
/// - `op`: One of `Add`, `Sub`, `Mul`, `Div`, `Mod` or `Pow`.
/// - `left`: Left operand.
/// - `right`: Right operand.
///
/// # Returns
/// The result, or NaN for a non-arithmetic operator.
///
/// # Example
/// ```
/// use formulary::{ast::BinaryOperator, interpreter::evaluator::binary::scalar::arithmetic};
///
/// assert_eq!(arithmetic(BinaryOperator::Pow, 2.0, 10.0), 1024.0);
/// assert_eq!(arithmetic(BinaryOperator::Mod, -7.0, 3.0), -1.0);
/// assert_eq!(arithmetic(BinaryOperator::Div, 1.0, 0.0), f64::INFINITY);
/// ```
#[must_use]
pub fn arithmetic(op: BinaryOperator, left: f64, right: f64) -> f64 {
    use BinaryOperator::{Add, Div, Mod, Mul, Pow, Sub};

    match op {
        Add => left + right,
        Sub => left - right,
        Mul => left * right,
        Div => left / right,
        Mod => left % right,
        Pow => left.powf(right),
        _ => f64::NAN,
    }
}
