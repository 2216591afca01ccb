use crate::{
    ast::UnaryOperator,
    util::num::{from_bool, is_true},
};

/// Applies a prefix operator.
///
/// # Example
/// ```
/// use formulary::{ast::UnaryOperator, interpreter::evaluator::unary::apply};
///
/// assert_eq!(apply(UnaryOperator::Negate, 2.0), -2.0);
/// assert_eq!(apply(UnaryOperator::Not, 0.0), 1.0);
/// assert_eq!(apply(UnaryOperator::Not, f64::NAN), 0.0);
/// ```
#[must_use]
pub fn apply(op: UnaryOperator, operand: f64) -> f64 {
    match op {
        UnaryOperator::Negate => -operand,
        UnaryOperator::Not => from_bool(!is_true(operand)),
    }
}
