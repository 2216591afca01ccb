use crate::{
    ast::{BinaryOperator, ScalarNode},
    interpreter::evaluator::binary::{comparison::compare, logic::logic, scalar::arithmetic},
    util::num::{from_bool, is_true},
};

/// Applies a binary operator to two evaluated scalars.
///
/// Comparisons and logical operators produce `1.0` or `0.0`.
///
/// # Example
/// ```
/// use formulary::{ast::BinaryOperator, interpreter::evaluator::binary::core::apply};
///
/// assert_eq!(apply(BinaryOperator::Add, 2.0, 3.0), 5.0);
/// assert_eq!(apply(BinaryOperator::Less, 2.0, 3.0), 1.0);
/// assert_eq!(apply(BinaryOperator::Or, 0.0, 0.0), 0.0);
/// ```
#[must_use]
pub fn apply(op: BinaryOperator, left: f64, right: f64) -> f64 {
    if op.is_arithmetic() {
        arithmetic(op, left, right)
    } else if op.is_comparison() {
        from_bool(compare(op, left, right))
    } else {
        from_bool(logic(op, is_true(left), is_true(right)))
    }
}

/// Evaluates a binary node.
///
/// `and` skips its right operand when the left one is false, `or` when the
/// left one is true. Every other operator evaluates both sides, left first.
pub fn eval_binary(op: BinaryOperator, left: &ScalarNode, right: &ScalarNode) -> f64 {
    continue_with(op, left.eval(), right)
}

/// Applies `op` to an already evaluated left operand and the node `right`,
/// with the same short-circuit rules as [`eval_binary`].
pub fn continue_with(op: BinaryOperator, left: f64, right: &ScalarNode) -> f64 {
    match op {
        BinaryOperator::And if !is_true(left) => 0.0,
        BinaryOperator::Or if is_true(left) => 1.0,
        _ => apply(op, left, right.eval()),
    }
}
