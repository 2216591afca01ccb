use std::cmp::Ordering;

use crate::ast::BinaryOperator;

/// Maps a comparison operator and an ordering to the boolean result.
///
/// An absent ordering, as produced by comparisons involving NaN, satisfies
/// only `!=`.
///
/// # Example
/// ```
/// use std::cmp::Ordering;
///
/// use formulary::{ast::BinaryOperator, interpreter::evaluator::binary::comparison::holds};
///
/// assert!(holds(BinaryOperator::LessEqual, Some(Ordering::Equal)));
/// assert!(holds(BinaryOperator::NotEqual, None));
/// assert!(!holds(BinaryOperator::Equal, None));
/// ```
#[must_use]
pub fn holds(op: BinaryOperator, ordering: Option<Ordering>) -> bool {
    use BinaryOperator::{Equal, Greater, GreaterEqual, Less, LessEqual, NotEqual};

    match (op, ordering) {
        (NotEqual, None) => true,
        (_, None) => false,
        (Less, Some(ordering)) => ordering.is_lt(),
        (LessEqual, Some(ordering)) => ordering.is_le(),
        (Greater, Some(ordering)) => ordering.is_gt(),
        (GreaterEqual, Some(ordering)) => ordering.is_ge(),
        (Equal, Some(ordering)) => ordering.is_eq(),
        (NotEqual, Some(ordering)) => ordering.is_ne(),
        _ => false,
    }
}

/// Compares two scalars with exact IEEE-754 semantics.
#[must_use]
pub fn compare(op: BinaryOperator, left: f64, right: f64) -> bool {
    holds(op, left.partial_cmp(&right))
}
