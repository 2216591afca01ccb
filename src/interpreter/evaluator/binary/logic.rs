use crate::ast::BinaryOperator;

/// Evaluates a logical operator over two truth values.
///
/// # Example
/// ```
/// use formulary::{ast::BinaryOperator, interpreter::evaluator::binary::logic::logic};
///
/// assert!(logic(BinaryOperator::Xor, true, false));
/// assert!(!logic(BinaryOperator::Nand, true, true));
/// assert!(logic(BinaryOperator::Xnor, false, false));
/// ```
#[must_use]
pub const fn logic(op: BinaryOperator, left: bool, right: bool) -> bool {
    use BinaryOperator::{And, Nand, Nor, Or, Xnor, Xor};

    match op {
        And => left && right,
        Or => left || right,
        Xor => left ^ right,
        Nand => !(left && right),
        Nor => !(left || right),
        Xnor => left == right,
        _ => false,
    }
}
