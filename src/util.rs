/// Numeric helpers.
///
/// Truth values, index conversion with range checks, tolerant comparison and
/// decimal rounding, shared by the evaluator and the built-in functions.
pub mod num;
