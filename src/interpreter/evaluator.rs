/// Binary operator evaluation logic.
///
/// Handles arithmetic, comparisons and logical operators over scalars,
/// including the short-circuiting forms of `and` and `or`.
pub mod binary;

/// Unary operator evaluation logic.
///
/// Implements arithmetic negation and logical negation.
pub mod unary;

/// Core evaluation logic.
///
/// Walks the scalar, string and vector node families and produces their
/// values. Evaluation is total: it never fails and never panics.
pub mod core;

/// Evaluation of `while` and `for` loops.
///
/// Runs loop bodies, applies the iteration bound and yields the value of the
/// last executed iteration.
pub mod loops;

/// String operations.
///
/// Comparison, containment, wildcard matching and clipped substrings over
/// byte strings.
pub mod string;

/// Vector operations.
///
/// Element access, element-wise arithmetic with scalar broadcast and
/// assignment into fixed-length storage.
pub mod vector;

/// Function evaluation.
///
/// Declares the built-in function table and the implementations behind it.
pub mod function;
