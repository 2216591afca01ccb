/// Operator dispatch and short-circuit evaluation.
pub mod core;

/// Arithmetic operators.
pub mod scalar;

/// Relational operators.
pub mod comparison;

/// Logical operators.
pub mod logic;
