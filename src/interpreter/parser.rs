/// The public parser and the statement-level driver.
///
/// Owns the diagnostics of the last compilation, runs the lexer and drives
/// statement parsing with error recovery at `;` boundaries.
pub mod core;

/// Unary, power and postfix parsing.
///
/// Handles prefix operators, right-associative exponentiation, subscripts
/// and the primary expressions.
pub mod unary;

/// Binary operator parsing.
///
/// Implements the precedence levels from the conditional operator down to
/// multiplication, and the kind checks that go with each operator.
pub mod binary;

/// Symbol resolution, calls, declarations and assignments.
///
/// Binds identifiers to expression-local declarations, the registered symbol
/// table or the unknown-symbol resolver.
pub mod symbol;

/// Control flow parsing.
///
/// Handles `if`, `while`, `for` and `switch`.
pub mod control;

/// Constant folding.
///
/// Replaces operator and built-in nodes whose operands are all constant by
/// their value.
pub mod fold;

/// The unknown-symbol resolver callback.
///
/// Lets the host decide what happens to identifiers that are not bound when
/// an expression is compiled.
pub mod resolver;

/// Utility functions for the parser.
///
/// Token cursor helpers, diagnostics construction, list parsing and error
/// recovery.
pub mod utils;
