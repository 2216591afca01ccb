/// The evaluator module computes the value of compiled nodes.
///
/// The evaluator walks the node graph, reads bound storage, applies
/// operators and built-in functions, and runs control flow. It never fails:
/// invalid operations produce NaN following IEEE-754 rules.
///
/// # Responsibilities
/// - Evaluates scalar, string and vector nodes.
/// - Runs loops under the configured iteration bound.
/// - Clips out-of-range string and vector accesses.
pub mod evaluator;
/// The lexer module tokenizes source text for the parser.
///
/// The lexer reads the raw source text and produces a stream of lexemes,
/// each carrying its token, its text and its line and column.
///
/// # Responsibilities
/// - Recognizes numbers, quoted strings, identifiers, keywords and
///   operators.
/// - Skips whitespace and comments while tracking positions.
/// - Reports every lexical error of the input.
pub mod lexer;
/// The parser module builds the node graph from lexemes.
///
/// The parser binds identifiers as it goes, checks operand kinds and folds
/// constant subexpressions. Errors are collected as diagnostics.
///
/// # Responsibilities
/// - Implements the operator precedence and statement grammar.
/// - Resolves identifiers against local declarations, the symbol table and
///   the unknown-symbol resolver.
/// - Recovers from syntax errors at statement boundaries.
pub mod parser;
/// The value module defines the result of an evaluation.
///
/// An evaluation yields a number, a byte string or a vector, matching the
/// kind of the compiled root node.
pub mod value;
