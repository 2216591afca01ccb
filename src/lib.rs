//! # formulary
//!
//! formulary compiles mathematical and logical expressions into an
//! executable node graph and evaluates them repeatedly against live variable
//! bindings. Scalars, strings and fixed-length vectors are bound by a
//! [`SymbolTable`] the host keeps a handle to; changing a bound value changes
//! the result of the next evaluation without recompiling.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the compiled node graph.
///
/// This module declares the scalar, string and vector node families the
/// parser builds and the evaluator walks, along with the operator enums they
/// carry. Nodes hold their own handles to the storage they read, so a graph
/// stays valid for as long as it lives.
pub mod ast;
/// Provides the error types of compilation and binding.
///
/// Compilation reports structured diagnostics, each tagged with the phase
/// that raised it and its source position. Symbol table operations report a
/// `BindingError`. Evaluation has no error type: it is total.
pub mod error;
/// The compiled expression handle.
///
/// Holds a registered symbol table and, once compiled, the root of the node
/// graph.
pub mod expression;
/// Orchestrates compilation and evaluation.
///
/// This module ties together the lexer, the parser with its binding and type
/// checks, the evaluator and the runtime value type.
///
/// # Responsibilities
/// - Tokenizes source text and reports every lexical error.
/// - Parses, binds and type-checks identifiers in a single pass.
/// - Evaluates the node graph against the current bindings.
pub mod interpreter;
/// Compilation settings.
pub mod settings;
/// Binds names to live storage and user functions.
///
/// The table is a cheap handle: clones share the same bindings, and the
/// storage cells it hands out are shared with every expression compiled
/// against it.
pub mod symbol_table;
/// General utilities for numeric conversion and truth values.
///
/// # Responsibilities
/// - Convert between `usize` and `f64` without silent surprises.
/// - Define truthiness and approximate equality for the built-ins.
pub mod util;

pub use crate::{
    ast::Kind,
    error::{BindingError, CompileError, Diagnostic, ErrorMode},
    expression::Expression,
    interpreter::{
        parser::{
            core::Parser,
            resolver::{Resolution, UnknownSymbolResolver},
        },
        value::Value,
    },
    settings::Settings,
    symbol_table::{
        Function, Function1, Function2, Function3, Function4, StringVar, SymbolTable, Variable,
        VectorVar,
    },
};

/// Compiles and evaluates `source` once.
///
/// The expression is compiled against a fresh symbol table holding the
/// constants `pi`, `epsilon` and `inf`.
///
/// # Errors
/// Returns the diagnostics if the expression does not compile.
///
/// # Examples
/// ```
/// use formulary::{Value, evaluate};
///
/// assert_eq!(evaluate("2 + 2").unwrap(), Value::Number(4.0));
/// assert_eq!(evaluate("'ab' + 'cd'").unwrap(), Value::from("abcd"));
///
/// // 'x' is not defined
/// assert!(evaluate("x + 1").is_err());
/// ```
pub fn evaluate(source: &str) -> Result<Value, CompileError> {
    let symbols = SymbolTable::new();
    symbols.add_constants();

    let expression = Expression::compile(source, &symbols)?;
    Ok(expression.evaluate())
}
