/// Compile-time diagnostics.
///
/// Defines the structured record produced for every lexical, syntax, symbol
/// or type error found while compiling an expression, together with the
/// `CompileError` wrapper returned by the `Result`-based API.
pub mod diagnostic;
/// Symbol table errors.
///
/// Every add, create or remove operation on a symbol table either fully
/// succeeds or reports one of these errors without touching the table.
pub mod binding_error;

pub use binding_error::BindingError;
pub use diagnostic::{CompileError, Diagnostic, ErrorMode};
