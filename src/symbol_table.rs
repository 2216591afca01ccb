/// The symbol table handle and its bindings.
///
/// Maps names to live storage: scalars, constants, strings, vectors and user
/// functions. Enforces name validity and global uniqueness.
pub mod core;
/// User functions callable from expressions.
///
/// Declares the `Function` trait and the closure adapters of arity one to
/// four.
pub mod function;
/// Shared storage cells.
///
/// The handles a table binds and compiled expressions read: `Variable`,
/// `StringVar` and `VectorVar`. Cloning a handle never copies the value.
pub mod storage;

pub use self::{
    core::{Binding, SymbolTable},
    function::{Function, Function1, Function2, Function3, Function4, FunctionRef},
    storage::{StringVar, Variable, VectorVar},
};
