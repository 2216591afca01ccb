/// Built-in function implementations.
///
/// The scalar functions that have no direct counterpart among the `f64`
/// methods, such as `sgn`, `sinc` or `logn`.
pub mod builtin;
/// The `clamp`, `iclamp` and `inrange` function implementations.
///
/// Range checks over a lower bound, a value and an upper bound.
pub mod clamp;
/// `min`, `max`, `sum`, `avg` and `mul` implementations.
///
/// Reductions over argument lists and vectors.
pub mod min_max;

pub mod core;

pub use self::core::{Arity, BUILTIN_FUNCTIONS, Builtin, BuiltinFunction, is_builtin, lookup_builtin};
