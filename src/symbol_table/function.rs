use std::{fmt, rc::Rc};

/// A numeric function callable from compiled expressions.
///
/// Implementors carry their own context: whatever state the function needs
/// lives in `self` and is handed back unchanged on every call. The engine
/// treats calls as pure and never re-enters the compiler from them.
///
/// # Example
/// ```
/// use formulary::{Expression, Function, SymbolTable};
///
/// struct Scale {
///     factor: f64,
/// }
///
/// impl Function for Scale {
///     fn arity(&self) -> usize {
///         1
///     }
///
///     fn call(&self, args: &[f64]) -> f64 {
///         args[0] * self.factor
///     }
/// }
///
/// let symbols = SymbolTable::new();
/// symbols.add_function("scale", Scale { factor: 3.0 }).unwrap();
///
/// let expression = Expression::compile("scale(2)", &symbols).unwrap();
/// assert_eq!(expression.value(), 6.0);
/// ```
pub trait Function {
    /// Number of arguments, between 1 and 4.
    fn arity(&self) -> usize;

    /// Invokes the function. `args` always holds exactly
    /// [`arity`](Function::arity) values.
    fn call(&self, args: &[f64]) -> f64;
}

impl fmt::Debug for dyn Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function(arity {})", self.arity())
    }
}

/// Shared handle to a registered function.
pub type FunctionRef = Rc<dyn Function>;

/// Generates a closure adapter of fixed arity.
///
/// Each adapter is a tuple struct around a closure and implements
/// [`Function`] by unpacking the argument slice into positional arguments.
macro_rules! function_adapter {
    ($(#[$meta:meta])* $adapter:ident, $arity:literal, $($arg:ident: $ty:ty),+) => {
        $(#[$meta])*
        pub struct $adapter<F>(pub F);

        impl<F> Function for $adapter<F>
            where F: Fn($($ty),+) -> f64
        {
            fn arity(&self) -> usize {
                $arity
            }

            fn call(&self, args: &[f64]) -> f64 {
                match args {
                    [$($arg),+] => (self.0)($(*$arg),+),
                    _ => f64::NAN,
                }
            }
        }
    };
}

function_adapter!(
    /// Adapts `Fn(f64) -> f64`.
    Function1, 1, a: f64
);
function_adapter!(
    /// Adapts `Fn(f64, f64) -> f64`.
    Function2, 2, a: f64, b: f64
);
function_adapter!(
    /// Adapts `Fn(f64, f64, f64) -> f64`.
    Function3, 3, a: f64, b: f64, c: f64
);
function_adapter!(
    /// Adapts `Fn(f64, f64, f64, f64) -> f64`.
    Function4, 4, a: f64, b: f64, c: f64, d: f64
);
