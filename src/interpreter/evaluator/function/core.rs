use std::fmt;

use crate::{
    ast::{Aggregate, ScalarNode},
    interpreter::evaluator::function::{
        builtin,
        clamp::{clamp, iclamp, inrange},
        min_max::aggregate,
    },
};

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `AtLeast(n)` means the builtin accepts `n` or more arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// This many arguments or more.
    AtLeast(usize),
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    #[must_use]
    pub const fn check(self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == m,
            Self::AtLeast(m) => n >= m,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(1) => write!(f, "1 argument"),
            Self::Exact(n) => write!(f, "{n} arguments"),
            Self::AtLeast(1) => write!(f, "at least 1 argument"),
            Self::AtLeast(n) => write!(f, "at least {n} arguments"),
        }
    }
}

/// The implementation behind a built-in function name.
#[derive(Debug, Clone, Copy)]
pub enum BuiltinFunction {
    /// Takes one scalar. Applied element-wise to a vector argument.
    Unary(fn(f64) -> f64),
    /// Takes two scalars.
    Binary(fn(f64, f64) -> f64),
    /// Takes three scalars.
    Ternary(fn(f64, f64, f64) -> f64),
    /// Reduces one or more scalars, or the elements of a single vector.
    Aggregate(Aggregate),
}

impl BuiltinFunction {
    /// The number of arguments the function accepts.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::Unary(_) => Arity::Exact(1),
            Self::Binary(_) => Arity::Exact(2),
            Self::Ternary(_) => Arity::Exact(3),
            Self::Aggregate(_) => Arity::AtLeast(1),
        }
    }

    /// Evaluates the arguments left to right and applies the function.
    ///
    /// Yields NaN if the argument count does not match the arity.
    pub fn call(self, arguments: &[ScalarNode]) -> f64 {
        match (self, arguments) {
            (Self::Unary(f), [x]) => f(x.eval()),
            (Self::Binary(f), [x, y]) => {
                let x = x.eval();
                f(x, y.eval())
            },
            (Self::Ternary(f), [x, y, z]) => {
                let x = x.eval();
                let y = y.eval();
                f(x, y, z.eval())
            },
            (Self::Aggregate(op), arguments) => aggregate(op, arguments.iter().map(ScalarNode::eval)),
            _ => f64::NAN,
        }
    }
}

/// A named entry of the built-in table.
#[derive(Debug)]
pub struct Builtin {
    /// The reserved name.
    pub name:     &'static str,
    /// The implementation.
    pub function: BuiltinFunction,
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides a string name and the implementation, tagged with its
/// shape (`Unary`, `Binary`, `Ternary` or `Aggregate`). The shape determines
/// the arity.
///
/// The macro produces:
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => $shape:ident($func:expr)
        ),* $(,)?
    ) => {
        static BUILTIN_TABLE: &[Builtin] = &[
            $(
                Builtin { name: $name, function: BuiltinFunction::$shape($func) },
            )*
        ];
        /// Names of all built-in functions. None of them may be bound in a
        /// symbol table.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "abs"       => Unary(f64::abs),
    "acos"      => Unary(f64::acos),
    "acosh"     => Unary(f64::acosh),
    "asin"      => Unary(f64::asin),
    "asinh"     => Unary(f64::asinh),
    "atan"      => Unary(f64::atan),
    "atanh"     => Unary(f64::atanh),
    "ceil"      => Unary(f64::ceil),
    "cos"       => Unary(f64::cos),
    "cosh"      => Unary(f64::cosh),
    "cot"       => Unary(builtin::cot),
    "csc"       => Unary(builtin::csc),
    "sec"       => Unary(builtin::sec),
    "exp"       => Unary(f64::exp),
    "expm1"     => Unary(f64::exp_m1),
    "floor"     => Unary(f64::floor),
    "frac"      => Unary(f64::fract),
    "log"       => Unary(f64::ln),
    "log10"     => Unary(f64::log10),
    "log1p"     => Unary(f64::ln_1p),
    "log2"      => Unary(f64::log2),
    "round"     => Unary(f64::round),
    "sgn"       => Unary(builtin::sgn),
    "sin"       => Unary(f64::sin),
    "sinc"      => Unary(builtin::sinc),
    "sinh"      => Unary(f64::sinh),
    "sqrt"      => Unary(f64::sqrt),
    "tan"       => Unary(f64::tan),
    "tanh"      => Unary(f64::tanh),
    "trunc"     => Unary(f64::trunc),
    "deg2rad"   => Unary(f64::to_radians),
    "rad2deg"   => Unary(f64::to_degrees),
    "deg2grad"  => Unary(builtin::deg2grad),
    "grad2deg"  => Unary(builtin::grad2deg),
    "notnot"    => Unary(builtin::notnot),
    "atan2"     => Binary(f64::atan2),
    "hypot"     => Binary(f64::hypot),
    "logn"      => Binary(builtin::logn),
    "pow"       => Binary(f64::powf),
    "root"      => Binary(builtin::root),
    "roundn"    => Binary(builtin::roundn),
    "equal"     => Binary(builtin::equal),
    "not_equal" => Binary(builtin::not_equal),
    "clamp"     => Ternary(clamp),
    "inrange"   => Ternary(inrange),
    "iclamp"    => Ternary(iclamp),
    "min"       => Aggregate(Aggregate::Min),
    "max"       => Aggregate(Aggregate::Max),
    "sum"       => Aggregate(Aggregate::Sum),
    "avg"       => Aggregate(Aggregate::Avg),
    "mul"       => Aggregate(Aggregate::Mul),
}

/// Looks up a built-in function by name.
///
/// # Example
/// ```
/// use formulary::interpreter::evaluator::function::{Arity, lookup_builtin};
///
/// let hypot = lookup_builtin("hypot").unwrap();
/// assert_eq!(hypot.function.arity(), Arity::Exact(2));
/// assert!(lookup_builtin("hypotenuse").is_none());
/// ```
#[must_use]
pub fn lookup_builtin(name: &str) -> Option<&'static Builtin> {
    BUILTIN_TABLE.iter().find(|builtin| builtin.name == name)
}

/// Whether `name` names a built-in function.
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    lookup_builtin(name).is_some()
}
