use std::fmt;

use crate::{
    interpreter::evaluator::function::BuiltinFunction,
    symbol_table::{FunctionRef, StringVar, Variable, VectorVar},
};

/// The three kinds of values an expression node can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A double precision number.
    Scalar,
    /// A byte string.
    String,
    /// A fixed-length sequence of numbers.
    Vector,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::String => write!(f, "string"),
            Self::Vector => write!(f, "vector"),
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `-x`
    Negate,
    /// `!x`, `not x`
    Not,
}

/// Infix operators over scalars.
///
/// Arithmetic operators also apply element-wise to vectors, and the
/// comparison operators also compare strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `==`, `=`
    Equal,
    /// `!=`, `<>`
    NotEqual,
    /// `and`, `&`
    And,
    /// `or`, `|`
    Or,
    /// `xor`
    Xor,
    /// `nand`
    Nand,
    /// `nor`
    Nor,
    /// `xnor`
    Xnor,
}

impl BinaryOperator {
    /// Whether the operator is one of `+ - * / % ^`.
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod | Self::Pow)
    }

    /// Whether the operator is a relational comparison.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(self,
                 Self::Less
                 | Self::LessEqual
                 | Self::Greater
                 | Self::GreaterEqual
                 | Self::Equal
                 | Self::NotEqual)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::Xnor => "xnor",
        };
        write!(f, "{symbol}")
    }
}

/// Operators that test one string against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOperator {
    /// `a in b`: `a` occurs in `b`.
    In,
    /// `a like b`: `a` matches the wildcard pattern `b`.
    Like,
    /// `a ilike b`: case-insensitive `like`.
    ILike,
}

/// Reductions over several values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Sum.
    Sum,
    /// Arithmetic mean.
    Avg,
    /// Product.
    Mul,
}

/// A compiled node producing a scalar.
#[derive(Debug, Clone)]
pub enum ScalarNode {
    /// A literal or folded value.
    Constant(f64),
    /// Reads a bound scalar on every evaluation.
    Variable(Variable),
    /// A prefix operation.
    Unary {
        /// The operator.
        op:      UnaryOperator,
        /// Its operand.
        operand: Box<ScalarNode>,
    },
    /// An infix operation. `and` and `or` short-circuit.
    Binary {
        /// The operator.
        op:    BinaryOperator,
        /// Left operand.
        left:  Box<ScalarNode>,
        /// Right operand.
        right: Box<ScalarNode>,
    },
    /// A left-associative run of infix operations, `a + b - c * ...`,
    /// evaluated from left to right.
    ///
    /// Built in place of left-nested [`ScalarNode::Binary`] nodes so that
    /// long flat expressions do not turn into deep trees.
    Chain {
        /// The leftmost operand.
        first: Box<ScalarNode>,
        /// Each following operator with its right operand.
        rest:  Vec<(BinaryOperator, ScalarNode)>,
    },
    /// `c ? a : b` and `if`. A missing alternative yields NaN.
    Conditional {
        /// The tested condition.
        condition:   Box<ScalarNode>,
        /// Taken when the condition is non-zero.
        consequent:  Box<ScalarNode>,
        /// Taken otherwise.
        alternative: Option<Box<ScalarNode>>,
    },
    /// `switch { case c: v; ... default: v; }`
    Switch {
        /// Conditions paired with their results, tested in order.
        cases:   Vec<(ScalarNode, ScalarNode)>,
        /// Result when no condition holds.
        default: Box<ScalarNode>,
    },
    /// `while (c) body`
    While {
        /// Tested before each iteration.
        condition: Box<ScalarNode>,
        /// The loop body.
        body:      Box<Node>,
        /// Upper bound on the number of iterations.
        limit:     Option<u64>,
    },
    /// `for (init; c; step) body`
    For {
        /// Runs once before the loop.
        initializer: Option<Box<Node>>,
        /// Tested before each iteration; absent means always true.
        condition:   Option<Box<ScalarNode>>,
        /// Runs after each iteration.
        increment:   Option<Box<Node>>,
        /// The loop body.
        body:        Box<Node>,
        /// Upper bound on the number of iterations.
        limit:       Option<u64>,
    },
    /// Statements run for their effects, followed by the result.
    Sequence {
        /// Leading statements.
        statements: Vec<Node>,
        /// The final statement.
        result:     Box<ScalarNode>,
    },
    /// `x := v`, or a compound assignment such as `x += v`.
    Assign {
        /// The written storage.
        target: Variable,
        /// The compound operator, if any.
        op:     Option<BinaryOperator>,
        /// The assigned value.
        value:  Box<ScalarNode>,
    },
    /// `v[i]`; NaN when the index is out of range.
    Element {
        /// The indexed vector.
        vector: Box<VectorNode>,
        /// The index, truncated towards zero.
        index:  Box<ScalarNode>,
    },
    /// `v[i] := x`; ignored when the index is out of range.
    AssignElement {
        /// The written vector.
        target: VectorVar,
        /// The index, truncated towards zero.
        index:  Box<ScalarNode>,
        /// The compound operator, if any.
        op:     Option<BinaryOperator>,
        /// The assigned value.
        value:  Box<ScalarNode>,
    },
    /// `v[]`
    VectorSize(Box<VectorNode>),
    /// `s[]`
    StringLength(Box<StringNode>),
    /// A relational comparison between two strings.
    StringCompare {
        /// One of the comparison operators.
        op:    BinaryOperator,
        /// Left operand.
        left:  Box<StringNode>,
        /// Right operand.
        right: Box<StringNode>,
    },
    /// `in`, `like` and `ilike`.
    StringMatch {
        /// The matching operator.
        op:    StringOperator,
        /// The tested string.
        left:  Box<StringNode>,
        /// The container or pattern.
        right: Box<StringNode>,
    },
    /// A built-in function applied to scalars.
    Builtin {
        /// Name, for diagnostics.
        name:      &'static str,
        /// The implementation.
        function:  BuiltinFunction,
        /// Arguments, already checked against the arity.
        arguments: Vec<ScalarNode>,
    },
    /// `sum(v)`, `max(v)` and the other aggregates over a single vector.
    VectorAggregate {
        /// The reduction.
        op:     Aggregate,
        /// The reduced vector.
        vector: Box<VectorNode>,
    },
    /// A call to a function registered in the symbol table.
    UserCall {
        /// Name, for diagnostics.
        name:      String,
        /// The shared implementation.
        function:  FunctionRef,
        /// Arguments, already checked against the arity.
        arguments: Vec<ScalarNode>,
    },
}

/// A compiled node producing a byte string.
#[derive(Debug, Clone)]
pub enum StringNode {
    /// A literal or folded string.
    Literal(Vec<u8>),
    /// Reads a bound string on every evaluation.
    Variable(StringVar),
    /// `a + b + ...`
    Concat(Vec<StringNode>),
    /// `s[a:b]`, both bounds inclusive and clipped to the string.
    Substring {
        /// The sliced string.
        source: Box<StringNode>,
        /// First index; defaults to the start.
        start:  Option<Box<ScalarNode>>,
        /// Last index; defaults to the end.
        end:    Option<Box<ScalarNode>>,
    },
    /// `c ? a : b` over strings. A missing alternative yields `''`.
    Conditional {
        /// The tested condition.
        condition:   Box<ScalarNode>,
        /// Taken when the condition is non-zero.
        consequent:  Box<StringNode>,
        /// Taken otherwise.
        alternative: Option<Box<StringNode>>,
    },
    /// `s := t`, or `s += t` when `append` is set.
    Assign {
        /// The written storage.
        target: StringVar,
        /// Whether the value is appended.
        append: bool,
        /// The assigned value.
        value:  Box<StringNode>,
    },
    /// Statements run for their effects, followed by the result.
    Sequence {
        /// Leading statements.
        statements: Vec<Node>,
        /// The final statement.
        result:     Box<StringNode>,
    },
}

/// One side of an element-wise vector operation.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A vector, combined element by element.
    Vector(Box<VectorNode>),
    /// A scalar, broadcast to every element.
    Scalar(Box<ScalarNode>),
}

/// A compiled node producing a vector.
#[derive(Debug, Clone)]
pub enum VectorNode {
    /// Reads a bound vector on every evaluation.
    Variable(VectorVar),
    /// `-v`
    Negate(Box<VectorNode>),
    /// A one-argument built-in applied to every element.
    Map {
        /// Name, for diagnostics.
        name:     &'static str,
        /// The implementation.
        function: fn(f64) -> f64,
        /// The mapped vector.
        operand:  Box<VectorNode>,
    },
    /// Arithmetic operators applied element-wise, from left to right. At
    /// least one operand is a vector; the result is as long as the shortest
    /// vector operand.
    Elementwise {
        /// The leftmost operand.
        first: Operand,
        /// Each following arithmetic operator with its right operand.
        rest:  Vec<(BinaryOperator, Operand)>,
    },
    /// `v := w`, `v := x`, or a compound assignment such as `v *= 2`.
    Assign {
        /// The written vector.
        target: VectorVar,
        /// The compound operator, if any.
        op:     Option<BinaryOperator>,
        /// The assigned vector or broadcast scalar.
        value:  Operand,
    },
    /// `var v[n] := {a, b, ...}`: resets a local vector on every evaluation.
    Initialize {
        /// The declared vector.
        target: VectorVar,
        /// Leading element values; the rest are zero. A single value fills
        /// the whole vector when `fill` is set.
        values: Vec<ScalarNode>,
        /// Whether a single value is broadcast.
        fill:   bool,
    },
    /// Statements run for their effects, followed by the result.
    Sequence {
        /// Leading statements.
        statements: Vec<Node>,
        /// The final statement.
        result:     Box<VectorNode>,
    },
}

/// A compiled node of any kind.
#[derive(Debug, Clone)]
pub enum Node {
    /// Produces a number.
    Scalar(ScalarNode),
    /// Produces a byte string.
    String(StringNode),
    /// Produces a vector.
    Vector(VectorNode),
}

impl Node {
    /// The kind of value this node produces.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Scalar(_) => Kind::Scalar,
            Self::String(_) => Kind::String,
            Self::Vector(_) => Kind::Vector,
        }
    }

    /// Wraps `statements` followed by `result` into a sequence of the
    /// result's kind. A lone statement is returned as is.
    #[must_use]
    pub fn sequence(statements: Vec<Self>, result: Self) -> Self {
        if statements.is_empty() {
            return result;
        }
        match result {
            Self::Scalar(result) => Self::Scalar(ScalarNode::Sequence { statements,
                                                                        result: Box::new(result) }),
            Self::String(result) => Self::String(StringNode::Sequence { statements,
                                                                        result: Box::new(result) }),
            Self::Vector(result) => Self::Vector(VectorNode::Sequence { statements,
                                                                        result: Box::new(result) }),
        }
    }
}

impl ScalarNode {
    /// Combines two scalar nodes with an infix operator.
    ///
    /// When `left` is itself an infix node the operation is appended to it,
    /// so `a + b + c` becomes one [`ScalarNode::Chain`] rather than a nested
    /// pair of [`ScalarNode::Binary`] nodes.
    ///
    /// # Example
    /// ```
    /// use formulary::ast::{BinaryOperator, ScalarNode};
    ///
    /// let sum = [2.0, 3.0, 4.0].into_iter()
    ///                          .map(ScalarNode::Constant)
    ///                          .reduce(|left, right| ScalarNode::binary(BinaryOperator::Sub, left, right))
    ///                          .unwrap();
    ///
    /// assert!(matches!(&sum, ScalarNode::Chain { rest, .. } if rest.len() == 2));
    /// assert_eq!(sum.eval(), -5.0);
    /// ```
    #[must_use]
    pub fn binary(op: BinaryOperator, left: Self, right: Self) -> Self {
        match left {
            Self::Chain { first, mut rest } => {
                rest.push((op, right));
                Self::Chain { first, rest }
            },
            Self::Binary { op: inner,
                           left: first,
                           right: second, } => Self::Chain { first,
                                                             rest: vec![(inner, *second), (op, right)] },
            left => Self::Binary { op,
                                   left: Box::new(left),
                                   right: Box::new(right) },
        }
    }
}

impl StringNode {
    /// Concatenates two string nodes, extending `left` when it is already a
    /// concatenation.
    #[must_use]
    pub fn concat(left: Self, right: Self) -> Self {
        let mut parts = match left {
            Self::Concat(parts) => parts,
            left => vec![left],
        };
        match right {
            Self::Concat(more) => parts.extend(more),
            right => parts.push(right),
        }
        Self::Concat(parts)
    }
}

impl VectorNode {
    /// Combines two operands element-wise, extending `left` when it is
    /// already an element-wise run.
    #[must_use]
    pub fn elementwise(op: BinaryOperator, left: Operand, right: Operand) -> Self {
        match left {
            Operand::Vector(vector) => match *vector {
                Self::Elementwise { first, mut rest } => {
                    rest.push((op, right));
                    Self::Elementwise { first, rest }
                },
                vector => Self::Elementwise { first: Operand::Vector(Box::new(vector)),
                                              rest:  vec![(op, right)], },
            },
            left @ Operand::Scalar(_) => Self::Elementwise { first: left,
                                                             rest:  vec![(op, right)], },
        }
    }

    /// The number of elements this node produces.
    ///
    /// Vector lengths are fixed, so the length is known at compile time.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Variable(vector) | Self::Initialize { target: vector, .. } => vector.len(),
            Self::Assign { target, .. } => target.len(),
            Self::Negate(operand) | Self::Map { operand, .. } => operand.len(),
            Self::Elementwise { first, rest } => {
                std::iter::once(first).chain(rest.iter().map(|(_, operand)| operand))
                                      .filter_map(|operand| match operand {
                                          Operand::Vector(vector) => Some(vector.len()),
                                          Operand::Scalar(_) => None,
                                      })
                                      .min()
                                      .unwrap_or(1)
            },
            Self::Sequence { result, .. } => result.len(),
        }
    }

    /// Whether the node produces no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
