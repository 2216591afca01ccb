use crate::{
    ast::{Node, ScalarNode, StringNode, VectorNode},
    interpreter::{
        evaluator::{binary, function::min_max::aggregate, loops, string, unary, vector},
        value::Value,
    },
    util::num::{from_bool, is_true, usize_to_f64},
};

impl Node {
    /// Evaluates the node and returns its full value.
    #[must_use]
    pub fn eval(&self) -> Value {
        match self {
            Self::Scalar(node) => Value::Number(node.eval()),
            Self::String(node) => Value::Text(node.eval()),
            Self::Vector(node) => Value::Vector(node.eval()),
        }
    }

    /// Evaluates the node for its side effects only.
    pub fn execute(&self) {
        match self {
            Self::Scalar(node) => {
                node.eval();
            },
            Self::String(node) => {
                node.eval();
            },
            Self::Vector(node) => {
                node.eval();
            },
        }
    }

    /// Evaluates the node as a scalar: string and vector nodes run for their
    /// side effects and yield NaN.
    pub fn eval_scalar(&self) -> f64 {
        match self {
            Self::Scalar(node) => node.eval(),
            other => {
                other.execute();
                f64::NAN
            },
        }
    }
}

fn execute_all(statements: &[Node]) {
    for statement in statements {
        statement.execute();
    }
}

impl ScalarNode {
    /// Evaluates the node.
    ///
    /// This is the main entry point for scalar evaluation. The evaluator
    /// dispatches on the node variant; bound variables are read at the time
    /// of the call, so every evaluation sees the current bindings.
    ///
    /// # Example
    /// ```
    /// use formulary::{
    ///     Variable,
    ///     ast::{BinaryOperator, ScalarNode},
    /// };
    ///
    /// let x = Variable::new(2.0);
    /// let node = ScalarNode::Binary { op:    BinaryOperator::Mul,
    ///                                 left:  Box::new(ScalarNode::Variable(x.clone())),
    ///                                 right: Box::new(ScalarNode::Constant(10.0)), };
    ///
    /// assert_eq!(node.eval(), 20.0);
    /// x.set(3.0);
    /// assert_eq!(node.eval(), 30.0);
    /// ```
    pub fn eval(&self) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Variable(variable) => variable.get(),
            Self::Unary { op, operand } => unary::apply(*op, operand.eval()),
            Self::Binary { op, left, right } => binary::core::eval_binary(*op, left, right),
            Self::Chain { first, rest } => rest.iter()
                                               .fold(first.eval(), |acc, (op, right)| {
                                                   binary::core::continue_with(*op, acc, right)
                                               }),
            Self::Conditional { condition,
                                consequent,
                                alternative, } => {
                if is_true(condition.eval()) {
                    consequent.eval()
                } else {
                    alternative.as_ref().map_or(f64::NAN, |alternative| alternative.eval())
                }
            },
            Self::Switch { cases, default } => cases.iter()
                                                    .find(|(condition, _)| is_true(condition.eval()))
                                                    .map_or_else(|| default.eval(), |(_, value)| value.eval()),
            Self::While { condition,
                          body,
                          limit, } => loops::eval_while(condition, body, *limit),
            Self::For { initializer,
                        condition,
                        increment,
                        body,
                        limit, } => loops::eval_for(initializer.as_deref(),
                                                    condition.as_deref(),
                                                    increment.as_deref(),
                                                    body,
                                                    *limit),
            Self::Sequence { statements, result } => {
                execute_all(statements);
                result.eval()
            },
            Self::Assign { target, op, value } => {
                let value = value.eval();
                let value = op.map_or(value, |op| binary::core::apply(op, target.get(), value));
                target.set(value);
                value
            },
            Self::Element { vector, index } => vector::element(vector, index.eval()),
            Self::AssignElement { target,
                                  index,
                                  op,
                                  value, } => {
                let index = index.eval();
                vector::assign_element(target, index, *op, value.eval())
            },
            Self::VectorSize(vector) => match vector.as_ref() {
                VectorNode::Variable(variable) => usize_to_f64(variable.len()),
                other => usize_to_f64(other.eval().len()),
            },
            Self::StringLength(node) => usize_to_f64(string::length(node)),
            Self::StringCompare { op, left, right } => {
                let left = left.eval();
                from_bool(string::compare(*op, &left, &right.eval()))
            },
            Self::StringMatch { op, left, right } => {
                let left = left.eval();
                from_bool(string::matches(*op, &left, &right.eval()))
            },
            Self::Builtin { function, arguments, .. } => function.call(arguments),
            Self::VectorAggregate { op, vector } => aggregate(*op, vector.eval()),
            Self::UserCall { function, arguments, .. } => {
                let arguments: Vec<f64> = arguments.iter().map(Self::eval).collect();
                function.call(&arguments)
            },
        }
    }
}

impl StringNode {
    /// Evaluates the node into a fresh byte string.
    pub fn eval(&self) -> Vec<u8> {
        match self {
            Self::Literal(bytes) => bytes.clone(),
            Self::Variable(variable) => variable.get(),
            Self::Concat(parts) => parts.iter().flat_map(Self::eval).collect(),
            Self::Substring { source, start, end } => {
                let source = source.eval();
                let start = start.as_ref().map(|start| start.eval());
                let end = end.as_ref().map(|end| end.eval());
                string::substring(&source, start, end)
            },
            Self::Conditional { condition,
                                consequent,
                                alternative, } => {
                if is_true(condition.eval()) {
                    consequent.eval()
                } else {
                    alternative.as_ref()
                               .map(|alternative| alternative.eval())
                               .unwrap_or_default()
                }
            },
            Self::Assign { target,
                           append,
                           value, } => {
                let value = value.eval();
                if *append {
                    target.append(&value);
                } else {
                    target.set(&value);
                }
                target.get()
            },
            Self::Sequence { statements, result } => {
                execute_all(statements);
                result.eval()
            },
        }
    }
}

impl VectorNode {
    /// Evaluates the node into a fresh list of elements.
    pub fn eval(&self) -> Vec<f64> {
        match self {
            Self::Variable(variable) => variable.to_vec(),
            Self::Negate(operand) => operand.eval().into_iter().map(|x| -x).collect(),
            Self::Map { function, operand, .. } => {
                operand.eval().into_iter().map(*function).collect()
            },
            Self::Elementwise { first, rest } => vector::elementwise(first, rest),
            Self::Assign { target, op, value } => vector::assign(target, *op, value),
            Self::Initialize { target,
                               values,
                               fill, } => vector::initialize(target, values, *fill),
            Self::Sequence { statements, result } => {
                execute_all(statements);
                result.eval()
            },
        }
    }
}
