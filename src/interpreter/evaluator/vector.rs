use crate::{
    ast::{BinaryOperator, Operand, ScalarNode, VectorNode},
    interpreter::evaluator::binary::core::apply,
    symbol_table::VectorVar,
    util::num::to_index,
};

/// An evaluated operand of an element-wise operation.
enum Evaluated {
    Vector(Vec<f64>),
    Scalar(f64),
}

impl Evaluated {
    fn of(operand: &Operand) -> Self {
        match operand {
            Operand::Vector(vector) => Self::Vector(vector.eval()),
            Operand::Scalar(scalar) => Self::Scalar(scalar.eval()),
        }
    }
}

/// Reads `vector[index]`, or NaN when the index is out of range.
pub fn element(vector: &VectorNode, index: f64) -> f64 {
    let Some(index) = to_index(index) else {
        return f64::NAN;
    };

    let value = match vector {
        VectorNode::Variable(variable) => variable.get(index),
        other => other.eval().get(index).copied(),
    };
    value.unwrap_or(f64::NAN)
}

/// Writes `target[index]`, optionally combining with the current element.
///
/// Returns the stored value, or NaN without writing when the index is out of
/// range.
pub fn assign_element(target: &VectorVar,
                      index: f64,
                      op: Option<BinaryOperator>,
                      value: f64)
                      -> f64 {
    let Some(index) = to_index(index) else {
        return f64::NAN;
    };
    let Some(current) = target.get(index) else {
        return f64::NAN;
    };

    let value = op.map_or(value, |op| apply(op, current, value));
    target.set(index, value);
    value
}

/// Applies arithmetic operators element by element, from left to right.
///
/// A scalar operand is broadcast. The result is as long as the shortest
/// vector operand.
pub fn elementwise(first: &Operand, rest: &[(BinaryOperator, Operand)]) -> Vec<f64> {
    let result = rest.iter().fold(Evaluated::of(first), |acc, (op, operand)| {
                                combine(*op, acc, Evaluated::of(operand))
                            });

    match result {
        Evaluated::Vector(values) => values,
        Evaluated::Scalar(value) => vec![value],
    }
}

fn combine(op: BinaryOperator, left: Evaluated, right: Evaluated) -> Evaluated {
    match (left, right) {
        (Evaluated::Vector(left), Evaluated::Vector(right)) => {
            Evaluated::Vector(left.iter().zip(&right).map(|(l, r)| apply(op, *l, *r)).collect())
        },
        (Evaluated::Vector(left), Evaluated::Scalar(right)) => {
            Evaluated::Vector(left.iter().map(|l| apply(op, *l, right)).collect())
        },
        (Evaluated::Scalar(left), Evaluated::Vector(right)) => {
            Evaluated::Vector(right.iter().map(|r| apply(op, left, *r)).collect())
        },
        (Evaluated::Scalar(left), Evaluated::Scalar(right)) => Evaluated::Scalar(apply(op, left, right)),
    }
}

/// Assigns into a vector and returns its new content.
///
/// A scalar value is broadcast to every element. A vector value overwrites
/// the leading elements; extra source elements are ignored and the target
/// keeps its length.
pub fn assign(target: &VectorVar, op: Option<BinaryOperator>, value: &Operand) -> Vec<f64> {
    let value = Evaluated::of(value);
    let combine = |current: f64, value: f64| op.map_or(value, |op| apply(op, current, value));

    {
        let mut slots = target.borrow_mut();
        match value {
            Evaluated::Scalar(value) => {
                for slot in slots.iter_mut() {
                    *slot = combine(*slot, value);
                }
            },
            Evaluated::Vector(values) => {
                for (slot, value) in slots.iter_mut().zip(values) {
                    *slot = combine(*slot, value);
                }
            },
        }
    }

    target.to_vec()
}

/// Resets a declared vector: leading elements from `values`, zeros after.
///
/// With `fill`, the single value is written to every element instead.
pub fn initialize(target: &VectorVar, values: &[ScalarNode], fill: bool) -> Vec<f64> {
    let values: Vec<f64> = values.iter().map(ScalarNode::eval).collect();

    {
        let mut slots = target.borrow_mut();
        if fill && let [value] = values.as_slice() {
            slots.fill(*value);
        } else {
            slots.fill(0.0);
            for (slot, value) in slots.iter_mut().zip(&values) {
                *slot = *value;
            }
        }
    }

    target.to_vec()
}
