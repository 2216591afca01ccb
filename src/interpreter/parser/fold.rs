use tracing::trace;

use crate::{
    ast::{ScalarNode, StringNode, VectorNode},
    interpreter::{evaluator::string, parser::core::Compiler},
    util::num::is_true,
};

/// Whether the scalar node is a literal.
const fn is_constant(node: &ScalarNode) -> bool {
    matches!(node, ScalarNode::Constant(_))
}

/// Whether the string node is a literal.
const fn is_literal(node: &StringNode) -> bool {
    matches!(node, StringNode::Literal(_))
}

/// Whether evaluating the node now gives the value it will always have.
///
/// Only side-effect-free nodes over literals qualify. The size of a vector
/// variable also qualifies, since vector storage never changes length.
fn is_foldable(node: &ScalarNode) -> bool {
    match node {
        ScalarNode::Unary { operand, .. } => is_constant(operand),
        ScalarNode::Binary { left, right, .. } => is_constant(left) && is_constant(right),
        ScalarNode::Chain { first, rest } => {
            is_constant(first) && rest.iter().all(|(_, right)| is_constant(right))
        },
        ScalarNode::Builtin { arguments, .. } => arguments.iter().all(is_constant),
        ScalarNode::StringCompare { left, right, .. } | ScalarNode::StringMatch { left, right, .. } => {
            is_literal(left) && is_literal(right)
        },
        ScalarNode::StringLength(string) => is_literal(string),
        ScalarNode::VectorSize(vector) => matches!(vector.as_ref(), VectorNode::Variable(_)),
        _ => false,
    }
}

impl Compiler<'_, '_> {
    /// Replaces a scalar node by its value when that value is known at
    /// compile time.
    ///
    /// A conditional whose condition is constant is replaced by the branch it
    /// selects. Does nothing when constant folding is disabled.
    pub(super) fn fold(&self, node: ScalarNode) -> ScalarNode {
        if !self.settings.constant_folding {
            return node;
        }

        match node {
            ScalarNode::Conditional { condition,
                                      consequent,
                                      alternative, }
                if is_constant(&condition) =>
            {
                if is_true(condition.eval()) {
                    *consequent
                } else {
                    alternative.map_or(ScalarNode::Constant(f64::NAN), |alternative| *alternative)
                }
            },
            node if is_foldable(&node) => {
                let value = node.eval();
                trace!(value, "folded constant");
                ScalarNode::Constant(value)
            },
            node => node,
        }
    }

    /// Joins literal concatenations, slices literals and selects the branch
    /// of string conditionals with a constant condition.
    ///
    /// Does nothing when constant folding is disabled.
    pub(super) fn fold_string(&self, node: StringNode) -> StringNode {
        if !self.settings.constant_folding {
            return node;
        }

        match node {
            StringNode::Concat(parts) if parts.iter().all(is_literal) => {
                StringNode::Literal(parts.iter().flat_map(StringNode::eval).collect())
            },
            StringNode::Substring { source, start, end }
                if is_literal(&source)
                   && start.as_deref().is_none_or(is_constant)
                   && end.as_deref().is_none_or(is_constant) =>
            {
                let start = start.map(|start| start.eval());
                let end = end.map(|end| end.eval());
                StringNode::Literal(string::substring(&source.eval(), start, end))
            },
            StringNode::Conditional { condition,
                                      consequent,
                                      alternative, }
                if is_constant(&condition) =>
            {
                if is_true(condition.eval()) {
                    *consequent
                } else {
                    alternative.map_or_else(|| StringNode::Literal(Vec::new()), |alternative| *alternative)
                }
            },
            node => node,
        }
    }
}
