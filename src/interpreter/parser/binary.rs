use crate::{
    ast::{BinaryOperator, Node, Operand, ScalarNode, StringNode, StringOperator, VectorNode},
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            core::{Compiler, ParseResult},
            utils::placeholder,
        },
    },
};

/// Maps a token to the infix operator it denotes, if any.
///
/// `=` and `==` both mean equality, `!=` and `<>` inequality, `&` and `|`
/// are the symbolic forms of `and` and `or`.
#[must_use]
pub const fn token_to_binary_operator(token: &Token) -> Option<BinaryOperator> {
    match token {
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Sub),
        Token::Star => Some(BinaryOperator::Mul),
        Token::Slash => Some(BinaryOperator::Div),
        Token::Percent => Some(BinaryOperator::Mod),
        Token::Caret => Some(BinaryOperator::Pow),
        Token::Less => Some(BinaryOperator::Less),
        Token::LessEqual => Some(BinaryOperator::LessEqual),
        Token::Greater => Some(BinaryOperator::Greater),
        Token::GreaterEqual => Some(BinaryOperator::GreaterEqual),
        Token::EqualEqual | Token::Equals => Some(BinaryOperator::Equal),
        Token::BangEqual | Token::LessGreater => Some(BinaryOperator::NotEqual),
        Token::And | Token::Ampersand => Some(BinaryOperator::And),
        Token::Or | Token::Pipe => Some(BinaryOperator::Or),
        Token::Xor => Some(BinaryOperator::Xor),
        Token::Nand => Some(BinaryOperator::Nand),
        Token::Nor => Some(BinaryOperator::Nor),
        Token::Xnor => Some(BinaryOperator::Xnor),
        _ => None,
    }
}

/// Maps a token to the string matching operator it denotes, if any.
#[must_use]
pub const fn token_to_string_operator(token: &Token) -> Option<StringOperator> {
    match token {
        Token::In => Some(StringOperator::In),
        Token::Like => Some(StringOperator::Like),
        Token::ILike => Some(StringOperator::ILike),
        _ => None,
    }
}

/// Whether the token starts a relational comparison.
fn is_relational(token: &Token) -> bool {
    token_to_string_operator(token).is_some()
    || token_to_binary_operator(token).is_some_and(BinaryOperator::is_comparison)
}

impl Compiler<'_, '_> {
    /// Parses the conditional operator.
    ///
    /// The rule is: `conditional := logical_or ("?" assignment ":" assignment)?`
    pub(super) fn parse_conditional(&mut self) -> ParseResult<Node> {
        let start = self.peek();
        let condition = self.parse_logical_or()?;

        if !self.eat(&Token::Question) {
            return Ok(condition);
        }
        let condition = self.expect_scalar(condition, start, "condition");

        let branch = self.peek();
        let consequent = self.parse_assignment()?;
        self.expect(&Token::Colon, "':' in conditional expression")?;
        let alternative = self.parse_assignment()?;

        Ok(self.build_conditional(condition, consequent, Some(alternative), branch))
    }

    /// Parses `or`, `|` and `nor`.
    ///
    /// The rule is: `logical_or := logical_xor (("or" | "|" | "nor") logical_xor)*`
    pub(super) fn parse_logical_or(&mut self) -> ParseResult<Node> {
        self.parse_logical_level(&[BinaryOperator::Or, BinaryOperator::Nor],
                                 Self::parse_logical_xor)
    }

    /// Parses `xor` and `xnor`.
    ///
    /// The rule is: `logical_xor := logical_and (("xor" | "xnor") logical_and)*`
    pub(super) fn parse_logical_xor(&mut self) -> ParseResult<Node> {
        self.parse_logical_level(&[BinaryOperator::Xor, BinaryOperator::Xnor],
                                 Self::parse_logical_and)
    }

    /// Parses `and`, `&` and `nand`.
    ///
    /// The rule is: `logical_and := relational (("and" | "&" | "nand") relational)*`
    pub(super) fn parse_logical_and(&mut self) -> ParseResult<Node> {
        self.parse_logical_level(&[BinaryOperator::And, BinaryOperator::Nand],
                                 Self::parse_relational)
    }

    /// Parses one left-associative level of logical operators.
    fn parse_logical_level(&mut self,
                           operators: &[BinaryOperator],
                           operand: fn(&mut Self) -> ParseResult<Node>)
                           -> ParseResult<Node> {
        let start = self.peek();
        let mut left = operand(self)?;

        while let Some(lexeme) = self.peek()
              && let Some(op) = token_to_binary_operator(&lexeme.token)
              && operators.contains(&op)
        {
            self.position += 1;
            let right_start = self.peek();
            let right = operand(self)?;

            let role = format!("operand of '{op}'");
            let left_scalar = self.expect_scalar(left, start, &role);
            let right_scalar = self.expect_scalar(right, right_start, &role);
            left = Node::Scalar(self.fold(ScalarNode::binary(op, left_scalar, right_scalar)));
        }

        Ok(left)
    }

    /// Parses relational and equality operators.
    ///
    /// The rule is: `relational := additive (relop additive)?`
    ///
    /// Comparisons do not chain: `a < b < c` is a syntax error.
    pub(super) fn parse_relational(&mut self) -> ParseResult<Node> {
        let left = self.parse_additive()?;

        let Some(lexeme) = self.peek() else {
            return Ok(left);
        };
        if !is_relational(&lexeme.token) {
            return Ok(left);
        }
        self.position += 1;

        let right = self.parse_additive()?;

        if let Some(next) = self.peek()
           && is_relational(&next.token)
        {
            return Err(self.syntax_error("comparison operators do not chain"));
        }

        Ok(self.build_relational(lexeme, left, right))
    }

    /// Parses addition and subtraction expressions.
    ///
    /// The rule is: `additive := multiplicative (("+" | "-") multiplicative)*`
    pub(super) fn parse_additive(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_multiplicative()?;

        while let Some(lexeme) = self.peek()
              && let Some(op) = token_to_binary_operator(&lexeme.token)
              && matches!(op, BinaryOperator::Add | BinaryOperator::Sub)
        {
            self.position += 1;
            let right = self.parse_multiplicative()?;
            left = self.build_arithmetic(op, lexeme, left, right);
        }

        Ok(left)
    }

    /// Parses multiplication-level expressions.
    ///
    /// The rule is: `multiplicative := unary (("*" | "/" | "%") unary)*`
    pub(super) fn parse_multiplicative(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_unary()?;

        while let Some(lexeme) = self.peek()
              && let Some(op) = token_to_binary_operator(&lexeme.token)
              && matches!(op, BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod)
        {
            self.position += 1;
            let right = self.parse_unary()?;
            left = self.build_arithmetic(op, lexeme, left, right);
        }

        Ok(left)
    }

    /// Combines two operands with an arithmetic operator.
    ///
    /// Scalars combine into a scalar, `+` concatenates strings, and vectors
    /// combine element-wise with vectors or broadcast scalars. Any other
    /// pairing is a type error.
    pub(super) fn build_arithmetic(&mut self,
                                   op: BinaryOperator,
                                   at: &Lexeme,
                                   left: Node,
                                   right: Node)
                                   -> Node {
        match (left, right) {
            (Node::Scalar(left), Node::Scalar(right)) => {
                Node::Scalar(self.fold(ScalarNode::binary(op, left, right)))
            },
            (Node::String(left), Node::String(right)) if op == BinaryOperator::Add => {
                Node::String(self.fold_string(StringNode::concat(left, right)))
            },
            (left @ Node::Vector(_), right @ (Node::Vector(_) | Node::Scalar(_)))
            | (left @ Node::Scalar(_), right @ Node::Vector(_)) => {
                Node::Vector(VectorNode::elementwise(op, operand(left), operand(right)))
            },
            (left, right) => {
                self.type_error(Some(at),
                                format!("operator '{op}' cannot be applied to a {} and a {}",
                                        left.kind(),
                                        right.kind()));
                Node::Scalar(placeholder())
            },
        }
    }

    /// Builds a comparison or string match.
    fn build_relational(&mut self, at: &Lexeme, left: Node, right: Node) -> Node {
        if let Some(op) = token_to_string_operator(&at.token) {
            return match (left, right) {
                (Node::String(left), Node::String(right)) => {
                    Node::Scalar(self.fold(ScalarNode::StringMatch { op,
                                                                     left: Box::new(left),
                                                                     right: Box::new(right) }))
                },
                (left, right) => {
                    self.type_error(Some(at),
                                    format!("operator '{}' requires two strings, found a {} and a {}",
                                            at.text,
                                            left.kind(),
                                            right.kind()));
                    Node::Scalar(placeholder())
                },
            };
        }

        let Some(op) = token_to_binary_operator(&at.token) else {
            return Node::Scalar(placeholder());
        };

        match (left, right) {
            (Node::Scalar(left), Node::Scalar(right)) => {
                Node::Scalar(self.fold(ScalarNode::binary(op, left, right)))
            },
            (Node::String(left), Node::String(right)) => {
                Node::Scalar(self.fold(ScalarNode::StringCompare { op,
                                                                   left: Box::new(left),
                                                                   right: Box::new(right) }))
            },
            (left, right) => {
                self.type_error(Some(at),
                                format!("cannot compare a {} with a {}", left.kind(), right.kind()));
                Node::Scalar(placeholder())
            },
        }
    }
}

/// Wraps a scalar or vector node as an element-wise operand.
fn operand(node: Node) -> Operand {
    match node {
        Node::Vector(vector) => Operand::Vector(Box::new(vector)),
        Node::Scalar(scalar) => Operand::Scalar(Box::new(scalar)),
        Node::String(_) => Operand::Scalar(Box::new(placeholder())),
    }
}
