use crate::{
    ast::{BinaryOperator, Node, ScalarNode, StringNode, UnaryOperator, VectorNode},
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            core::{Compiler, ParseResult},
            utils::placeholder,
        },
    },
};

impl<'a> Compiler<'a, '_> {
    /// Parses a unary expression.
    ///
    /// Supports prefix operators:
    /// - `-`  (negation, element-wise on vectors)
    /// - `+`  (identity)
    /// - `!` and `not` (logical not)
    ///
    /// Unary operators bind looser than `^`, so `-2^2` is `-(2^2)`.
    ///
    /// Grammar:
    /// ```text
    ///     unary := ("-" | "+" | "!" | "not") unary
    ///            | power
    /// ```
    pub(super) fn parse_unary(&mut self) -> ParseResult<Node> {
        let Some(lexeme) = self.peek() else {
            return self.parse_power();
        };

        match lexeme.token {
            Token::Minus => {
                self.position += 1;
                let operand = self.nested(Self::parse_unary)?;
                Ok(self.build_negation(lexeme, operand))
            },
            Token::Plus => {
                self.position += 1;
                let operand = self.nested(Self::parse_unary)?;
                if let Node::String(_) = operand {
                    self.type_error(Some(lexeme), "unary '+' cannot be applied to a string".to_string());
                    return Ok(Node::Scalar(placeholder()));
                }
                Ok(operand)
            },
            Token::Bang | Token::Not => {
                self.position += 1;
                let start = self.peek();
                let operand = self.nested(Self::parse_unary)?;
                let operand = self.expect_scalar(operand, start, "operand of 'not'");
                Ok(Node::Scalar(self.fold(ScalarNode::Unary { op:      UnaryOperator::Not,
                                                              operand: Box::new(operand), })))
            },
            _ => self.parse_power(),
        }
    }

    fn build_negation(&mut self, at: &Lexeme, operand: Node) -> Node {
        match operand {
            Node::Scalar(operand) => {
                Node::Scalar(self.fold(ScalarNode::Unary { op:      UnaryOperator::Negate,
                                                           operand: Box::new(operand), }))
            },
            Node::Vector(operand) => Node::Vector(VectorNode::Negate(Box::new(operand))),
            Node::String(_) => {
                self.type_error(Some(at), "unary '-' cannot be applied to a string".to_string());
                Node::Scalar(placeholder())
            },
        }
    }

    /// Parses exponentiation.
    ///
    /// The exponent is itself a unary expression, which makes `^`
    /// right-associative: `2^3^2` is `2^(3^2)`.
    ///
    /// The rule is: `power := postfix ("^" unary)?`
    pub(super) fn parse_power(&mut self) -> ParseResult<Node> {
        let base = self.parse_postfix()?;

        let Some(lexeme) = self.peek() else {
            return Ok(base);
        };
        if lexeme.token != Token::Caret {
            return Ok(base);
        }
        self.position += 1;

        let exponent = self.nested(Self::parse_unary)?;
        Ok(self.build_arithmetic(BinaryOperator::Pow, lexeme, base, exponent))
    }

    /// Parses a primary expression followed by any number of subscripts.
    ///
    /// Grammar:
    /// ```text
    ///     postfix := primary ("[" "]" | "[" range "]" | "[" assignment "]")*
    ///     range   := assignment? ":" assignment?
    /// ```
    ///
    /// Each subscript wraps the node once more, so subscripts count towards
    /// the nesting depth.
    pub(super) fn parse_postfix(&mut self) -> ParseResult<Node> {
        let mut node = self.parse_primary()?;
        let depth = self.depth;

        while let Some(open) = self.peek()
              && open.token == Token::LBracket
        {
            if self.depth >= self.settings.max_depth {
                self.depth = depth;
                return Err(self.depth_exceeded());
            }
            self.depth += 1;
            self.position += 1;
            match self.parse_subscript(open, node) {
                Ok(subscripted) => node = subscripted,
                Err(diagnostic) => {
                    self.depth = depth;
                    return Err(diagnostic);
                },
            }
        }

        self.depth = depth;
        Ok(node)
    }

    /// Parses the inside of `[...]` applied to `node`; the `[` is consumed.
    fn parse_subscript(&mut self, open: &'a Lexeme, node: Node) -> ParseResult<Node> {
        if self.eat(&Token::RBracket) {
            return Ok(self.build_size(open, node));
        }

        let start = if self.check(&Token::Colon) {
            None
        } else {
            let at = self.peek();
            Some((at, self.parse_assignment()?))
        };

        if self.eat(&Token::Colon) {
            let end = if self.check(&Token::RBracket) {
                None
            } else {
                let at = self.peek();
                Some((at, self.parse_assignment()?))
            };
            self.expect(&Token::RBracket, "']' after range")?;
            return Ok(self.build_range(open, node, start, end));
        }

        self.expect(&Token::RBracket, "']' after index")?;
        let Some((at, index)) = start else {
            return Err(self.syntax_error_at_previous("missing index"));
        };
        let index = self.expect_scalar(index, at, "index");

        match node {
            Node::Vector(vector) => Ok(Node::Scalar(ScalarNode::Element { vector: Box::new(vector),
                                                                          index:  Box::new(index), })),
            other => {
                self.type_error(Some(open),
                                format!("a {} cannot be indexed; use a range to slice strings",
                                        other.kind()));
                Ok(Node::Scalar(placeholder()))
            },
        }
    }

    /// `v[]` and `s[]`: vector size and string length.
    fn build_size(&mut self, open: &Lexeme, node: Node) -> Node {
        match node {
            Node::Vector(vector) => {
                Node::Scalar(self.fold(ScalarNode::VectorSize(Box::new(vector))))
            },
            Node::String(string) => {
                Node::Scalar(self.fold(ScalarNode::StringLength(Box::new(string))))
            },
            Node::Scalar(_) => {
                self.type_error(Some(open), "a scalar has no size".to_string());
                Node::Scalar(placeholder())
            },
        }
    }

    /// `s[a:b]`: an inclusive substring.
    fn build_range(&mut self,
                   open: &Lexeme,
                   node: Node,
                   start: Option<(Option<&Lexeme>, Node)>,
                   end: Option<(Option<&Lexeme>, Node)>)
                   -> Node {
        let start = start.map(|(at, bound)| Box::new(self.expect_scalar(bound, at, "range start")));
        let end = end.map(|(at, bound)| Box::new(self.expect_scalar(bound, at, "range end")));

        match node {
            Node::String(source) => {
                Node::String(self.fold_string(StringNode::Substring { source: Box::new(source),
                                                                      start,
                                                                      end }))
            },
            other => {
                self.type_error(Some(open), format!("a {} cannot be sliced", other.kind()));
                Node::String(StringNode::Literal(Vec::new()))
            },
        }
    }

    /// Parses a primary (atomic) expression.
    ///
    /// Grammar (simplified):
    /// ```text
    ///     primary := NUMBER | STRING | "true" | "false"
    ///              | identifier | call
    ///              | "(" program ")" | "{" program "}"
    ///              | if | while | for | switch
    /// ```
    pub(super) fn parse_primary(&mut self) -> ParseResult<Node> {
        let Some(lexeme) = self.peek() else {
            return Err(self.unexpected());
        };

        match &lexeme.token {
            Token::Number(value) => {
                self.position += 1;
                Ok(Node::Scalar(ScalarNode::Constant(*value)))
            },
            Token::Str(bytes) => {
                self.position += 1;
                Ok(Node::String(StringNode::Literal(bytes.clone())))
            },
            Token::True => {
                self.position += 1;
                Ok(Node::Scalar(ScalarNode::Constant(1.0)))
            },
            Token::False => {
                self.position += 1;
                Ok(Node::Scalar(ScalarNode::Constant(0.0)))
            },
            Token::Identifier(name) => {
                self.position += 1;
                self.parse_identifier(lexeme, name)
            },
            Token::LParen => {
                self.position += 1;
                self.parse_block(&Token::RParen)
            },
            Token::LBrace => {
                self.position += 1;
                self.parse_block(&Token::RBrace)
            },
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::For => self.parse_for(),
            Token::Switch => self.parse_switch(),
            _ => Err(self.unexpected()),
        }
    }
}
