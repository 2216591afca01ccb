use tracing::debug;

use crate::{
    ast::{BinaryOperator, Node, Operand, ScalarNode, StringNode, VectorNode},
    error::ErrorMode,
    interpreter::{
        evaluator::function::{Arity, Builtin, BuiltinFunction, lookup_builtin},
        lexer::{Lexeme, Token},
        parser::{
            core::{Compiler, ParseResult},
            resolver::Resolution,
            utils::placeholder,
        },
    },
    symbol_table::{Binding, StringVar, Variable, VectorVar, core::is_reserved_identifier},
    util::num::to_index,
};

/// Maps an assignment token to its compound operator.
///
/// Returns `Some(None)` for a plain `:=`, `Some(Some(op))` for a compound
/// assignment and `None` for any other token.
const fn assignment_operator(token: &Token) -> Option<Option<BinaryOperator>> {
    match token {
        Token::Assign => Some(None),
        Token::PlusAssign => Some(Some(BinaryOperator::Add)),
        Token::MinusAssign => Some(Some(BinaryOperator::Sub)),
        Token::MulAssign => Some(Some(BinaryOperator::Mul)),
        Token::DivAssign => Some(Some(BinaryOperator::Div)),
        Token::ModAssign => Some(Some(BinaryOperator::Mod)),
        _ => None,
    }
}

/// A fresh local scalar and the node that initialises it.
fn scalar_declaration(value: ScalarNode) -> (Binding, Node) {
    let variable = Variable::default();
    (Binding::Scalar { variable: variable.clone(),
                       constant: false, },
     Node::Scalar(ScalarNode::Assign { target: variable,
                                       op:     None,
                                       value:  Box::new(value), }))
}

impl<'a> Compiler<'a, '_> {
    /// Looks a name up among the local declarations, then in the symbol
    /// table, then through the resolver.
    ///
    /// Unknown names are reported once, as symbol errors.
    ///
    /// # Returns
    /// The binding, or `None` after an error has been recorded.
    pub(super) fn resolve(&mut self, at: &Lexeme, name: &str) -> Option<Binding> {
        if let Some(binding) = self.locals.get(name) {
            return Some(binding.clone());
        }
        if let Some(binding) = self.symbols.lookup(name) {
            return Some(binding);
        }
        if self.reported.contains(name) {
            return None;
        }

        let resolution = self.resolver
                             .as_deref_mut()
                             .map(|resolver| resolver.resolve(name, &self.symbols));

        match resolution {
            None => {
                self.reported.insert(name.to_string());
                self.symbol_error(Some(at), format!("undefined symbol: '{name}'"));
                None
            },
            Some(Resolution::Failed(message)) => {
                self.reported.insert(name.to_string());
                self.symbol_error(Some(at), message);
                None
            },
            Some(Resolution::Resolved) => {
                self.resolved.push(name.to_string());
                if let Some(binding) = self.symbols.lookup(name) {
                    debug!(name, "resolver bound symbol");
                    return Some(binding);
                }
                match self.symbols.create_variable(name, 0.0) {
                    Ok(()) => {
                        debug!(name, "created variable for resolved symbol");
                        self.symbols.lookup(name)
                    },
                    Err(error) => {
                        self.reported.insert(name.to_string());
                        self.symbol_error(Some(at), error.to_string());
                        None
                    },
                }
            },
        }
    }

    /// Parses an identifier that has already been consumed: a call when
    /// followed by `(`, otherwise a reference to a binding.
    pub(super) fn parse_identifier(&mut self, at: &'a Lexeme, name: &str) -> ParseResult<Node> {
        if self.check(&Token::LParen) {
            return self.parse_call(at, name);
        }
        if lookup_builtin(name).is_some() {
            return Err(self.syntax_error(format!("expected '(' after function '{name}'")));
        }

        let node = match self.resolve(at, name) {
            Some(Binding::Scalar { variable, constant }) => {
                if constant && self.settings.constant_folding {
                    Node::Scalar(ScalarNode::Constant(variable.get()))
                } else {
                    Node::Scalar(ScalarNode::Variable(variable))
                }
            },
            Some(Binding::String { variable, constant }) => {
                if constant && self.settings.constant_folding {
                    Node::String(StringNode::Literal(variable.get()))
                } else {
                    Node::String(StringNode::Variable(variable))
                }
            },
            Some(Binding::Vector(vector)) => Node::Vector(VectorNode::Variable(vector)),
            Some(Binding::Function(_)) => {
                return Err(self.syntax_error(format!("expected '(' after function '{name}'")));
            },
            None => Node::Scalar(placeholder()),
        };

        Ok(node)
    }

    /// Parses a call to a built-in or registered function.
    ///
    /// The argument count must match the function's arity; a mismatch is a
    /// syntax error.
    fn parse_call(&mut self, at: &'a Lexeme, name: &str) -> ParseResult<Node> {
        self.expect(&Token::LParen, "'('")?;
        let arguments = self.comma_separated(&Token::RParen, |this| {
                                let start = this.peek();
                                Ok((start, this.parse_assignment()?))
                            })?;

        if let Some(builtin) = lookup_builtin(name) {
            return self.build_builtin_call(at, builtin, arguments);
        }

        let function = match self.locals
                                 .get(name)
                                 .cloned()
                                 .or_else(|| self.symbols.lookup(name))
        {
            Some(Binding::Function(function)) => function,
            Some(_) => {
                self.type_error(Some(at), format!("'{name}' is not a function"));
                return Ok(Node::Scalar(placeholder()));
            },
            None => {
                if self.reported.insert(name.to_string()) {
                    self.symbol_error(Some(at), format!("undefined function: '{name}'"));
                }
                return Ok(Node::Scalar(placeholder()));
            },
        };

        let arity = Arity::Exact(function.arity());
        if !arity.check(arguments.len()) {
            return Err(self.diagnostic(ErrorMode::Syntax,
                                       Some(at),
                                       format!("arity mismatch: '{name}' takes {arity}, got {}",
                                               arguments.len())));
        }

        let arguments = arguments.into_iter()
                                 .map(|(start, argument)| self.expect_scalar(argument, start, "argument"))
                                 .collect();

        Ok(Node::Scalar(ScalarNode::UserCall { name: name.to_string(),
                                               function,
                                               arguments }))
    }

    fn build_builtin_call(&mut self,
                          at: &'a Lexeme,
                          builtin: &'static Builtin,
                          mut arguments: Vec<(Option<&'a Lexeme>, Node)>)
                          -> ParseResult<Node> {
        let arity = builtin.function.arity();
        if !arity.check(arguments.len()) {
            return Err(self.diagnostic(ErrorMode::Syntax,
                                       Some(at),
                                       format!("arity mismatch: '{}' takes {arity}, got {}",
                                               builtin.name,
                                               arguments.len())));
        }

        if matches!(arguments.as_slice(), [(_, Node::Vector(_))])
           && let Some((_, Node::Vector(vector))) = arguments.pop()
        {
            return Ok(match builtin.function {
                          BuiltinFunction::Unary(function) => {
                              Node::Vector(VectorNode::Map { name: builtin.name,
                                                             function,
                                                             operand: Box::new(vector) })
                          },
                          BuiltinFunction::Aggregate(op) => {
                              Node::Scalar(ScalarNode::VectorAggregate { op,
                                                                         vector: Box::new(vector) })
                          },
                          BuiltinFunction::Binary(_) | BuiltinFunction::Ternary(_) => {
                              self.type_error(Some(at),
                                              format!("'{}' does not accept a vector", builtin.name));
                              Node::Scalar(placeholder())
                          },
                      });
        }

        let arguments = arguments.into_iter()
                                 .map(|(start, argument)| self.expect_scalar(argument, start, "argument"))
                                 .collect();

        Ok(Node::Scalar(self.fold(ScalarNode::Builtin { name: builtin.name,
                                                        function: builtin.function,
                                                        arguments })))
    }

    /// Parses a `var` declaration.
    ///
    /// Grammar:
    /// ```text
    ///     declaration := "var" IDENT (":=" assignment)?
    ///                  | "var" IDENT "[" NUMBER "]" (":=" ("{" list "}" | assignment))?
    /// ```
    ///
    /// The declared name is visible to the rest of the expression. The
    /// initializer runs on every evaluation; without one, scalars start at
    /// zero, strings empty and vectors zero-filled.
    pub(super) fn parse_declaration(&mut self) -> ParseResult<Node> {
        self.expect(&Token::Var, "'var'")?;
        let Some(lexeme) = self.peek() else {
            return Err(self.unexpected());
        };
        let Token::Identifier(name) = &lexeme.token else {
            return Err(self.syntax_error(format!("expected a name after 'var', found {}",
                                                 self.describe_current())));
        };
        self.position += 1;

        let declarable = self.check_declarable(lexeme, name);

        if self.eat(&Token::LBracket) {
            return self.parse_vector_declaration(lexeme, name, declarable);
        }

        let initializer = if self.eat(&Token::Assign) {
            let start = self.peek();
            Some((start, self.parse_assignment()?))
        } else {
            None
        };

        let (binding, node) = match initializer {
            Some((_, Node::String(value))) => {
                let variable = StringVar::default();
                (Binding::String { variable: variable.clone(),
                                   constant: false, },
                 Node::String(StringNode::Assign { target: variable,
                                                   append: false,
                                                   value:  Box::new(value), }))
            },
            Some((start, Node::Vector(_))) => {
                self.type_error(start,
                                format!("declare vectors with a size, as in 'var {name}[n]'"));
                return Ok(Node::Scalar(placeholder()));
            },
            Some((_, Node::Scalar(value))) => scalar_declaration(value),
            None => scalar_declaration(ScalarNode::Constant(0.0)),
        };

        if declarable {
            self.locals.insert(name.clone(), binding);
        }
        Ok(node)
    }

    fn parse_vector_declaration(&mut self,
                                at: &'a Lexeme,
                                name: &str,
                                declarable: bool)
                                -> ParseResult<Node> {
        let size = match self.peek().map(|lexeme| &lexeme.token) {
            Some(Token::Number(size)) if size.fract() == 0.0 && *size >= 1.0 => to_index(*size),
            _ => None,
        };
        let Some(size) = size else {
            return Err(self.syntax_error(format!("vector size must be a positive integer, found {}",
                                                 self.describe_current())));
        };
        self.position += 1;
        self.expect(&Token::RBracket, "']' after vector size")?;

        let target = VectorVar::zeroed(size);
        let mut initialize = VectorNode::Initialize { target: target.clone(),
                                                      values: Vec::new(),
                                                      fill:   false, };

        if self.eat(&Token::Assign) {
            if let Some(open) = self.peek()
               && open.token == Token::LBrace
            {
                self.position += 1;
                let values = self.comma_separated(&Token::RBrace, |this| {
                                     let start = this.peek();
                                     let value = this.parse_assignment()?;
                                     Ok(this.expect_scalar(value, start, "vector element"))
                                 })?;
                if values.len() > size {
                    self.type_error(Some(open),
                                    format!("{} initializers given for vector '{name}' of size {size}",
                                            values.len()));
                }
                initialize = VectorNode::Initialize { target: target.clone(),
                                                      values,
                                                      fill: false };
            } else {
                let start = self.peek();
                match self.parse_assignment()? {
                    Node::Scalar(value) => {
                        initialize = VectorNode::Initialize { target: target.clone(),
                                                              values: vec![value],
                                                              fill:   true, };
                    },
                    Node::Vector(value) => {
                        let assign = VectorNode::Assign { target: target.clone(),
                                                          op:     None,
                                                          value:  Operand::Vector(Box::new(value)), };
                        initialize = VectorNode::Sequence { statements: vec![Node::Vector(initialize)],
                                                            result:     Box::new(assign), };
                    },
                    Node::String(_) => {
                        self.type_error(start,
                                        format!("vector '{name}' cannot be initialised from a string"));
                    },
                }
            }
        }

        if declarable {
            debug!(name, size, line = at.line, "declared local vector");
            self.locals.insert(name.to_string(), Binding::Vector(target));
        }
        Ok(Node::Vector(initialize))
    }

    /// Reports a declaration that would shadow a binding or a reserved name.
    fn check_declarable(&mut self, at: &Lexeme, name: &str) -> bool {
        if is_reserved_identifier(name) {
            self.type_error(Some(at), format!("'{name}' is reserved"));
            return false;
        }
        if self.locals.contains_key(name) || self.symbols.symbol_exists(name) {
            self.type_error(Some(at), format!("'{name}' is already defined"));
            return false;
        }
        true
    }

    /// Whether the cursor is at the start of an assignment: a name, an
    /// optional `[...]` subscript, and an assignment operator.
    fn at_assignment(&self) -> bool {
        if !matches!(self.peek_token_at(0), Some(Token::Identifier(_))) {
            return false;
        }

        let mut offset = 1;
        if matches!(self.peek_token_at(offset), Some(Token::LBracket)) {
            let mut depth = 0usize;
            loop {
                match self.peek_token_at(offset) {
                    Some(Token::LBracket) => depth += 1,
                    Some(Token::RBracket) => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    },
                    None => return false,
                    _ => {},
                }
                offset += 1;
            }
            offset += 1;
        }

        self.peek_token_at(offset)
            .is_some_and(|token| assignment_operator(token).is_some())
    }

    /// Parses an assignment, or falls through to a conditional expression.
    ///
    /// Grammar:
    /// ```text
    ///     assignment := IDENT ("[" assignment "]")? assign_op assignment
    ///                 | conditional
    ///     assign_op  := ":=" | "+=" | "-=" | "*=" | "/=" | "%="
    /// ```
    ///
    /// Assignments are right-associative and produce the assigned value.
    ///
    /// Every expression, bracketed or not, is parsed through here, so this is
    /// where the nesting depth is counted.
    pub(super) fn parse_assignment(&mut self) -> ParseResult<Node> {
        self.nested(Self::parse_assignment_level)
    }

    fn parse_assignment_level(&mut self) -> ParseResult<Node> {
        if !self.at_assignment() {
            return self.parse_conditional();
        }

        let Some(at) = self.advance() else {
            return Err(self.unexpected());
        };
        let Token::Identifier(name) = &at.token else {
            return Err(self.unexpected());
        };
        let binding = self.resolve(at, name);

        let index = if self.eat(&Token::LBracket) {
            let start = self.peek();
            let index = self.parse_assignment()?;
            self.expect(&Token::RBracket, "']' after index")?;
            Some((start, index))
        } else {
            None
        };

        let Some(operator) = self.advance() else {
            return Err(self.unexpected());
        };
        let op = assignment_operator(&operator.token).flatten();
        let start = self.peek();
        let value = self.parse_assignment()?;

        if let Some((index_start, index)) = index {
            return Ok(self.build_element_assignment(at, name, binding, index_start, index, op, value));
        }

        Ok(match binding {
               Some(Binding::Scalar { constant: true, .. } | Binding::String { constant: true, .. }) => {
                   self.type_error(Some(at), format!("cannot assign to constant '{name}'"));
                   Node::Scalar(placeholder())
               },
               Some(Binding::Scalar { variable, .. }) => {
                   let value = self.expect_scalar(value, start, "assigned value");
                   Node::Scalar(ScalarNode::Assign { target: variable,
                                                     op,
                                                     value: Box::new(value) })
               },
               Some(Binding::String { variable, .. }) => {
                   if op.is_some_and(|op| op != BinaryOperator::Add) {
                       self.type_error(Some(operator),
                                       format!("operator '{}' cannot be applied to a string", operator.text));
                       return Ok(Node::Scalar(placeholder()));
                   }
                   let value = self.expect_string(value, start, "assigned value");
                   Node::String(StringNode::Assign { target: variable,
                                                     append: op.is_some(),
                                                     value:  Box::new(value), })
               },
               Some(Binding::Vector(target)) => match value {
                   Node::Vector(value) => Node::Vector(VectorNode::Assign { target,
                                                                            op,
                                                                            value: Operand::Vector(Box::new(value)) }),
                   Node::Scalar(value) => Node::Vector(VectorNode::Assign { target,
                                                                            op,
                                                                            value: Operand::Scalar(Box::new(value)) }),
                   Node::String(_) => {
                       self.type_error(start, format!("cannot assign a string to vector '{name}'"));
                       Node::Scalar(placeholder())
                   },
               },
               Some(Binding::Function(_)) => {
                   self.type_error(Some(at), format!("cannot assign to function '{name}'"));
                   Node::Scalar(placeholder())
               },
               None => Node::Scalar(placeholder()),
           })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_element_assignment(&mut self,
                                at: &Lexeme,
                                name: &str,
                                binding: Option<Binding>,
                                index_start: Option<&Lexeme>,
                                index: Node,
                                op: Option<BinaryOperator>,
                                value: Node)
                                -> Node {
        let Some(binding) = binding else {
            return Node::Scalar(placeholder());
        };
        let Binding::Vector(target) = binding else {
            self.type_error(Some(at), format!("'{name}' is not a vector"));
            return Node::Scalar(placeholder());
        };

        let index = self.expect_scalar(index, index_start, "index");
        let value = self.expect_scalar(value, Some(at), "element value");
        Node::Scalar(ScalarNode::AssignElement { target,
                                                 index: Box::new(index),
                                                 op,
                                                 value: Box::new(value) })
    }
}
