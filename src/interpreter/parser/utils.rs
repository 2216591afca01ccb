use crate::{
    ast::{Node, ScalarNode, StringNode},
    error::{Diagnostic, ErrorMode},
    interpreter::{
        lexer::{Lexeme, Token},
        parser::core::{Compiler, ParseResult},
    },
};

impl<'a> Compiler<'a, '_> {
    /// The lexeme under the cursor.
    pub(super) fn peek(&self) -> Option<&'a Lexeme> {
        self.lexemes.get(self.position)
    }

    /// The token `offset` positions after the cursor.
    pub(super) fn peek_token_at(&self, offset: usize) -> Option<&'a Token> {
        self.lexemes
            .get(self.position + offset)
            .map(|lexeme| &lexeme.token)
    }

    /// Whether the token under the cursor equals `token`.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek().is_some_and(|lexeme| lexeme.token == *token)
    }

    /// Moves the cursor forward and returns the lexeme it was on.
    pub(super) fn advance(&mut self) -> Option<&'a Lexeme> {
        let lexeme = self.peek()?;
        self.position += 1;
        Some(lexeme)
    }

    /// Consumes the token under the cursor if it equals `token`.
    pub(super) fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.position += 1;
            return true;
        }
        false
    }

    /// Consumes `token` or fails with a syntax error naming `expected`.
    pub(super) fn expect(&mut self, token: &Token, expected: &str) -> ParseResult<&'a Lexeme> {
        match self.peek() {
            Some(lexeme) if lexeme.token == *token => {
                self.position += 1;
                Ok(lexeme)
            },
            _ => Err(self.syntax_error(format!("expected {expected}, found {}", self.describe_current()))),
        }
    }

    /// Describes the lexeme under the cursor for messages.
    pub(super) fn describe_current(&self) -> String {
        self.peek()
            .map_or_else(|| "end of expression".to_string(), |lexeme| format!("'{}'", lexeme.text))
    }

    /// Builds a diagnostic located at `at`, or at the end of the source.
    pub(super) fn diagnostic(&self,
                             mode: ErrorMode,
                             at: Option<&Lexeme>,
                             message: String)
                             -> Diagnostic {
        match at {
            Some(lexeme) => Diagnostic::new(mode,
                                            lexeme.token.kind_name(),
                                            lexeme.text.as_str(),
                                            message,
                                            self.source,
                                            lexeme.line,
                                            lexeme.column),
            None => {
                let (line, column) = end_position(self.source);
                Diagnostic::new(mode, "EOF", "", message, self.source, line, column)
            },
        }
    }

    /// A syntax error at the cursor.
    pub(super) fn syntax_error(&self, message: impl Into<String>) -> Diagnostic {
        self.diagnostic(ErrorMode::Syntax, self.peek(), message.into())
    }

    /// A syntax error at the lexeme just consumed.
    pub(super) fn syntax_error_at_previous(&self, message: impl Into<String>) -> Diagnostic {
        let previous = self.position
                           .checked_sub(1)
                           .and_then(|index| self.lexemes.get(index));
        self.diagnostic(ErrorMode::Syntax, previous, message.into())
    }

    /// A syntax error for an unexpected lexeme, or for a premature end.
    pub(super) fn unexpected(&self) -> Diagnostic {
        match self.peek() {
            Some(lexeme) => self.syntax_error(format!("unexpected token '{}'", lexeme.text)),
            None => self.syntax_error("unexpected end of expression"),
        }
    }

    /// Records a type error without interrupting the parse.
    pub(super) fn type_error(&mut self, at: Option<&Lexeme>, message: String) {
        let diagnostic = self.diagnostic(ErrorMode::Parser, at, message);
        self.diagnostics.push(diagnostic);
    }

    /// Records a symbol error without interrupting the parse.
    pub(super) fn symbol_error(&mut self, at: Option<&Lexeme>, message: String) {
        let diagnostic = self.diagnostic(ErrorMode::Symtab, at, message);
        self.diagnostics.push(diagnostic);
    }

    /// Unwraps a scalar node, recording a type error for any other kind.
    ///
    /// # Parameters
    /// - `node`: The parsed node.
    /// - `at`: Where the node started, for the diagnostic.
    /// - `role`: What the scalar is used as, such as `"condition"`.
    ///
    /// # Returns
    /// The scalar, or a NaN placeholder after a type error.
    pub(super) fn expect_scalar(&mut self, node: Node, at: Option<&Lexeme>, role: &str) -> ScalarNode {
        match node {
            Node::Scalar(node) => node,
            other => {
                self.type_error(at, format!("{role} must be a scalar, found a {}", other.kind()));
                placeholder()
            },
        }
    }

    /// Unwraps a string node, recording a type error for any other kind.
    pub(super) fn expect_string(&mut self, node: Node, at: Option<&Lexeme>, role: &str) -> StringNode {
        match node {
            Node::String(node) => node,
            other => {
                self.type_error(at, format!("{role} must be a string, found a {}", other.kind()));
                StringNode::Literal(Vec::new())
            },
        }
    }

    /// Runs `parse` one nesting level deeper.
    ///
    /// # Errors
    /// Fails with a syntax error when the depth would exceed
    /// `Settings::max_depth`.
    pub(super) fn nested<T>(&mut self,
                            parse: impl FnOnce(&mut Self) -> ParseResult<T>)
                            -> ParseResult<T> {
        if self.depth >= self.settings.max_depth {
            return Err(self.depth_exceeded());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// The syntax error raised when nesting goes past `Settings::max_depth`.
    pub(super) fn depth_exceeded(&self) -> Diagnostic {
        self.syntax_error(format!("expression nesting exceeds {} levels", self.settings.max_depth))
    }

    /// Parses a comma-separated list of items until a closing token.
    ///
    /// An immediately encountered closing token produces an empty list.
    ///
    /// Grammar (simplified): `list := item ("," item)*`
    ///
    /// # Errors
    /// Fails if an item fails to parse, or if an item is followed by anything
    /// other than a comma or the closing token.
    pub(super) fn comma_separated<T>(&mut self,
                                     closing: &Token,
                                     mut parse_item: impl FnMut(&mut Self) -> ParseResult<T>)
                                     -> ParseResult<Vec<T>> {
        let mut items = Vec::new();
        if self.eat(closing) {
            return Ok(items);
        }
        loop {
            items.push(parse_item(self)?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(closing, "',' or a closing bracket")?;
            break;
        }
        Ok(items)
    }

    /// Skips the rest of a failed statement.
    ///
    /// Scans from the statement start, tracking brackets, and resumes after
    /// the first `;` at the outer level that lies at or after the cursor.
    pub(super) fn synchronize(&mut self, start: usize) {
        let mut depth = 0i64;

        for (index, lexeme) in self.lexemes.iter().enumerate().skip(start) {
            match lexeme.token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => depth -= 1,
                Token::Semicolon if depth <= 0 && index >= self.position => {
                    self.position = index + 1;
                    return;
                },
                _ => {},
            }
        }

        self.position = self.lexemes.len();
    }
}

/// Stand-in for a scalar that failed to type-check.
pub(super) const fn placeholder() -> ScalarNode {
    ScalarNode::Constant(f64::NAN)
}

/// Line and column just past the last character of `source`.
fn end_position(source: &str) -> (usize, usize) {
    let line = source.matches('\n').count() + 1;
    let last_line = source.rsplit('\n').next().unwrap_or_default();
    (line, last_line.chars().count() + 1)
}
