use crate::{
    ast::{Node, ScalarNode, StringNode},
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            core::{Compiler, ParseResult},
            utils::placeholder,
        },
    },
};

impl Compiler<'_, '_> {
    /// Parses both forms of `if`.
    ///
    /// Grammar:
    /// ```text
    ///     if := "if" "(" assignment "," assignment "," assignment ")"
    ///         | "if" "(" assignment ")" body (";"? "else" body)?
    /// ```
    ///
    /// The first form is the ternary function `if(c, a, b)`. The second is
    /// the statement form; without an `else` it yields NaN (or an empty
    /// string) when the condition is false.
    pub(super) fn parse_if(&mut self) -> ParseResult<Node> {
        self.expect(&Token::If, "'if'")?;
        self.expect(&Token::LParen, "'(' after 'if'")?;

        let start = self.peek();
        let condition = self.parse_assignment()?;
        let condition = self.expect_scalar(condition, start, "condition");

        if self.eat(&Token::Comma) {
            let branch = self.peek();
            let consequent = self.parse_assignment()?;
            self.expect(&Token::Comma, "',' in 'if'")?;
            let alternative = self.parse_assignment()?;
            self.expect(&Token::RParen, "')' after 'if' arguments")?;
            return Ok(self.build_conditional(condition, consequent, Some(alternative), branch));
        }

        self.expect(&Token::RParen, "')' after condition")?;
        let branch = self.peek();
        let consequent = self.parse_body()?;

        if matches!(self.peek_token_at(0), Some(Token::Semicolon))
           && matches!(self.peek_token_at(1), Some(Token::Else))
        {
            self.position += 1;
        }
        let alternative = if self.eat(&Token::Else) {
            Some(self.parse_body()?)
        } else {
            None
        };

        Ok(self.build_conditional(condition, consequent, alternative, branch))
    }

    /// Joins a condition and its branches into one node.
    ///
    /// Both branches must be scalars or both strings. A constant condition
    /// selects its branch when folding is enabled.
    pub(super) fn build_conditional(&mut self,
                                    condition: ScalarNode,
                                    consequent: Node,
                                    alternative: Option<Node>,
                                    branch: Option<&Lexeme>)
                                    -> Node {
        match (consequent, alternative) {
            (Node::Scalar(consequent), None) => {
                Node::Scalar(self.fold(ScalarNode::Conditional { condition: Box::new(condition),
                                                                 consequent: Box::new(consequent),
                                                                 alternative: None }))
            },
            (Node::Scalar(consequent), Some(Node::Scalar(alternative))) => {
                Node::Scalar(self.fold(ScalarNode::Conditional { condition: Box::new(condition),
                                                                 consequent: Box::new(consequent),
                                                                 alternative: Some(Box::new(alternative)) }))
            },
            (Node::String(consequent), None) => {
                Node::String(self.fold_string(StringNode::Conditional { condition: Box::new(condition),
                                                                        consequent: Box::new(consequent),
                                                                        alternative: None }))
            },
            (Node::String(consequent), Some(Node::String(alternative))) => {
                Node::String(self.fold_string(StringNode::Conditional { condition: Box::new(condition),
                                                                        consequent: Box::new(consequent),
                                                                        alternative: Some(Box::new(alternative)) }))
            },
            (Node::Vector(_), _) | (_, Some(Node::Vector(_))) => {
                self.type_error(branch, "conditional branches cannot be vectors".to_string());
                Node::Scalar(placeholder())
            },
            (consequent, Some(alternative)) => {
                self.type_error(branch,
                                format!("conditional branches must have the same kind, found a {} and a {}",
                                        consequent.kind(),
                                        alternative.kind()));
                Node::Scalar(placeholder())
            },
        }
    }

    /// Parses the body of `if`, `while` and `for`: a braced block or a
    /// single statement.
    fn parse_body(&mut self) -> ParseResult<Node> {
        if self.eat(&Token::LBrace) {
            return self.parse_block(&Token::RBrace);
        }
        self.parse_statement()
    }

    /// Parses a `while` loop.
    ///
    /// The rule is: `while := "while" "(" assignment ")" body`
    pub(super) fn parse_while(&mut self) -> ParseResult<Node> {
        self.expect(&Token::While, "'while'")?;
        self.expect(&Token::LParen, "'(' after 'while'")?;

        let start = self.peek();
        let condition = self.parse_assignment()?;
        let condition = self.expect_scalar(condition, start, "loop condition");
        self.expect(&Token::RParen, "')' after loop condition")?;

        let body = self.parse_body()?;

        Ok(Node::Scalar(ScalarNode::While { condition: Box::new(condition),
                                            body:      Box::new(body),
                                            limit:     self.settings.max_loop_iterations, }))
    }

    /// Parses a `for` loop.
    ///
    /// Grammar:
    /// ```text
    ///     for := "for" "(" statement? ";" assignment? ";" statement? ")" body
    /// ```
    ///
    /// Each of the three clauses may be empty; an empty condition loops
    /// until the iteration limit, if any.
    pub(super) fn parse_for(&mut self) -> ParseResult<Node> {
        self.expect(&Token::For, "'for'")?;
        self.expect(&Token::LParen, "'(' after 'for'")?;

        let initializer = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_statement()?))
        };
        self.expect(&Token::Semicolon, "';' after loop initializer")?;

        let condition = if self.check(&Token::Semicolon) {
            None
        } else {
            let start = self.peek();
            let condition = self.parse_assignment()?;
            Some(Box::new(self.expect_scalar(condition, start, "loop condition")))
        };
        self.expect(&Token::Semicolon, "';' after loop condition")?;

        let increment = if self.check(&Token::RParen) {
            None
        } else {
            Some(Box::new(self.parse_statement()?))
        };
        self.expect(&Token::RParen, "')' after loop increment")?;

        let body = self.parse_body()?;

        Ok(Node::Scalar(ScalarNode::For { initializer,
                                          condition,
                                          increment,
                                          body: Box::new(body),
                                          limit: self.settings.max_loop_iterations }))
    }

    /// Parses a `switch` block.
    ///
    /// Grammar:
    /// ```text
    ///     switch := "switch" "{" ("case" assignment ":" assignment ";")*
    ///               "default" ":" assignment ";"? "}"
    /// ```
    ///
    /// Cases are tested in order and the first true one gives the result.
    /// All results are scalars, and the `default` case is required.
    pub(super) fn parse_switch(&mut self) -> ParseResult<Node> {
        self.expect(&Token::Switch, "'switch'")?;
        self.expect(&Token::LBrace, "'{' after 'switch'")?;

        let mut cases = Vec::new();
        while self.eat(&Token::Case) {
            let start = self.peek();
            let condition = self.parse_assignment()?;
            let condition = self.expect_scalar(condition, start, "case condition");
            self.expect(&Token::Colon, "':' after case condition")?;

            let start = self.peek();
            let value = self.parse_assignment()?;
            let value = self.expect_scalar(value, start, "case result");
            self.expect(&Token::Semicolon, "';' after case result")?;

            cases.push((condition, value));
        }

        self.expect(&Token::DefaultCase, "'case' or 'default'")?;
        self.expect(&Token::Colon, "':' after 'default'")?;
        let start = self.peek();
        let default = self.parse_assignment()?;
        let default = self.expect_scalar(default, start, "default result");
        self.eat(&Token::Semicolon);
        self.expect(&Token::RBrace, "'}' after switch")?;

        Ok(Node::Scalar(ScalarNode::Switch { cases,
                                             default: Box::new(default) }))
    }
}
