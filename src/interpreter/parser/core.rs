use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    ast::Node,
    error::{Diagnostic, ErrorMode},
    expression::Expression,
    interpreter::{
        lexer::{Lexeme, Token, tokenize},
        parser::resolver::UnknownSymbolResolver,
    },
    settings::Settings,
    symbol_table::{Binding, SymbolTable},
};

/// Result type used by the parser.
///
/// An `Err` is a syntax error: it aborts the statement being parsed. Symbol
/// and type errors are recorded on the side and parsing goes on.
pub type ParseResult<T> = Result<T, Diagnostic>;

/// Compiles source text into an [`Expression`].
///
/// A parser keeps the diagnostics of its last compilation until the next one
/// starts. It can be reused for any number of expressions and symbol tables.
///
/// # Example
/// ```
/// use formulary::{Expression, Parser, SymbolTable};
///
/// let symbols = SymbolTable::new();
/// symbols.create_variable("x", 3.0).unwrap();
///
/// let mut expression = Expression::new();
/// expression.register_symbol_table(&symbols);
///
/// let mut parser = Parser::new();
/// assert!(parser.compile("x * x", &mut expression));
/// assert_eq!(expression.value(), 9.0);
///
/// assert!(!parser.compile("x * y", &mut expression));
/// assert_eq!(parser.error_count(), 1);
/// assert_eq!(parser.error(0).unwrap().message, "undefined symbol: 'y'");
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    settings:    Settings,
    diagnostics: Vec<Diagnostic>,
    resolved:    Vec<String>,
}

impl Parser {
    /// Creates a parser with default [`Settings`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given settings.
    #[must_use]
    pub const fn with_settings(settings: Settings) -> Self {
        Self { settings,
               diagnostics: Vec::new(),
               resolved: Vec::new() }
    }

    /// The settings in use.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Compiles `source` against the symbol table registered with
    /// `expression`.
    ///
    /// On success the expression holds the new graph. On failure it is left
    /// uncompiled and the diagnostics are available through
    /// [`Parser::error`] and [`Parser::errors`].
    pub fn compile(&mut self, source: &str, expression: &mut Expression) -> bool {
        self.run(source, expression, None)
    }

    /// Like [`Parser::compile`], consulting `resolver` for identifiers that
    /// are not bound.
    pub fn compile_with_resolver<R>(&mut self,
                                    source: &str,
                                    expression: &mut Expression,
                                    resolver: &mut R)
                                    -> bool
        where R: UnknownSymbolResolver
    {
        let resolver: &mut dyn UnknownSymbolResolver = resolver;
        self.run(source, expression, Some(resolver))
    }

    /// Number of diagnostics raised by the last compilation.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// The diagnostic at `index`, in order of occurrence.
    #[must_use]
    pub fn error(&self, index: usize) -> Option<&Diagnostic> {
        self.diagnostics.get(index)
    }

    /// All diagnostics raised by the last compilation.
    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Names the resolver accepted during the last compilation, in order.
    #[must_use]
    pub fn resolved_symbols(&self) -> &[String] {
        &self.resolved
    }

    fn run(&mut self,
           source: &str,
           expression: &mut Expression,
           resolver: Option<&mut dyn UnknownSymbolResolver>)
           -> bool {
        self.diagnostics.clear();
        self.resolved.clear();
        expression.release();

        let lexemes = match tokenize(source) {
            Ok(lexemes) => lexemes,
            Err(errors) => {
                debug!(errors = errors.len(), "tokenization failed");
                self.diagnostics = errors;
                return false;
            },
        };

        let mut compiler = Compiler::new(source,
                                         &lexemes,
                                         expression.symbol_table().clone(),
                                         resolver,
                                         self.settings);
        let root = compiler.parse_program();
        self.diagnostics = compiler.diagnostics;
        self.resolved = compiler.resolved;

        match root {
            Some(root) if self.diagnostics.is_empty() => {
                debug!(kind = %root.kind(), "compiled expression");
                expression.set_compiled(source, self.settings, root);
                true
            },
            _ => {
                debug!(errors = self.diagnostics.len(), "compilation failed");
                false
            },
        }
    }
}

/// The state of one compilation.
///
/// Walks the token stream with a cursor, binding identifiers as it goes and
/// collecting diagnostics.
pub(super) struct Compiler<'a, 'r> {
    pub(super) source:      &'a str,
    pub(super) lexemes:     &'a [Lexeme],
    pub(super) position:    usize,
    pub(super) symbols:     SymbolTable,
    pub(super) locals:      HashMap<String, Binding>,
    pub(super) resolver:    Option<&'r mut dyn UnknownSymbolResolver>,
    pub(super) settings:    Settings,
    pub(super) diagnostics: Vec<Diagnostic>,
    pub(super) resolved:    Vec<String>,
    pub(super) reported:    HashSet<String>,
    pub(super) depth:       usize,
}

impl<'a, 'r> Compiler<'a, 'r> {
    fn new(source: &'a str,
           lexemes: &'a [Lexeme],
           symbols: SymbolTable,
           resolver: Option<&'r mut dyn UnknownSymbolResolver>,
           settings: Settings)
           -> Self {
        Self { source,
               lexemes,
               position: 0,
               symbols,
               locals: HashMap::new(),
               resolver,
               settings,
               diagnostics: Vec::new(),
               resolved: Vec::new(),
               reported: HashSet::new(),
               depth: 0 }
    }

    /// Parses the whole token stream.
    ///
    /// The rule is: `program := statement (";" statement)* ";"?`
    ///
    /// A statement that fails with a syntax error is skipped up to the next
    /// `;` at the same bracket level, and parsing resumes after it.
    ///
    /// # Returns
    /// The program as one node, or `None` if no statement could be parsed.
    fn parse_program(&mut self) -> Option<Node> {
        let mut statements = Vec::new();

        while self.peek().is_some() {
            if self.eat(&Token::Semicolon) {
                continue;
            }

            let start = self.position;
            match self.parse_statement()
                      .and_then(|statement| self.expect_statement_end().map(|()| statement))
            {
                Ok(statement) => statements.push(statement),
                Err(diagnostic) => {
                    self.diagnostics.push(diagnostic);
                    self.synchronize(start);
                },
            }
        }

        let Some(result) = statements.pop() else {
            if self.diagnostics.is_empty() {
                let diagnostic = self.diagnostic(ErrorMode::Syntax, None, "empty expression".to_string());
                self.diagnostics.push(diagnostic);
            }
            return None;
        };

        Some(Node::sequence(statements, result))
    }

    /// Parses one statement: a declaration or an expression.
    ///
    /// The rule is: `statement := declaration | assignment`
    pub(super) fn parse_statement(&mut self) -> ParseResult<Node> {
        if self.check(&Token::Var) {
            return self.parse_declaration();
        }
        self.parse_assignment()
    }

    /// Parses the statements of a bracketed block up to `closing`.
    ///
    /// The opening bracket must already be consumed. Statements are separated
    /// by `;`, and a trailing `;` before the closing bracket is allowed.
    pub(super) fn parse_block(&mut self, closing: &Token) -> ParseResult<Node> {
        let mut statements = Vec::new();

        loop {
            if self.eat(closing) {
                break;
            }
            statements.push(self.parse_statement()?);
            if self.eat(&Token::Semicolon) {
                continue;
            }
            self.expect(closing, "';' or a closing bracket")?;
            break;
        }

        match statements.pop() {
            Some(result) => Ok(Node::sequence(statements, result)),
            None => Err(self.syntax_error_at_previous("empty block")),
        }
    }

    fn expect_statement_end(&mut self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(lexeme) if lexeme.token == Token::Semicolon => {
                self.position += 1;
                Ok(())
            },
            Some(lexeme) => Err(self.diagnostic(ErrorMode::Syntax,
                                                Some(lexeme),
                                                format!("unexpected token '{}'", lexeme.text))),
        }
    }
}
