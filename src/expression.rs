use std::fmt;

use tracing::debug;

use crate::{
    ast::{Kind, Node},
    error::CompileError,
    interpreter::{
        parser::{core::Parser, resolver::Resolution},
        value::Value,
    },
    settings::Settings,
    symbol_table::SymbolTable,
};

/// A compiled expression bound to a symbol table.
///
/// An expression starts uncompiled. [`Parser::compile`] binds it to the
/// table registered with [`Expression::register_symbol_table`] and stores
/// the resulting node graph. Evaluating reads the bound storage at the time
/// of the call, so the same expression can be evaluated again after the host
/// changes its variables.
///
/// # Example
/// ```
/// use formulary::{Expression, SymbolTable};
///
/// let symbols = SymbolTable::new();
/// symbols.create_variable("x", 1.0).unwrap();
/// let x = symbols.variable_ref("x").unwrap();
///
/// let expression = Expression::compile("x^2 + 1", &symbols).unwrap();
/// assert_eq!(expression.value(), 2.0);
///
/// x.set(3.0);
/// assert_eq!(expression.value(), 10.0);
/// ```
///
/// Cloning recompiles the source against the same table, so the clone gets
/// its own storage for `var` locals while sharing every bound symbol.
#[derive(Default)]
pub struct Expression {
    symbols:  SymbolTable,
    source:   String,
    settings: Settings,
    root:     Option<Node>,
}

impl Expression {
    /// Creates an uncompiled expression with an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `source` against `symbols` with a default [`Parser`].
    ///
    /// # Errors
    /// Returns every diagnostic of the failed compilation.
    ///
    /// # Example
    /// ```
    /// use formulary::{ErrorMode, Expression, SymbolTable};
    ///
    /// let error = Expression::compile("1 +", &SymbolTable::new()).unwrap_err();
    /// assert_eq!(error.first().unwrap().mode, ErrorMode::Syntax);
    /// ```
    pub fn compile(source: &str, symbols: &SymbolTable) -> Result<Self, CompileError> {
        let mut expression = Self::new();
        expression.register_symbol_table(symbols);

        let mut parser = Parser::new();
        if parser.compile(source, &mut expression) {
            Ok(expression)
        } else {
            Err(CompileError::new(parser.errors().to_vec()))
        }
    }

    /// Compiles `source` against `symbols`, creating a scalar variable
    /// initialised to zero for every unknown identifier.
    ///
    /// Returns the expression together with the names that were created, in
    /// order of first use.
    ///
    /// # Errors
    /// Returns every diagnostic of the failed compilation.
    ///
    /// # Example
    /// ```
    /// use formulary::{Expression, SymbolTable};
    ///
    /// let symbols = SymbolTable::new();
    /// symbols.create_variable("x", 2.0).unwrap();
    ///
    /// let (expression, created) = Expression::compile_with_vars("a * x + b", &symbols).unwrap();
    /// assert_eq!(created, ["a", "b"]);
    ///
    /// symbols.variable_ref("a").unwrap().set(3.0);
    /// symbols.variable_ref("b").unwrap().set(1.0);
    /// assert_eq!(expression.value(), 7.0);
    /// ```
    pub fn compile_with_vars(source: &str,
                             symbols: &SymbolTable)
                             -> Result<(Self, Vec<String>), CompileError> {
        let mut expression = Self::new();
        expression.register_symbol_table(symbols);

        let mut parser = Parser::new();
        let mut create = |_: &str, _: &SymbolTable| Resolution::Resolved;
        if parser.compile_with_resolver(source, &mut expression, &mut create) {
            Ok((expression, parser.resolved_symbols().to_vec()))
        } else {
            Err(CompileError::new(parser.errors().to_vec()))
        }
    }

    /// Shares `symbols` with this expression.
    ///
    /// Takes effect at the next compilation: a compiled graph keeps the
    /// storage it was bound to.
    pub fn register_symbol_table(&mut self, symbols: &SymbolTable) {
        if !self.symbols.ptr_eq(symbols) {
            debug!(compiled = self.root.is_some(), "registered symbol table");
        }
        self.symbols = symbols.clone();
    }

    /// The registered symbol table.
    #[must_use]
    pub const fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Whether a compilation has succeeded since the last release.
    #[must_use]
    pub const fn is_compiled(&self) -> bool {
        self.root.is_some()
    }

    /// The source text of the last successful compilation; empty when the
    /// expression is not compiled.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The kind of value the expression produces, once compiled.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        self.root.as_ref().map(Node::kind)
    }

    /// Evaluates the expression as a number.
    ///
    /// String and vector expressions still run, for their side effects, and
    /// yield NaN; use [`Expression::evaluate`] for their value. An
    /// uncompiled expression yields NaN.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.root.as_ref().map_or(f64::NAN, Node::eval_scalar)
    }

    /// Evaluates the expression and returns its full value.
    ///
    /// # Example
    /// ```
    /// use formulary::{Expression, SymbolTable, Value};
    ///
    /// let symbols = SymbolTable::new();
    /// symbols.create_stringvar("name", "world").unwrap();
    ///
    /// let expression = Expression::compile("'hello ' + name", &symbols).unwrap();
    /// assert_eq!(expression.evaluate(), Value::from("hello world"));
    /// ```
    #[must_use]
    pub fn evaluate(&self) -> Value {
        self.root
            .as_ref()
            .map_or(Value::Number(f64::NAN), Node::eval)
    }

    /// Drops the compiled graph, keeping the registered table.
    pub fn release(&mut self) {
        self.root = None;
        self.source.clear();
    }

    pub(crate) fn set_compiled(&mut self, source: &str, settings: Settings, root: Node) {
        self.source = source.to_string();
        self.settings = settings;
        self.root = Some(root);
    }
}

impl Clone for Expression {
    /// Recompiles the source with the settings it was compiled with.
    ///
    /// The clone is left uncompiled if the table no longer binds every
    /// symbol the source uses.
    fn clone(&self) -> Self {
        let mut expression = Self::new();
        expression.register_symbol_table(&self.symbols);
        if self.root.is_none() {
            return expression;
        }

        let mut parser = Parser::with_settings(self.settings);
        if !parser.compile(&self.source, &mut expression) {
            debug!(errors = parser.error_count(), "clone failed to recompile");
        }
        expression
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
         .field("source", &self.source)
         .field("symbols", &self.symbols)
         .field("kind", &self.kind())
         .finish_non_exhaustive()
    }
}
