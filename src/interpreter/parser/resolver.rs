use crate::symbol_table::SymbolTable;

/// The outcome of resolving an unknown identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Compilation may proceed. If the resolver did not bind the name
    /// itself, the parser creates a scalar variable initialised to zero.
    Resolved,
    /// Compilation fails with this message.
    Failed(String),
}

/// Decides what happens to identifiers missing from the symbol table.
///
/// The resolver is consulted once per unknown name and may register the name
/// in the table it is handed. Closures taking `(&str, &SymbolTable)` implement
/// this trait.
///
/// # Example
/// ```
/// use formulary::{Expression, Parser, Resolution, SymbolTable};
///
/// let symbols = SymbolTable::new();
/// let mut expression = Expression::new();
/// expression.register_symbol_table(&symbols);
///
/// let mut parser = Parser::new();
/// let mut resolver = |name: &str, _: &SymbolTable| {
///     if name.starts_with("in_") {
///         Resolution::Resolved
///     } else {
///         Resolution::Failed(format!("unknown input '{name}'"))
///     }
/// };
///
/// assert!(parser.compile_with_resolver("in_a + in_b", &mut expression, &mut resolver));
/// symbols.variable_ref("in_a").unwrap().set(2.0);
/// symbols.variable_ref("in_b").unwrap().set(3.0);
/// assert_eq!(expression.value(), 5.0);
///
/// assert!(!parser.compile_with_resolver("out + 1", &mut expression, &mut resolver));
/// assert_eq!(parser.error(0).unwrap().message, "unknown input 'out'");
/// ```
pub trait UnknownSymbolResolver {
    /// Called with the unknown name and the table being compiled against.
    fn resolve(&mut self, name: &str, symbols: &SymbolTable) -> Resolution;
}

impl<F> UnknownSymbolResolver for F
    where F: FnMut(&str, &SymbolTable) -> Resolution
{
    fn resolve(&mut self, name: &str, symbols: &SymbolTable) -> Resolution {
        self(name, symbols)
    }
}
