use std::fmt;

use thiserror::Error;

/// The compilation phase that raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorMode {
    /// Malformed token: bad number literal, unterminated string, stray
    /// character.
    Lexer,
    /// Grammar violation, wrong argument count or nesting too deep.
    Syntax,
    /// Identifier that could not be resolved against the symbol table.
    Symtab,
    /// Operands of incompatible kinds or an invalid assignment target.
    Parser,
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexer => write!(f, "lexer"),
            Self::Syntax => write!(f, "syntax"),
            Self::Symtab => write!(f, "symbol"),
            Self::Parser => write!(f, "type"),
        }
    }
}

/// One compile-time error record.
///
/// A diagnostic names the offending token, carries a human readable message
/// and locates the error with the full source line and 1-based line and
/// column numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The phase that raised the error.
    pub mode:        ErrorMode,
    /// Category of the involved token, such as `NUMBER`, `SYMBOL` or `EOF`.
    pub token_type:  &'static str,
    /// Literal source text of the involved token.
    pub token_value: String,
    /// Human readable description.
    pub message:     String,
    /// The source line the error occurred on, without its line terminator.
    pub source_line: String,
    /// 1-based line number.
    pub line:        usize,
    /// 1-based column number, counted in characters.
    pub column:      usize,
}

impl Diagnostic {
    /// Builds a diagnostic, extracting the offending line from `source`.
    ///
    /// # Example
    /// ```
    /// use formulary::{Diagnostic, ErrorMode};
    ///
    /// let d = Diagnostic::new(ErrorMode::Syntax,
    ///                         "SYMBOL",
    ///                         "y",
    ///                         "unexpected token".to_string(),
    ///                         "x +\ny",
    ///                         2,
    ///                         1);
    ///
    /// assert_eq!(d.source_line, "y");
    /// assert_eq!(d.to_string(), "2:1: syntax error: unexpected token");
    /// ```
    #[must_use]
    pub fn new(mode: ErrorMode,
               token_type: &'static str,
               token_value: impl Into<String>,
               message: String,
               source: &str,
               line: usize,
               column: usize)
               -> Self {
        let source_line = source.lines()
                                .nth(line.saturating_sub(1))
                                .unwrap_or_default()
                                .to_string();

        Self { mode,
               token_type,
               token_value: token_value.into(),
               message,
               source_line,
               line,
               column }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "{}:{}: {} error: {}",
               self.line, self.column, self.mode, self.message)
    }
}

/// Every diagnostic raised by a failed compilation.
///
/// Returned by [`Expression::compile`](crate::Expression::compile). The list
/// is never empty and keeps the order in which errors were found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.diagnostics))]
pub struct CompileError {
    diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    pub(crate) const fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// All diagnostics, in order of occurrence.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The first diagnostic, if any was recorded.
    #[must_use]
    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "compilation failed".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
