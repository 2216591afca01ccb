/// Default limit on how deeply expressions may nest.
///
/// A level is one bracketed or nested subexpression, prefix operator,
/// exponent or subscript. The limit keeps compilation of the deepest accepted
/// input well inside a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 40;

/// Compiler options.
///
/// The defaults fold constants, allow up to [`DEFAULT_MAX_DEPTH`] levels of
/// nesting and leave loops unbounded.
///
/// # Example
/// ```
/// use formulary::{Parser, Settings};
///
/// let settings = Settings::default().with_constant_folding(false)
///                                   .with_max_loop_iterations(Some(1_000));
/// let parser = Parser::with_settings(settings);
///
/// assert!(!parser.settings().constant_folding);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Evaluate operator and built-in nodes with constant operands at compile
    /// time, and replace constant bindings by their value.
    pub constant_folding:    bool,
    /// Nesting depth above which compilation fails with a syntax error.
    pub max_depth:           usize,
    /// Iteration bound applied to every `while` and `for` loop.
    pub max_loop_iterations: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { constant_folding:    true,
               max_depth:           DEFAULT_MAX_DEPTH,
               max_loop_iterations: None, }
    }
}

impl Settings {
    /// Enables or disables constant folding.
    #[must_use]
    pub const fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.constant_folding = enabled;
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Bounds every loop to `limit` iterations, or lifts the bound.
    #[must_use]
    pub const fn with_max_loop_iterations(mut self, limit: Option<u64>) -> Self {
        self.max_loop_iterations = limit;
        self
    }
}
