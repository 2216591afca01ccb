use thiserror::Error;

/// Represents the reasons a symbol table operation can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The name is empty or contains characters other than ASCII letters,
    /// digits and underscores, or starts with a digit.
    #[error("'{name}' is not a valid symbol name")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// The name is a keyword or a built-in function.
    #[error("'{name}' is reserved")]
    ReservedName {
        /// The rejected name.
        name: String,
    },
    /// A symbol with the same name is already registered.
    #[error("symbol '{name}' already exists")]
    DuplicateName {
        /// The rejected name.
        name: String,
    },
    /// No symbol of the requested kind exists under that name.
    #[error("no {kind} named '{name}'")]
    NotFound {
        /// The requested name.
        name: String,
        /// The kind of symbol that was looked for.
        kind: &'static str,
    },
    /// User functions must take between one and four arguments.
    #[error("function '{name}' takes {arity} arguments, expected between 1 and 4")]
    InvalidArity {
        /// The function name.
        name:  String,
        /// The arity reported by the function.
        arity: usize,
    },
    /// Vectors have a fixed, non-zero length.
    #[error("vector '{name}' must have at least one element")]
    EmptyVector {
        /// The vector name.
        name: String,
    },
}
