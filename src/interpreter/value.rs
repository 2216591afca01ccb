use std::fmt;

use crate::ast::Kind;

/// The result of evaluating a compiled expression.
///
/// Scalar expressions produce numbers, string expressions byte strings and
/// vector expressions a copy of the resulting elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A double precision number. Logical results are `1.0` or `0.0`.
    Number(f64),
    /// A byte string, not necessarily UTF-8.
    Text(Vec<u8>),
    /// The elements of a vector.
    Vector(Vec<f64>),
}

impl Value {
    /// The kind of the value.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Number(_) => Kind::Scalar,
            Self::Text(_) => Kind::String,
            Self::Vector(_) => Kind::Vector,
        }
    }

    /// The number, if this is a scalar result.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The bytes, if this is a string result.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The elements, if this is a vector result.
    #[must_use]
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Self::Vector(values) => Some(values),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.as_bytes().to_vec())
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Self::Vector(values) => {
                write!(f, "[")?;

                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{value}")?;
                }

                write!(f, "]")
            },
        }
    }
}
