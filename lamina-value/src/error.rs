// lamina-value - Error types for collection operations
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types shared by the value model and the operation layer.

use std::fmt;

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while operating on values and collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Wrong type for an operation
    TypeError {
        expected: &'static str,
        got: &'static str,
        context: Option<String>,
    },
    /// A size-dependent eager operation was called on an unbounded sequence
    Unbounded { op: &'static str },
    /// A path segment resolved to a value that cannot be descended into
    PathConflict {
        key: String,
        found: &'static str,
    },
    /// Reduce of an empty collection with no initial value
    EmptyReduce,
    /// Index out of bounds for an indexed collection
    IndexOutOfBounds { index: i64, length: usize },
    /// Wrong input shape to a constructor
    InvalidInput { context: &'static str, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeError {
                expected,
                got,
                context,
            } => {
                if let Some(ctx) = context {
                    write!(f, "{}: expected {}, got {}", ctx, expected, got)
                } else {
                    write!(f, "Type error: expected {}, got {}", expected, got)
                }
            }
            Error::Unbounded { op } => {
                write!(f, "Cannot perform {} on an infinite collection", op)
            }
            Error::PathConflict { key, found } => {
                write!(
                    f,
                    "Cannot update within non-data-structure value at key {}: found {}",
                    key, found
                )
            }
            Error::EmptyReduce => {
                write!(f, "Reduce of empty collection with no initial value")
            }
            Error::IndexOutOfBounds { index, length } => {
                write!(
                    f,
                    "Index {} out of bounds for collection of length {}",
                    index, length
                )
            }
            Error::InvalidInput { context, message } => {
                write!(f, "{}: {}", context, message)
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a type error.
    pub fn type_error(expected: &'static str, got: &'static str) -> Self {
        Error::TypeError {
            expected,
            got,
            context: None,
        }
    }

    /// Create a type error with context.
    pub fn type_error_in(
        context: impl Into<String>,
        expected: &'static str,
        got: &'static str,
    ) -> Self {
        Error::TypeError {
            expected,
            got,
            context: Some(context.into()),
        }
    }

    /// Create an infinite-collection error.
    pub fn unbounded(op: &'static str) -> Self {
        Error::Unbounded { op }
    }

    /// Create a path-conflict error for `update_in` descent.
    pub fn path_conflict(key: impl Into<String>, found: &'static str) -> Self {
        Error::PathConflict {
            key: key.into(),
            found,
        }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(context: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            context,
            message: message.into(),
        }
    }
}
