//! Error types for the query compiler.

use thiserror::Error;

/// A specialized Result type for query compilation operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while compiling a filter expression.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    /// The filter expression is empty.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// A character could not be tokenized.
    #[error("unexpected character '{character}' at position {position}")]
    Syntax {
        /// The character that could not be tokenized.
        character: char,
        /// The byte offset where the error occurred.
        position: usize,
    },

    /// An unexpected token was encountered during parsing.
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The unexpected token that was encountered.
        token: String,
        /// The byte offset of the token.
        position: usize,
    },

    /// The expression ended before the grammar was satisfied.
    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    /// An operator token is not part of the supported operator set.
    #[error("unsupported operator '{operator}' at position {position}")]
    UnsupportedOperator {
        /// The unrecognized operator.
        operator: String,
        /// The byte offset of the operator.
        position: usize,
    },

    /// An opening parenthesis was never closed.
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    /// An `in` clause had no values between its parentheses.
    #[error("'in' requires a non-empty parenthesized value list")]
    EmptyValueList,
}

impl QueryError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        QueryError::UnexpectedToken {
            token: token.into(),
            position,
        }
    }

    /// Creates an unsupported operator error.
    pub fn unsupported_operator(operator: impl Into<String>, position: usize) -> Self {
        QueryError::UnsupportedOperator {
            operator: operator.into(),
            position,
        }
    }
}
