//! Pattern compilation errors.

use serde::Serialize;
use thiserror::Error;

/// Errors produced while compiling a path pattern.
///
/// Compilation is pure; a failed compile leaves no state behind and nothing
/// is cached for the offending pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum PatternError {
    /// Opening and closing parentheses do not cancel out.
    #[error("unbalanced parentheses in pattern `{0}`")]
    UnbalancedParens(String),

    /// The pattern, or a parenthesized group inside it, has no tokens.
    #[error("pattern or group has no tokens")]
    Empty,

    /// Two adjacent sub-expressions with no operator between them.
    #[error("missing operator near `{0}`")]
    MissingOperator(String),

    /// `+`, `*` or `$` appeared before the end of its group.
    #[error("postfix operator `{0}` must be the last token of its group")]
    PostfixNotLast(String),

    /// The lexer could not recognize a character run.
    #[error("unexpected character run `{0}`")]
    InvalidToken(String),

    /// A glob segment failed to compile into a matcher.
    #[error("invalid wildcard `{glob}`: {message}")]
    Glob { glob: String, message: String },
}
