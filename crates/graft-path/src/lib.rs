//! Path-pattern language for graph traversal.
//!
//! A pattern is a compact string describing one or more paths through the
//! named relations of an object graph:
//!
//! - `.` concatenates path segments
//! - `|` splits the path into two branches
//! - `+` repeats the preceding path one or more times (postfix)
//! - `(...)` followed by `*` repeats the group zero or more times (postfix)
//! - `$` terminates the preceding path (explored, but dropped from the result)
//! - `(` `)` group paths
//! - `*` and `?` act as glob glyphs inside a segment name
//!
//! Some examples: `device.*`, `device.(interfaces.type|driver.author)`,
//! `company.department+.(boss|employees).address`, `*+`.
//!
//! Compilation produces an immutable [`PathExpr`] that is safe to share and
//! evaluate from many threads; [`PatternCache`] memoizes compiled patterns by
//! their exact source text. Evaluation walks live node sets through the
//! [`Explorer`] collaborator, which supplies relation names per node and
//! resolves `(node, name)` to related nodes. The explored graph must be
//! stable, i.e. not change during the exploration.

pub mod compile;
pub mod error;
pub mod explorer;
pub mod expr;
pub mod lexer;
pub mod wildcard;

#[cfg(test)]
mod wildcard_tests;

pub use compile::{PatternCache, compile};
pub use error::PatternError;
pub use explorer::{Explorer, NodeSet};
pub use expr::PathExpr;
pub use wildcard::WildcardMatcher;
