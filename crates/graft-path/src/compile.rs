//! Pattern compiler: one flat priority-climbing pass.
//!
//! Parenthesization is encoded as a pure additive priority shift instead of
//! nested parse frames: `(` raises a running offset by [`GROUP_OFFSET`], `)`
//! lowers it, and every token's effective priority is the offset plus the
//! base priority of its class. The recursive build step then only has to
//! find the leftmost token with the globally minimum priority — the weakest
//! operator of the current sub-array — and split around it.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::PatternError;
use crate::expr::PathExpr;
use crate::lexer::{RawToken, lex};
use crate::wildcard::WildcardMatcher;

/// Priority added per level of parenthesis nesting. Must exceed every base
/// priority so that any token inside a group binds tighter than any operator
/// outside it.
const GROUP_OFFSET: i32 = 10;

/// Base priorities, loosest to tightest. Literals are atomic leaves and bind
/// tightest of all.
const OR_PRIORITY: i32 = 1;
const DOT_PRIORITY: i32 = 2;
const REPEAT_PRIORITY: i32 = 3;
const TERMINATOR_PRIORITY: i32 = 4;
const LITERAL_PRIORITY: i32 = GROUP_OFFSET;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Dot,
    Or,
    Plus,
    Star,
    Terminator,
    Name,
}

#[derive(Debug, Clone, Copy)]
struct Token<'p> {
    kind: TokenKind,
    text: &'p str,
    priority: i32,
}

/// Compiles a pattern into an executable [`PathExpr`].
///
/// Compilation is pure and has no side effects on any graph. Use a
/// [`PatternCache`] to memoize compiled patterns by text.
pub fn compile(pattern: &str) -> Result<PathExpr, PatternError> {
    let mut tokens = Vec::new();
    let mut offset = 0i32;
    let mut prev: Option<RawToken> = None;
    for lexeme in lex(pattern)? {
        let priority = match lexeme.kind {
            RawToken::LParen => {
                offset += GROUP_OFFSET;
                prev = Some(RawToken::LParen);
                continue;
            }
            RawToken::RParen => {
                offset -= GROUP_OFFSET;
                prev = Some(RawToken::RParen);
                continue;
            }
            RawToken::Dot => DOT_PRIORITY,
            RawToken::Or => OR_PRIORITY,
            RawToken::Plus => REPEAT_PRIORITY,
            RawToken::Terminator => TERMINATOR_PRIORITY,
            RawToken::Name => LITERAL_PRIORITY,
        };
        let kind = match lexeme.kind {
            RawToken::Dot => TokenKind::Dot,
            RawToken::Or => TokenKind::Or,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Terminator => TokenKind::Terminator,
            // A bare `*` directly after `)` is the postfix zero-or-more
            // operator; anywhere else `*` stays a glob glyph.
            RawToken::Name if lexeme.text == "*" && prev == Some(RawToken::RParen) => {
                TokenKind::Star
            }
            _ => TokenKind::Name,
        };
        let priority = if kind == TokenKind::Star {
            REPEAT_PRIORITY
        } else {
            priority
        };
        tokens.push(Token {
            kind,
            text: lexeme.text,
            priority: offset + priority,
        });
        prev = Some(lexeme.kind);
    }
    if offset != 0 {
        return Err(PatternError::UnbalancedParens(pattern.to_string()));
    }
    build(&tokens)
}

/// Recursive split around the leftmost minimum-priority token.
fn build(tokens: &[Token<'_>]) -> Result<PathExpr, PatternError> {
    if tokens.is_empty() {
        return Err(PatternError::Empty);
    }
    let mut idx = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.priority < tokens[idx].priority {
            idx = i;
        }
    }
    let token = tokens[idx];
    match token.kind {
        TokenKind::Name => {
            // a leaf must stand alone in its sub-array
            if tokens.len() != 1 {
                return Err(PatternError::MissingOperator(token.text.to_string()));
            }
            if token.text.contains(['*', '?']) {
                Ok(PathExpr::Wildcard(WildcardMatcher::new(token.text)?))
            } else {
                Ok(PathExpr::Literal(token.text.to_string()))
            }
        }
        TokenKind::Dot | TokenKind::Or => {
            let a = Box::new(build(&tokens[..idx])?);
            let b = Box::new(build(&tokens[idx + 1..])?);
            Ok(if token.kind == TokenKind::Dot {
                PathExpr::Dot(a, b)
            } else {
                PathExpr::Or(a, b)
            })
        }
        TokenKind::Plus | TokenKind::Star | TokenKind::Terminator => {
            if idx != tokens.len() - 1 {
                return Err(PatternError::PostfixNotLast(token.text.to_string()));
            }
            let child = Box::new(build(&tokens[..idx])?);
            Ok(match token.kind {
                TokenKind::Plus => PathExpr::Plus(child),
                TokenKind::Star => PathExpr::Star(child),
                _ => PathExpr::Terminator(child),
            })
        }
    }
}

/// Process-lifetime cache of compiled patterns, keyed by exact pattern text.
///
/// Insert-if-absent: entries are immutable once published, duplicate
/// concurrent compiles of the same text are harmless, and the first writer
/// wins. Construct one cache per process (or per test) and share it; this is
/// explicit owned state rather than an ambient global so isolated instances
/// stay possible.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: DashMap<String, Arc<PathExpr>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled expression for `pattern`, compiling and caching
    /// it on first use. Repeated calls with the same text return the
    /// identical `Arc`.
    pub fn get(&self, pattern: &str) -> Result<Arc<PathExpr>, PatternError> {
        if let Some(hit) = self.compiled.get(pattern) {
            return Ok(Arc::clone(hit.value()));
        }
        let compiled = Arc::new(compile(pattern)?);
        let entry = self
            .compiled
            .entry(pattern.to_string())
            .or_insert(compiled);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of cached patterns.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
