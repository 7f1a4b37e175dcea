//! Lexer for path patterns.
//!
//! Produces operator tokens and literal name runs in one scan. A name run is
//! any stretch of non-operator, non-space characters and may contain the glob
//! glyphs `*` and `?`; whether such a run is a literal, a wildcard, or the
//! postfix zero-or-more operator is decided by the compiler, not here.

use logos::Logos;

use crate::error::PatternError;

/// Raw token kinds recognized by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum RawToken {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(".")]
    Dot,

    #[token("|")]
    Or,

    #[token("+")]
    Plus,

    #[token("$")]
    Terminator,

    /// A literal run: anything that is not whitespace or an operator.
    #[regex(r"[^ \t\r\n().|+$]+")]
    Name,
}

/// One lexed token with its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'p> {
    pub kind: RawToken,
    pub text: &'p str,
}

/// Tokenizes a pattern into lexemes, skipping whitespace.
pub fn lex(pattern: &str) -> Result<Vec<Lexeme<'_>>, PatternError> {
    let mut lexer = RawToken::lexer(pattern);
    let mut lexemes = Vec::new();
    while let Some(item) = lexer.next() {
        match item {
            Ok(kind) => lexemes.push(Lexeme {
                kind,
                text: lexer.slice(),
            }),
            Err(()) => return Err(PatternError::InvalidToken(lexer.slice().to_string())),
        }
    }
    Ok(lexemes)
}
