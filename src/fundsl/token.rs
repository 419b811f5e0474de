//! Token definitions for fun-dsl calls.
//!
//! Tokens are produced by a logos lexer. Whitespace between tokens is
//! skipped, so a call may span several lines inside its markers.

use logos::Logos;
use std::fmt;
use std::ops::Range;

use super::DslError;

/// Byte range of a token inside the call source.
pub type Span = Range<usize>;

/// All tokens of a fun-dsl call.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    /// Quoted string, delimiters stripped. No escape sequences.
    #[regex(r#""[^"]*""#, unquote)]
    #[regex(r"'[^']*'", unquote)]
    Str(&'src str),

    /// Signed decimal such as `3.14`, `-.5`.
    #[regex(r"-?[0-9]*\.[0-9]+", |lex| lex.slice())]
    Float(&'src str),

    /// Signed integer.
    #[regex(r"-?[0-9]+", |lex| lex.slice())]
    Int(&'src str),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("=")]
    Equals,
}

fn unquote<'src>(lex: &mut logos::Lexer<'src, Token<'src>>) -> &'src str {
    let slice = lex.slice();
    &slice[1..slice.len() - 1]
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Str(s) => write!(f, "string \"{s}\""),
            Token::Float(n) | Token::Int(n) => write!(f, "number `{n}`"),
            Token::Ident(name) => write!(f, "identifier `{name}`"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::LBracket => f.write_str("`[`"),
            Token::RBracket => f.write_str("`]`"),
            Token::LBrace => f.write_str("`{`"),
            Token::RBrace => f.write_str("`}`"),
            Token::Comma => f.write_str("`,`"),
            Token::Colon => f.write_str("`:`"),
            Token::Dot => f.write_str("`.`"),
            Token::Equals => f.write_str("`=`"),
        }
    }
}

/// Tokenize a call source, keeping the span of every token.
///
/// Fails on the first character that starts no token.
pub fn tokenize(source: &str) -> Result<Vec<(Token<'_>, Span)>, DslError> {
    Token::lexer(source)
        .spanned()
        .map(|(token, span)| match token {
            Ok(token) => Ok((token, span)),
            Err(()) => Err(DslError::Syntax {
                message: format!("unexpected character `{}`", &source[span.clone()]),
                offset: span.start,
            }),
        })
        .collect()
}
