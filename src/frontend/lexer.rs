//! # Lexer
//!
//! `logos`-derived scanner for the token set of the grammar. Whitespace
//! and `//` line comments are skipped; every other byte must belong to a
//! token or lexing fails with the offending position.

use super::ParseError;
use log::trace;
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[token("program")]
    Program,
    #[token("main")]
    Main,
    #[token("end")]
    End,
    #[token("var")]
    Var,
    #[token("void")]
    Void,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("print")]
    Print,
    #[token("int")]
    Int,
    #[token("float")]
    Float,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    /// Numeric literals are scanned as text; the parser folds a leading
    /// sign and converts.
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().to_string())]
    CteFloat(String),
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    CteInt(String),
    /// The surrounding quotes are stripped here; nothing downstream ever
    /// sees them.
    #[regex(r#""[^"\n]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    CteString(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token(">")]
    Greater,
    #[token("<")]
    Less,
    #[token("!=")]
    NotEqual,
    #[token("=")]
    Assign,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
}

/// A token plus the byte span it came from, for error positions.
#[derive(Clone, Debug, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Range<usize>,
}

/// Scan the whole input up front. The parser works over the finished
/// vector; there is no streaming.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => {
                trace!("TOKEN: {:?} = {:?}", token, &source[span.clone()]);
                tokens.push(SpannedToken { token, span });
            }
            Err(()) => {
                return Err(ParseError::at(
                    source,
                    span.start,
                    format!("unrecognized character {:?}", &source[span]),
                ));
            }
        }
    }
    Ok(tokens)
}
