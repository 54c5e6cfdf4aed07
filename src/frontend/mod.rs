//! # Frontend Module
//!
//! Everything between raw source text and the AST the code generator
//! consumes: the `logos` scanner, the recursive-descent parser, and the
//! syntax tree itself. The frontend knows nothing about addresses,
//! quadruples, or types beyond the two spellable ones (`int`, `float`).

pub mod ast;

mod lexer;
pub use self::lexer::{tokenize, SpannedToken, Token};

mod parser;
pub use self::parser::parse;

use std::fmt;

/// A lexing or parsing failure, positioned in the source.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Build an error whose position is the line and column of `offset`
    /// within `source`.
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_col(source, offset);
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "syntax error at line {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
