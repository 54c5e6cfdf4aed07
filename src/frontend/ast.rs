//! # Abstract Syntax Tree
//!
//! One sum type per syntactic category, mirroring the grammar: a program
//! is a name, its global declarations, its functions, and the main body;
//! statements and expressions are the usual variants. Binary expressions
//! carry the [`Opcode`] they will compile to, so the generator never
//! re-maps operator tokens.

use crate::vm::{Opcode, Type};

/// A whole source program.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub name: String,
    pub globals: Vec<VarDecl>,
    pub functions: Vec<FuncDecl>,
    pub main: Vec<Stmt>,
}

/// One `id : type` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
}

/// A `void` function: value parameters, locals, body.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<VarDecl>,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Assign {
        target: String,
        value: Expr,
    },
    If {
        cond: Expr,
        then_block: Vec<Stmt>,
        else_block: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Print(Vec<PrintItem>),
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// An argument to `print`: either an expression or a bare string literal
/// (strings exist nowhere else in the language).
#[derive(Clone, Debug, PartialEq)]
pub enum PrintItem {
    Expr(Expr),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Binary {
        op: Opcode,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary minus on a non-literal; minus on a literal folds in the
    /// parser and never reaches here.
    Neg(Box<Expr>),
    Ident(String),
    IntLit(i64),
    FloatLit(f64),
}
