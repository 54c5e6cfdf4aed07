//! # Error Taxonomy
//!
//! The closed set of semantic and runtime errors. Nothing is caught
//! internally: compile-time errors abort code generation at the first
//! occurrence, runtime errors abort the fetch/execute loop, and the driver
//! prints the single-line message on the error stream.

use crate::vm::{Opcode, Type};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A function name was declared twice.
    DuplicateFunction(String),
    /// A variable name collides within one scope (parameters included).
    DuplicateVariable(String),
    /// A name was found in neither the current nor the global scope.
    UndeclaredVariable(String),
    /// A call target is not in the function directory.
    UndeclaredFunction(String),
    /// The semantic cube has no result for this operator and operand
    /// types.
    TypeMismatch {
        op: Opcode,
        left: Type,
        right: Type,
    },
    /// Wrong number of arguments at a call site.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// An allocator pool ran out of addresses.
    OutOfAddressSpace { pool: &'static str, ty: Type },
    /// Divisor is the literal zero, or evaluated to zero at runtime.
    DivisionByZero,
    /// A read observed a cell that was never written.
    Uninitialized(String),
    /// An `if` or `while` condition is not a boolean expression.
    ConditionNotBool(Type),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DuplicateFunction(name) => {
                write!(f, "function '{}' already declared", name)
            }
            Error::DuplicateVariable(name) => {
                write!(f, "variable '{}' already declared in this scope", name)
            }
            Error::UndeclaredVariable(name) => {
                write!(f, "variable '{}' not declared", name)
            }
            Error::UndeclaredFunction(name) => {
                write!(f, "function '{}' not declared", name)
            }
            Error::TypeMismatch { op, left, right } => {
                write!(f, "invalid operation '{}' between {} and {}", op, left, right)
            }
            Error::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "function '{}' takes {} argument(s), {} given",
                name, expected, found
            ),
            Error::OutOfAddressSpace { pool, ty } => {
                write!(f, "out of {} address space for type {}", pool, ty)
            }
            Error::DivisionByZero => write!(f, "division by zero"),
            Error::Uninitialized(name) => {
                write!(f, "variable '{}' used before it was assigned", name)
            }
            Error::ConditionNotBool(ty) => {
                write!(f, "condition must be bool, got {}", ty)
            }
        }
    }
}

impl std::error::Error for Error {}
