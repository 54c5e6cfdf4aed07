//! # BabyDuck
//!
//! A compiler and tree-walking virtual machine for BabyDuck, a small
//! imperative teaching language with typed variables (`int`, `float`),
//! global and function-local scopes, `void` procedures with value
//! parameters and recursion, `if`/`else`, `while`, and a `print`
//! statement that also accepts string literals.
//!
//! The pipeline: [`frontend`] lexes and parses source text into an AST,
//! [`compiler`] lowers the AST to a flat stream of four-address
//! quadruples over a segmented virtual address space, and [`vm`]
//! interprets the quadruples with a call stack of activation frames.

pub mod compiler;
pub mod error;
pub mod frontend;
pub mod vm;

pub use error::Error;
