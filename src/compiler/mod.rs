//! # Compiler Module
//!
//! Turns the parsed AST into an executable quadruple program
//! (`crate::vm::Program`). Four pieces cooperate: the address
//! [`Allocator`] partitions the integer address space into typed pools,
//! the symbol and function directories resolve names across the two
//! scope levels, the semantic [`cube`] decides every operator's result
//! type, and the code generator walks the AST emitting and patching
//! quadruples.
//!
//! Compilation is single-pass over declarations: a function can call
//! itself and anything declared before it.

mod allocator;
pub use self::allocator::Allocator;

pub mod cube;

mod symbols;
pub use self::symbols::{FunctionDirectory, SymbolTable};

mod codegen;
pub use self::codegen::compile;
