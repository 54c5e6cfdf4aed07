//! # Virtual Machine Module
//!
//! This module contains all things related to the virtual machine.
//!
//! ### What is this machine?
//!
//! A stack machine over four-address quadruples. Memory is addressed by
//! integers whose range encodes the storage class and element type of the
//! cell; code is a flat instruction vector produced by the compiler; calls
//! run through an `ERA`/`PARAM`/`GOSUB`/`ENDFUNC` protocol that gives
//! every activation a private copy of its locals and temporaries.

mod core;
pub use self::core::*;

mod memory;
pub use self::memory::*;

mod interpreter;
pub use self::interpreter::*;
