//! # Quadruple Program
//!
//! The executable artifact the compiler hands to the machine: a flat
//! vector of four-address quadruples plus the directory of functions and
//! the images of the global and constant segments. A quadruple field
//! holding `-1` is unused; every other field is a virtual address, a
//! quadruple index (jumps), a function entry point (`ERA`/`GOSUB`) or a
//! 1-based parameter position (`PARAM`).

use super::memory::{Type, Value};
use std::fmt;

/// Marker for an unused quadruple field.
pub const UNUSED: i32 = -1;

/// The closed instruction set. Each opcode owns a fixed small integer in
/// the 0..16 operator region of the address space; that region is never
/// allocated and never addressed at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Opcode {
    Plus = 0,
    Minus = 1,
    Times = 2,
    Divide = 3,
    Gt = 4,
    Lt = 5,
    Neq = 6,
    Assign = 7,
    Print = 8,
    Println = 9,
    Goto = 10,
    Gotof = 11,
    Era = 12,
    Param = 13,
    Gosub = 14,
    Endfunc = 15,
}

impl Opcode {
    /// The opcode's fixed slot in the operator region.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mnemonic = match self {
            Opcode::Plus => "+",
            Opcode::Minus => "-",
            Opcode::Times => "*",
            Opcode::Divide => "/",
            Opcode::Gt => ">",
            Opcode::Lt => "<",
            Opcode::Neq => "!=",
            Opcode::Assign => "=",
            Opcode::Print => "PRINT",
            Opcode::Println => "PRINTLN",
            Opcode::Goto => "GOTO",
            Opcode::Gotof => "GOTOF",
            Opcode::Era => "ERA",
            Opcode::Param => "PARAM",
            Opcode::Gosub => "GOSUB",
            Opcode::Endfunc => "ENDFUNC",
        };
        write!(f, "{}", mnemonic)
    }
}

/// One four-address instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quadruple {
    pub op: Opcode,
    pub left: i32,
    pub right: i32,
    pub result: i32,
}

impl Quadruple {
    pub fn new(op: Opcode, left: i32, right: i32, result: i32) -> Self {
        Self {
            op,
            left,
            right,
            result,
        }
    }
}

impl fmt::Display for Quadruple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let field = |n: i32| {
            if n == UNUSED {
                "_".to_string()
            } else {
                n.to_string()
            }
        };
        write!(
            f,
            "({}, {}, {}, {})",
            self.op,
            field(self.left),
            field(self.right),
            field(self.result)
        )
    }
}

/// A declared variable slot: where it lives and what it holds.
#[derive(Clone, Debug)]
pub struct VarRecord {
    /// Empty for constants, `t<n>` for temporaries.
    pub name: String,
    pub ty: Type,
    pub address: i32,
}

impl VarRecord {
    pub fn new(name: impl Into<String>, ty: Type, address: i32) -> Self {
        Self {
            name: name.into(),
            ty,
            address,
        }
    }
}

/// Everything the machine needs to rebuild an activation of one function:
/// its parameter and local slots, the temporaries its body uses, and the
/// quadruple index where its code starts. `quad_start` doubles as the
/// function's identity at call sites.
#[derive(Clone, Debug)]
pub struct FunctionRecord {
    pub name: String,
    pub params: Vec<VarRecord>,
    pub locals: Vec<VarRecord>,
    pub temps: Vec<VarRecord>,
    pub quad_start: i32,
}

/// A fully compiled program.
#[derive(Clone, Debug)]
pub struct Program {
    /// The program's name from the `program <id>;` header.
    pub name: String,
    pub quads: Vec<Quadruple>,
    pub functions: Vec<FunctionRecord>,
    /// Global variable slots, uninitialized at startup.
    pub globals: Vec<VarRecord>,
    /// The deduplicated constant pool: address and value of every literal.
    pub constants: Vec<(i32, Value)>,
    /// Temporaries used by the main body (they live outside any frame).
    pub main_temps: Vec<VarRecord>,
}

impl Program {
    /// Find the function whose body starts at `quad_start`.
    pub fn function_at(&self, quad_start: i32) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.quad_start == quad_start)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for Program {
    /// Diagnostic listing of the quadruple stream, one indexed line per
    /// instruction. Not a stable format.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, quad) in self.quads.iter().enumerate() {
            writeln!(f, "{}: {}", i, quad)?;
        }
        Ok(())
    }
}
