//! # Quadruple Generator
//!
//! Walks the AST and emits the flat quadruple stream. Expressions run on
//! an operand stack of virtual addresses: every sub-expression pushes the
//! address of its result, every operator pops two, consults the semantic
//! cube, allocates a temporary for the result and pushes it back. Jumps
//! are emitted with an unknown target and patched the moment the target
//! index exists.

use super::allocator::Allocator;
use super::cube;
use super::symbols::{FunctionDirectory, SymbolTable};
use crate::error::Error;
use crate::frontend::ast::{Expr, FuncDecl, PrintItem, Program, Stmt, VarDecl};
use crate::vm;
use crate::vm::{type_of, FunctionRecord, Opcode, Quadruple, Type, Value, VarRecord, UNUSED};
use log::debug;
use std::collections::HashMap;

/// Compile a parsed program into an executable quadruple program.
pub fn compile(program: &Program) -> Result<vm::Program, Error> {
    Compiler::new().compile_program(program)
}

/// Deduplicating constant pool. Every literal is allocated once and the
/// same address is reused for every later occurrence of the same value.
#[derive(Debug, Default)]
struct ConstPool {
    by_key: HashMap<ConstKey, i32>,
    by_addr: HashMap<i32, Value>,
    image: Vec<(i32, Value)>,
}

/// Hashable identity of a constant. Floats are keyed by their bit
/// pattern.
#[derive(Debug, PartialEq, Eq, Hash)]
enum ConstKey {
    Int(i64),
    Float(u64),
    Str(String),
}

impl ConstPool {
    fn intern(&mut self, alloc: &mut Allocator, value: Value) -> Result<i32, Error> {
        let (key, ty) = match &value {
            Value::Int(n) => (ConstKey::Int(*n), Type::Int),
            Value::Float(x) => (ConstKey::Float(x.to_bits()), Type::Float),
            Value::Str(s) => (ConstKey::Str(s.clone()), Type::Str),
            Value::Bool(_) => unreachable!("the language has no boolean literals"),
        };
        if let Some(&addr) = self.by_key.get(&key) {
            return Ok(addr);
        }
        let addr = alloc.next_const(ty)?;
        self.by_key.insert(key, addr);
        self.by_addr.insert(addr, value.clone());
        self.image.push((addr, value));
        Ok(addr)
    }

    fn value_at(&self, addr: i32) -> Option<&Value> {
        self.by_addr.get(&addr)
    }
}

struct Compiler {
    alloc: Allocator,
    directory: FunctionDirectory,
    globals: SymbolTable,
    /// Bindings of the function currently being compiled.
    locals: SymbolTable,
    constants: ConstPool,
    quads: Vec<Quadruple>,
    /// Operand stack: addresses of pending sub-expression results.
    operands: Vec<i32>,
    /// Temporaries of the scope currently being compiled.
    temps: Vec<VarRecord>,
    temp_count: i32,
    /// `Some(function)` inside a function body, `None` in the main body.
    scope: Option<String>,
}

impl Compiler {
    fn new() -> Self {
        Self {
            alloc: Allocator::new(),
            directory: FunctionDirectory::new(),
            globals: SymbolTable::new(),
            locals: SymbolTable::new(),
            constants: ConstPool::default(),
            quads: Vec::new(),
            operands: Vec::new(),
            temps: Vec::new(),
            temp_count: 0,
            scope: None,
        }
    }

    fn compile_program(mut self, program: &Program) -> Result<vm::Program, Error> {
        // Quadruple 0 jumps over the function bodies to the main body;
        // its target is patched once all functions are compiled.
        self.emit(Opcode::Goto, UNUSED, UNUSED, UNUSED);

        for decl in &program.globals {
            self.declare_global(decl)?;
        }
        for func in &program.functions {
            self.compile_function(func)?;
        }

        let main_start = self.quads.len() as i32;
        self.quads[0].result = main_start;

        for stmt in &program.main {
            self.gen_stmt(stmt)?;
            debug_assert!(self.operands.is_empty(), "operand stack must drain per statement");
        }

        Ok(vm::Program {
            name: program.name.clone(),
            quads: self.quads,
            functions: self.directory.into_functions(),
            globals: self.globals.records().to_vec(),
            constants: self.constants.image,
            main_temps: self.temps,
        })
    }

    fn declare_global(&mut self, decl: &VarDecl) -> Result<(), Error> {
        let addr = self.alloc.next_global(decl.ty)?;
        self.globals
            .insert(VarRecord::new(decl.name.clone(), decl.ty, addr))
    }

    fn compile_function(&mut self, func: &FuncDecl) -> Result<(), Error> {
        if self.directory.contains(&func.name) {
            return Err(Error::DuplicateFunction(func.name.clone()));
        }

        let quad_start = self.quads.len() as i32;
        self.scope = Some(func.name.clone());
        self.locals.clear();

        // Parameters first, then locals, in declaration order; the
        // shared scope table catches collisions across both lists.
        let mut params = Vec::new();
        for p in &func.params {
            let addr = self.alloc.next_local(p.ty)?;
            let record = VarRecord::new(p.name.clone(), p.ty, addr);
            self.locals.insert(record.clone())?;
            params.push(record);
        }
        let mut locals = Vec::new();
        for v in &func.locals {
            let addr = self.alloc.next_local(v.ty)?;
            let record = VarRecord::new(v.name.clone(), v.ty, addr);
            self.locals.insert(record.clone())?;
            locals.push(record);
        }

        // The record goes into the directory before the body is
        // generated so recursive calls can resolve themselves.
        self.directory.declare(FunctionRecord {
            name: func.name.clone(),
            params,
            locals,
            temps: Vec::new(),
            quad_start,
        })?;

        for stmt in &func.body {
            self.gen_stmt(stmt)?;
        }
        self.emit(Opcode::Endfunc, UNUSED, UNUSED, UNUSED);

        let temps = std::mem::take(&mut self.temps);
        self.directory.lookup_mut(&func.name)?.temps = temps;

        // The next function (and the main body) reuses the local and
        // temporary pools from their floors.
        self.alloc.reset_local();
        self.alloc.reset_temp();
        self.temp_count = 0;
        self.scope = None;
        Ok(())
    }

    // ---- statements ----

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Assign { target, value } => self.gen_assign(target, value),
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => self.gen_if(cond, then_block, else_block),
            Stmt::While { cond, body } => self.gen_while(cond, body),
            Stmt::Print(items) => self.gen_print(items),
            Stmt::Call { name, args } => self.gen_call(name, args),
        }
    }

    fn gen_assign(&mut self, target: &str, value: &Expr) -> Result<(), Error> {
        self.gen_expr(value)?;
        let result = self.pop();
        let dest = self.lookup(target)?.clone();
        cube::result_type(Opcode::Assign, dest.ty, self.operand_type(result))?;
        self.emit(Opcode::Assign, result, UNUSED, dest.address);
        Ok(())
    }

    fn gen_if(
        &mut self,
        cond: &Expr,
        then_block: &[Stmt],
        else_block: &[Stmt],
    ) -> Result<(), Error> {
        let cond_addr = self.gen_condition(cond)?;

        let jump_false = self.quads.len();
        self.emit(Opcode::Gotof, cond_addr, UNUSED, UNUSED);

        for stmt in then_block {
            self.gen_stmt(stmt)?;
        }

        if else_block.is_empty() {
            self.quads[jump_false].result = self.quads.len() as i32;
        } else {
            let jump_end = self.quads.len();
            self.emit(Opcode::Goto, UNUSED, UNUSED, UNUSED);
            self.quads[jump_false].result = self.quads.len() as i32;
            for stmt in else_block {
                self.gen_stmt(stmt)?;
            }
            self.quads[jump_end].result = self.quads.len() as i32;
        }
        Ok(())
    }

    fn gen_while(&mut self, cond: &Expr, body: &[Stmt]) -> Result<(), Error> {
        let start = self.quads.len() as i32;
        let cond_addr = self.gen_condition(cond)?;

        let jump_false = self.quads.len();
        self.emit(Opcode::Gotof, cond_addr, UNUSED, UNUSED);

        for stmt in body {
            self.gen_stmt(stmt)?;
        }
        self.emit(Opcode::Goto, UNUSED, UNUSED, start);
        self.quads[jump_false].result = self.quads.len() as i32;
        Ok(())
    }

    /// Generate a condition expression and insist it is boolean.
    fn gen_condition(&mut self, cond: &Expr) -> Result<i32, Error> {
        self.gen_expr(cond)?;
        let addr = self.pop();
        let ty = self.operand_type(addr);
        if ty != Type::Bool {
            return Err(Error::ConditionNotBool(ty));
        }
        Ok(addr)
    }

    fn gen_print(&mut self, items: &[PrintItem]) -> Result<(), Error> {
        for item in items {
            let addr = match item {
                PrintItem::Expr(expr) => {
                    self.gen_expr(expr)?;
                    self.pop()
                }
                PrintItem::Str(text) => self
                    .constants
                    .intern(&mut self.alloc, Value::Str(text.clone()))?,
            };
            self.emit(Opcode::Print, addr, UNUSED, UNUSED);
        }
        self.emit(Opcode::Println, UNUSED, UNUSED, UNUSED);
        Ok(())
    }

    fn gen_call(&mut self, name: &str, args: &[Expr]) -> Result<(), Error> {
        let callee = self.directory.lookup(name)?;
        if args.len() != callee.params.len() {
            return Err(Error::ArityMismatch {
                name: name.to_string(),
                expected: callee.params.len(),
                found: args.len(),
            });
        }
        let quad_start = callee.quad_start;
        let param_types: Vec<Type> = callee.params.iter().map(|p| p.ty).collect();

        self.emit(Opcode::Era, quad_start, UNUSED, UNUSED);
        for (i, arg) in args.iter().enumerate() {
            self.gen_expr(arg)?;
            let addr = self.pop();
            let found = self.operand_type(addr);
            if found != param_types[i] {
                return Err(Error::TypeMismatch {
                    op: Opcode::Param,
                    left: param_types[i],
                    right: found,
                });
            }
            self.emit(Opcode::Param, addr, UNUSED, (i + 1) as i32);
        }
        self.emit(Opcode::Gosub, quad_start, UNUSED, UNUSED);
        Ok(())
    }

    // ---- expressions ----

    fn gen_expr(&mut self, expr: &Expr) -> Result<(), Error> {
        match expr {
            Expr::Ident(name) => {
                let addr = self.lookup(name)?.address;
                self.push(addr);
                Ok(())
            }
            Expr::IntLit(n) => {
                let addr = self.constants.intern(&mut self.alloc, Value::Int(*n))?;
                self.push(addr);
                Ok(())
            }
            Expr::FloatLit(x) => {
                let addr = self.constants.intern(&mut self.alloc, Value::Float(*x))?;
                self.push(addr);
                Ok(())
            }
            Expr::Binary { op, left, right } => {
                self.gen_expr(left)?;
                self.gen_expr(right)?;
                self.combine(*op)
            }
            // Minus on a non-literal lowers to `0 - x`.
            Expr::Neg(inner) => {
                let zero = self.constants.intern(&mut self.alloc, Value::Int(0))?;
                self.push(zero);
                self.gen_expr(inner)?;
                self.combine(Opcode::Minus)
            }
        }
    }

    /// Pop the two topmost operands, type-check through the cube, emit
    /// the operation into a fresh temporary and push its address.
    fn combine(&mut self, op: Opcode) -> Result<(), Error> {
        let right = self.pop();
        let left = self.pop();
        let result_ty =
            cube::result_type(op, self.operand_type(left), self.operand_type(right))?;

        // A literal zero divisor is already known to be wrong here.
        if op == Opcode::Divide {
            let is_zero = match self.constants.value_at(right) {
                Some(Value::Int(n)) => *n == 0,
                Some(Value::Float(x)) => *x == 0.0,
                _ => false,
            };
            if is_zero {
                return Err(Error::DivisionByZero);
            }
        }

        let temp = self.new_temp(result_ty)?;
        self.emit(op, left, right, temp);
        self.push(temp);
        Ok(())
    }

    // ---- plumbing ----

    fn lookup(&self, name: &str) -> Result<&VarRecord, Error> {
        if self.scope.is_some() {
            if let Some(record) = self.locals.get(name) {
                return Ok(record);
            }
        }
        self.globals
            .get(name)
            .ok_or_else(|| Error::UndeclaredVariable(name.to_string()))
    }

    fn operand_type(&self, addr: i32) -> Type {
        type_of(addr).expect("operand address outside every segment")
    }

    fn new_temp(&mut self, ty: Type) -> Result<i32, Error> {
        let addr = self.alloc.next_temp(ty)?;
        self.temp_count += 1;
        self.temps
            .push(VarRecord::new(format!("t{}", self.temp_count), ty, addr));
        Ok(addr)
    }

    fn push(&mut self, addr: i32) {
        self.operands.push(addr);
    }

    fn pop(&mut self) -> i32 {
        self.operands.pop().expect("operand stack underflow")
    }

    fn emit(&mut self, op: Opcode, left: i32, right: i32, result: i32) {
        let quad = Quadruple::new(op, left, right, result);
        debug!("emit {}: {}", self.quads.len(), quad);
        self.quads.push(quad);
    }
}
