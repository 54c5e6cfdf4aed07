//! # Interpreter
//!
//! Fetch/execute loop over the quadruple vector. The machine keeps an
//! instruction pointer, a stack of activation frames, and one reserved
//! slot for the frame being assembled by the current `ERA`/`PARAM`/`GOSUB`
//! sequence. Globals and constants are process-level segments shared by
//! every frame; locals and temporaries belong to the frame that is on top
//! of the stack when they are touched, which is what gives each recursive
//! activation its own cells.
//!
//! Program output accumulates in a buffer and is handed back when the run
//! completes; the machine itself never writes to the terminal.

use super::core::{Opcode, Program};
use super::memory::{segment_of, type_of, MemorySegment, Segment, Type, Value};
use crate::error::Error;
use log::trace;

/// One activation record. Created by `ERA`, filled by `PARAM`, entered by
/// `GOSUB`, destroyed by `ENDFUNC`.
#[derive(Debug)]
struct Frame {
    name: String,
    /// Local-segment addresses of the parameters, in declaration order,
    /// so `PARAM k` knows which cell to fill.
    param_addrs: Vec<i32>,
    locals: MemorySegment,
    temps: MemorySegment,
    return_ip: i64,
}

/// The virtual machine. Consumes a compiled [`Program`] and produces the
/// program's output.
pub struct Machine<'a> {
    program: &'a Program,
    globals: MemorySegment,
    constants: MemorySegment,
    /// Local/temp storage backing the main body, which runs outside any
    /// activation frame.
    base_locals: MemorySegment,
    base_temps: MemorySegment,
    frames: Vec<Frame>,
    /// The in-flight frame between `ERA` and `GOSUB`.
    reserved: Option<Frame>,
    ip: i64,
    output: String,
}

impl<'a> Machine<'a> {
    pub fn new(program: &'a Program) -> Self {
        let mut globals = MemorySegment::new();
        for v in &program.globals {
            globals.declare(v.address, v.name.clone(), v.ty);
        }

        let mut constants = MemorySegment::new();
        for (addr, value) in &program.constants {
            let ty = type_of(*addr).expect("constant outside the constant segment");
            constants.declare_with(*addr, "", ty, value.clone());
        }

        let mut base_temps = MemorySegment::new();
        for t in &program.main_temps {
            base_temps.declare(t.address, t.name.clone(), t.ty);
        }

        Self {
            program,
            globals,
            constants,
            base_locals: MemorySegment::new(),
            base_temps,
            frames: Vec::new(),
            reserved: None,
            ip: 0,
            output: String::new(),
        }
    }

    /// Run to completion and return the output buffer.
    pub fn run(mut self) -> Result<String, Error> {
        while (self.ip as usize) < self.program.quads.len() {
            self.step()?;
            self.ip += 1;
        }
        Ok(self.output)
    }

    /// The segment a resolved address lives in right now. Locals and
    /// temps resolve against the top frame, not the process-level
    /// segments, whenever a call is active.
    fn segment(&self, seg: Segment) -> &MemorySegment {
        match seg {
            Segment::Global => &self.globals,
            Segment::Constant => &self.constants,
            Segment::Local => self
                .frames
                .last()
                .map(|f| &f.locals)
                .unwrap_or(&self.base_locals),
            Segment::Temp => self
                .frames
                .last()
                .map(|f| &f.temps)
                .unwrap_or(&self.base_temps),
        }
    }

    fn segment_mut(&mut self, seg: Segment) -> &mut MemorySegment {
        match seg {
            Segment::Global => &mut self.globals,
            Segment::Constant => &mut self.constants,
            Segment::Local => self
                .frames
                .last_mut()
                .map(|f| &mut f.locals)
                .unwrap_or(&mut self.base_locals),
            Segment::Temp => self
                .frames
                .last_mut()
                .map(|f| &mut f.temps)
                .unwrap_or(&mut self.base_temps),
        }
    }

    /// Fetch the value at an address. Reading a declared-but-unwritten
    /// cell is a fatal error; every value-consuming opcode goes through
    /// here.
    fn read(&self, addr: i32) -> Result<Value, Error> {
        let (seg, _) = segment_of(addr).expect("operand address outside every segment");
        let cell = self
            .segment(seg)
            .get(addr)
            .expect("operand address not resolvable in its segment");
        cell.value
            .clone()
            .ok_or_else(|| Error::Uninitialized(cell.name.clone()))
    }

    fn write(&mut self, addr: i32, value: Value) {
        let (seg, _) = segment_of(addr).expect("result address outside every segment");
        if !self.segment_mut(seg).set(addr, value) {
            panic!("write to undeclared cell at address {}", addr);
        }
    }

    /// Execute the quadruple under the instruction pointer.
    fn step(&mut self) -> Result<(), Error> {
        let q = self.program.quads[self.ip as usize];
        trace!("{:4}: {}", self.ip, q);

        match q.op {
            Opcode::Plus | Opcode::Minus | Opcode::Times | Opcode::Divide => {
                let left = self.read(q.left)?;
                let right = self.read(q.right)?;
                // The result cell's declared type selects integer or
                // floating arithmetic.
                let value = match type_of(q.result).expect("arithmetic into an untyped cell") {
                    Type::Int => {
                        let (l, r) = (left.as_i64(), right.as_i64());
                        Value::Int(match q.op {
                            Opcode::Plus => l + r,
                            Opcode::Minus => l - r,
                            Opcode::Times => l * r,
                            Opcode::Divide => {
                                if r == 0 {
                                    return Err(Error::DivisionByZero);
                                }
                                l / r
                            }
                            _ => unreachable!(),
                        })
                    }
                    Type::Float => {
                        let (l, r) = (left.as_f64(), right.as_f64());
                        Value::Float(match q.op {
                            Opcode::Plus => l + r,
                            Opcode::Minus => l - r,
                            Opcode::Times => l * r,
                            Opcode::Divide => {
                                if r == 0.0 {
                                    return Err(Error::DivisionByZero);
                                }
                                l / r
                            }
                            _ => unreachable!(),
                        })
                    }
                    ty => unreachable!("arithmetic result cell of type {}", ty),
                };
                self.write(q.result, value);
            }

            Opcode::Gt | Opcode::Lt | Opcode::Neq => {
                let l = self.read(q.left)?.as_f64();
                let r = self.read(q.right)?.as_f64();
                let outcome = match q.op {
                    Opcode::Gt => l > r,
                    Opcode::Lt => l < r,
                    Opcode::Neq => l != r,
                    _ => unreachable!(),
                };
                self.write(q.result, Value::Bool(outcome));
            }

            Opcode::Assign => {
                let value = self.read(q.left)?;
                self.write(q.result, value);
            }

            Opcode::Print => {
                let value = self.read(q.left)?;
                self.output.push_str(&value.to_string());
                self.output.push(' ');
            }

            Opcode::Println => self.output.push('\n'),

            Opcode::Goto => self.ip = q.result as i64 - 1,

            Opcode::Gotof => {
                if self.read(q.left)?.as_f64() == 0.0 {
                    self.ip = q.result as i64 - 1;
                }
            }

            Opcode::Era => {
                let func = self
                    .program
                    .function_at(q.left)
                    .expect("ERA target is not a function entry point");
                let mut frame = Frame {
                    name: func.name.clone(),
                    param_addrs: func.params.iter().map(|p| p.address).collect(),
                    locals: MemorySegment::new(),
                    temps: MemorySegment::new(),
                    return_ip: 0,
                };
                // Rebuild the callee's slots as fresh uninitialized
                // cells owned by this activation.
                for v in func.params.iter().chain(func.locals.iter()) {
                    frame.locals.declare(v.address, v.name.clone(), v.ty);
                }
                for t in &func.temps {
                    frame.temps.declare(t.address, t.name.clone(), t.ty);
                }
                trace!("reserving frame for '{}'", frame.name);
                self.reserved = Some(frame);
            }

            Opcode::Param => {
                // The argument is evaluated in the caller's context; only
                // the store lands in the reserved frame.
                let value = self.read(q.left)?;
                let pos = q.result as usize;
                let frame = self
                    .reserved
                    .as_mut()
                    .expect("PARAM outside an ERA/GOSUB sequence");
                let addr = frame.param_addrs[pos - 1];
                frame.locals.set(addr, value);
            }

            Opcode::Gosub => {
                let mut frame = self
                    .reserved
                    .take()
                    .expect("GOSUB without a reserved frame");
                frame.return_ip = self.ip + 1;
                trace!("entering '{}' at quad {}", frame.name, q.left);
                self.frames.push(frame);
                self.ip = q.left as i64 - 1;
            }

            Opcode::Endfunc => {
                let frame = self
                    .frames
                    .pop()
                    .expect("ENDFUNC with an empty call stack");
                trace!("leaving '{}', resuming at {}", frame.name, frame.return_ip);
                self.ip = frame.return_ip - 1;
            }
        }

        Ok(())
    }
}
