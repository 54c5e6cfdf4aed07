//! Runs the machine on hand-built quadruple programs, with no compiler
//! involved, to pin down the instruction semantics themselves.

use babyduck::vm::{
    FunctionRecord, Machine, Opcode, Program, Quadruple, Type, Value, VarRecord, UNUSED,
};
use babyduck::Error;

fn quad(op: Opcode, left: i32, right: i32, result: i32) -> Quadruple {
    Quadruple::new(op, left, right, result)
}

fn program(
    quads: Vec<Quadruple>,
    functions: Vec<FunctionRecord>,
    globals: Vec<VarRecord>,
    constants: Vec<(i32, Value)>,
    main_temps: Vec<VarRecord>,
) -> Program {
    Program {
        name: "handmade".into(),
        quads,
        functions,
        globals,
        constants,
        main_temps,
    }
}

#[test]
fn arithmetic_selects_the_result_cell_type() {
    // 2 + 3 * 4, entirely over int cells
    let p = program(
        vec![
            quad(Opcode::Times, 5001, 5002, 7000),
            quad(Opcode::Plus, 5000, 7000, 7001),
            quad(Opcode::Print, 7001, UNUSED, UNUSED),
            quad(Opcode::Println, UNUSED, UNUSED, UNUSED),
        ],
        vec![],
        vec![],
        vec![
            (5000, Value::Int(2)),
            (5001, Value::Int(3)),
            (5002, Value::Int(4)),
        ],
        vec![
            VarRecord::new("t1", Type::Int, 7000),
            VarRecord::new("t2", Type::Int, 7001),
        ],
    );
    assert_eq!(Machine::new(&p).run().unwrap(), "14 \n");

    // the same sum into a float temp produces float output
    let p = program(
        vec![
            quad(Opcode::Plus, 5000, 6000, 7500),
            quad(Opcode::Print, 7500, UNUSED, UNUSED),
            quad(Opcode::Println, UNUSED, UNUSED, UNUSED),
        ],
        vec![],
        vec![],
        vec![(5000, Value::Int(1)), (6000, Value::Float(0.5))],
        vec![VarRecord::new("t1", Type::Float, 7500)],
    );
    assert_eq!(Machine::new(&p).run().unwrap(), "1.500000 \n");
}

#[test]
fn gotof_jumps_only_on_false() {
    let build = |left: i32, right: i32| {
        program(
            vec![
                quad(Opcode::Lt, left, right, 8000),
                quad(Opcode::Gotof, 8000, UNUSED, 4),
                quad(Opcode::Print, 5000, UNUSED, UNUSED),
                quad(Opcode::Println, UNUSED, UNUSED, UNUSED),
            ],
            vec![],
            vec![],
            vec![(5000, Value::Int(1)), (5001, Value::Int(2))],
            vec![VarRecord::new("t1", Type::Bool, 8000)],
        )
    };
    // 1 < 2 holds, so execution falls through to the print
    assert_eq!(Machine::new(&build(5000, 5001)).run().unwrap(), "1 \n");
    // 2 < 1 fails, so the jump skips the print entirely
    assert_eq!(Machine::new(&build(5001, 5000)).run().unwrap(), "");
}

#[test]
fn the_call_protocol_builds_and_tears_down_frames() {
    // void dbl(n) { print(n * 2); } called with 21
    let dbl = FunctionRecord {
        name: "dbl".into(),
        params: vec![VarRecord::new("n", Type::Int, 3000)],
        locals: vec![],
        temps: vec![VarRecord::new("t1", Type::Int, 7000)],
        quad_start: 1,
    };
    let p = program(
        vec![
            quad(Opcode::Goto, UNUSED, UNUSED, 5),
            quad(Opcode::Times, 3000, 5001, 7000),
            quad(Opcode::Print, 7000, UNUSED, UNUSED),
            quad(Opcode::Println, UNUSED, UNUSED, UNUSED),
            quad(Opcode::Endfunc, UNUSED, UNUSED, UNUSED),
            quad(Opcode::Era, 1, UNUSED, UNUSED),
            quad(Opcode::Param, 5000, UNUSED, 1),
            quad(Opcode::Gosub, 1, UNUSED, UNUSED),
        ],
        vec![dbl],
        vec![],
        vec![(5000, Value::Int(21)), (5001, Value::Int(2))],
        vec![],
    );
    assert_eq!(Machine::new(&p).run().unwrap(), "42 \n");
}

#[test]
fn assignment_copies_between_segments() {
    let p = program(
        vec![
            quad(Opcode::Assign, 5000, UNUSED, 1000),
            quad(Opcode::Print, 1000, UNUSED, UNUSED),
            quad(Opcode::Println, UNUSED, UNUSED, UNUSED),
        ],
        vec![],
        vec![VarRecord::new("g", Type::Int, 1000)],
        vec![(5000, Value::Int(7))],
        vec![],
    );
    assert_eq!(Machine::new(&p).run().unwrap(), "7 \n");
}

#[test]
fn reading_an_unwritten_global_is_fatal() {
    let p = program(
        vec![quad(Opcode::Print, 1000, UNUSED, UNUSED)],
        vec![],
        vec![VarRecord::new("g", Type::Int, 1000)],
        vec![],
        vec![],
    );
    assert_eq!(
        Machine::new(&p).run().unwrap_err(),
        Error::Uninitialized("g".into())
    );
}

#[test]
fn the_machine_also_traps_zero_divisors() {
    // the compiler rejects literal zeros, but a machine-level divide by
    // a zero-valued cell must still fault
    let p = program(
        vec![quad(Opcode::Divide, 5000, 5001, 7000)],
        vec![],
        vec![],
        vec![(5000, Value::Int(1)), (5001, Value::Int(0))],
        vec![VarRecord::new("t1", Type::Int, 7000)],
    );
    assert_eq!(Machine::new(&p).run().unwrap_err(), Error::DivisionByZero);
}

#[test]
fn string_constants_print_verbatim_and_bools_spell_out() {
    let p = program(
        vec![
            quad(Opcode::Print, 8500, UNUSED, UNUSED),
            quad(Opcode::Neq, 5000, 5001, 8000),
            quad(Opcode::Print, 8000, UNUSED, UNUSED),
            quad(Opcode::Println, UNUSED, UNUSED, UNUSED),
        ],
        vec![],
        vec![],
        vec![
            (8500, Value::Str("ready:".into())),
            (5000, Value::Int(1)),
            (5001, Value::Int(2)),
        ],
        vec![VarRecord::new("t1", Type::Bool, 8000)],
    );
    assert_eq!(Machine::new(&p).run().unwrap(), "ready: true \n");
}
