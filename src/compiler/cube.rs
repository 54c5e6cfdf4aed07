//! # Semantic Cube
//!
//! The language's whole type discipline in one table: which operator
//! applied to which pair of operand types yields which result type. An
//! absent entry is a type mismatch. Arithmetic mixes `int` and `float` to
//! `float`; the relational operators yield `bool` (and `!=` also compares
//! two bools); assignment only pairs identical numeric types.

use crate::error::Error;
use crate::vm::{Opcode, Type};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref CUBE: HashMap<(Opcode, Type, Type), Type> = {
        use Opcode::*;
        use Type::*;
        let mut cube = HashMap::new();
        for op in [Plus, Minus, Times, Divide] {
            cube.insert((op, Int, Int), Int);
            cube.insert((op, Int, Float), Float);
            cube.insert((op, Float, Int), Float);
            cube.insert((op, Float, Float), Float);
        }
        for op in [Gt, Lt, Neq] {
            cube.insert((op, Int, Int), Bool);
            cube.insert((op, Int, Float), Bool);
            cube.insert((op, Float, Int), Bool);
            cube.insert((op, Float, Float), Bool);
        }
        cube.insert((Neq, Bool, Bool), Bool);
        cube.insert((Assign, Int, Int), Int);
        cube.insert((Assign, Float, Float), Float);
        cube
    };
}

/// Result type of `left op right`, or the `TypeMismatch` the cube
/// prescribes for the combination.
pub fn result_type(op: Opcode, left: Type, right: Type) -> Result<Type, Error> {
    CUBE.get(&(op, left, right))
        .copied()
        .ok_or(Error::TypeMismatch { op, left, right })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_widens_to_float() {
        assert_eq!(result_type(Opcode::Plus, Type::Int, Type::Int), Ok(Type::Int));
        assert_eq!(
            result_type(Opcode::Plus, Type::Int, Type::Float),
            Ok(Type::Float)
        );
        assert_eq!(
            result_type(Opcode::Divide, Type::Float, Type::Int),
            Ok(Type::Float)
        );
    }

    #[test]
    fn relational_operators_yield_bool() {
        assert_eq!(result_type(Opcode::Gt, Type::Int, Type::Float), Ok(Type::Bool));
        assert_eq!(result_type(Opcode::Lt, Type::Float, Type::Float), Ok(Type::Bool));
        assert_eq!(result_type(Opcode::Neq, Type::Bool, Type::Bool), Ok(Type::Bool));
    }

    #[test]
    fn booleans_have_no_arithmetic() {
        assert_eq!(
            result_type(Opcode::Plus, Type::Bool, Type::Int),
            Err(Error::TypeMismatch {
                op: Opcode::Plus,
                left: Type::Bool,
                right: Type::Int
            })
        );
    }

    #[test]
    fn assignment_requires_matching_numeric_types() {
        assert_eq!(result_type(Opcode::Assign, Type::Int, Type::Int), Ok(Type::Int));
        assert!(result_type(Opcode::Assign, Type::Int, Type::Float).is_err());
        assert!(result_type(Opcode::Assign, Type::Float, Type::Int).is_err());
        assert!(result_type(Opcode::Assign, Type::Int, Type::Bool).is_err());
    }
}
