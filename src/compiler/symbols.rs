//! # Symbol and Function Directories
//!
//! Name resolution state for the compiler. A [`SymbolTable`] holds the
//! variable bindings of one scope; the [`FunctionDirectory`] holds every
//! declared function keyed by name, in declaration order so the emitted
//! program lists them deterministically. Scoping is flat: a lookup walks
//! the current function's table and then the globals, nothing else.

use crate::error::Error;
use crate::vm::{FunctionRecord, VarRecord};
use std::collections::HashMap;

/// The variable bindings of a single scope.
#[derive(Debug, Default)]
pub struct SymbolTable {
    records: Vec<VarRecord>,
    by_name: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding; a second binding of the same name in one scope
    /// is a `DuplicateVariable` error.
    pub fn insert(&mut self, record: VarRecord) -> Result<(), Error> {
        if self.by_name.contains_key(&record.name) {
            return Err(Error::DuplicateVariable(record.name));
        }
        self.by_name.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&VarRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[VarRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.by_name.clear();
    }
}

/// Every function the program declares, in declaration order.
#[derive(Debug, Default)]
pub struct FunctionDirectory {
    functions: Vec<FunctionRecord>,
    by_name: HashMap<String, usize>,
}

impl FunctionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new function record. The record must be complete enough
    /// for call sites (name, params, `quad_start`) before its body is
    /// generated, so that recursive calls resolve.
    pub fn declare(&mut self, record: FunctionRecord) -> Result<(), Error> {
        if self.by_name.contains_key(&record.name) {
            return Err(Error::DuplicateFunction(record.name));
        }
        self.by_name.insert(record.name.clone(), self.functions.len());
        self.functions.push(record);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&FunctionRecord, Error> {
        self.by_name
            .get(name)
            .map(|&i| &self.functions[i])
            .ok_or_else(|| Error::UndeclaredFunction(name.to_string()))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Result<&mut FunctionRecord, Error> {
        match self.by_name.get(name) {
            Some(&i) => Ok(&mut self.functions[i]),
            None => Err(Error::UndeclaredFunction(name.to_string())),
        }
    }

    pub fn into_functions(self) -> Vec<FunctionRecord> {
        self.functions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::Type;

    #[test]
    fn duplicate_bindings_are_rejected() {
        let mut table = SymbolTable::new();
        table.insert(VarRecord::new("x", Type::Int, 1000)).unwrap();
        assert_eq!(
            table.insert(VarRecord::new("x", Type::Float, 2000)),
            Err(Error::DuplicateVariable("x".into()))
        );
        assert_eq!(table.get("x").unwrap().address, 1000);
    }

    #[test]
    fn duplicate_functions_are_rejected() {
        let mut dir = FunctionDirectory::new();
        let record = FunctionRecord {
            name: "f".into(),
            params: vec![],
            locals: vec![],
            temps: vec![],
            quad_start: 1,
        };
        dir.declare(record.clone()).unwrap();
        assert_eq!(dir.declare(record), Err(Error::DuplicateFunction("f".into())));
    }

    #[test]
    fn unknown_functions_are_reported() {
        let dir = FunctionDirectory::new();
        assert!(matches!(
            dir.lookup("nope"),
            Err(Error::UndeclaredFunction(_))
        ));
    }
}
