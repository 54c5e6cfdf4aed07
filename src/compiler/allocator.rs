//! # Address Allocator
//!
//! Hands out monotonically increasing virtual addresses from the typed
//! pools defined by the memory layout. Local and temporary pools rewind
//! after every function so the next body starts at the pool floor; the
//! operator region is a fixed numbering and is never allocated from.

use crate::error::Error;
use crate::vm::{
    AddrRange, Type, CONST_FLOAT, CONST_INT, CONST_STR, GLOBAL_FLOAT, GLOBAL_INT, LOCAL_FLOAT,
    LOCAL_INT, TEMP_BOOL, TEMP_FLOAT, TEMP_INT,
};

/// One pool's bump counter.
#[derive(Clone, Copy, Debug)]
struct Pool {
    range: AddrRange,
    next: i32,
}

impl Pool {
    fn new(range: AddrRange) -> Self {
        Self {
            range,
            next: range.start,
        }
    }

    fn take(&mut self) -> Option<i32> {
        if self.next > self.range.end {
            return None;
        }
        let addr = self.next;
        self.next += 1;
        Some(addr)
    }

    fn reset(&mut self) {
        self.next = self.range.start;
    }
}

/// The allocator for every typed pool of the address space.
#[derive(Debug)]
pub struct Allocator {
    global_int: Pool,
    global_float: Pool,
    local_int: Pool,
    local_float: Pool,
    const_int: Pool,
    const_float: Pool,
    const_str: Pool,
    temp_int: Pool,
    temp_float: Pool,
    temp_bool: Pool,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator {
    pub fn new() -> Self {
        Self {
            global_int: Pool::new(GLOBAL_INT),
            global_float: Pool::new(GLOBAL_FLOAT),
            local_int: Pool::new(LOCAL_INT),
            local_float: Pool::new(LOCAL_FLOAT),
            const_int: Pool::new(CONST_INT),
            const_float: Pool::new(CONST_FLOAT),
            const_str: Pool::new(CONST_STR),
            temp_int: Pool::new(TEMP_INT),
            temp_float: Pool::new(TEMP_FLOAT),
            temp_bool: Pool::new(TEMP_BOOL),
        }
    }

    pub fn next_global(&mut self, ty: Type) -> Result<i32, Error> {
        let pool = match ty {
            Type::Int => &mut self.global_int,
            Type::Float => &mut self.global_float,
            other => unreachable!("no global pool for type {}", other),
        };
        pool.take().ok_or(Error::OutOfAddressSpace { pool: "global", ty })
    }

    pub fn next_local(&mut self, ty: Type) -> Result<i32, Error> {
        let pool = match ty {
            Type::Int => &mut self.local_int,
            Type::Float => &mut self.local_float,
            other => unreachable!("no local pool for type {}", other),
        };
        pool.take().ok_or(Error::OutOfAddressSpace { pool: "local", ty })
    }

    pub fn next_const(&mut self, ty: Type) -> Result<i32, Error> {
        let pool = match ty {
            Type::Int => &mut self.const_int,
            Type::Float => &mut self.const_float,
            Type::Str => &mut self.const_str,
            other => unreachable!("no constant pool for type {}", other),
        };
        pool.take()
            .ok_or(Error::OutOfAddressSpace { pool: "constant", ty })
    }

    pub fn next_temp(&mut self, ty: Type) -> Result<i32, Error> {
        let pool = match ty {
            Type::Int => &mut self.temp_int,
            Type::Float => &mut self.temp_float,
            Type::Bool => &mut self.temp_bool,
            other => unreachable!("no temporary pool for type {}", other),
        };
        pool.take()
            .ok_or(Error::OutOfAddressSpace { pool: "temporary", ty })
    }

    /// Rewind the local pools so the next function's locals start at the
    /// pool floor. Addresses collide across functions on purpose; each
    /// activation owns its own cells.
    pub fn reset_local(&mut self) {
        self.local_int.reset();
        self.local_float.reset();
    }

    pub fn reset_temp(&mut self) {
        self.temp_int.reset();
        self.temp_float.reset();
        self.temp_bool.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_sequential_per_pool() {
        let mut alloc = Allocator::new();
        assert_eq!(alloc.next_global(Type::Int).unwrap(), 1000);
        assert_eq!(alloc.next_global(Type::Int).unwrap(), 1001);
        assert_eq!(alloc.next_global(Type::Float).unwrap(), 2000);
        assert_eq!(alloc.next_local(Type::Int).unwrap(), 3000);
        assert_eq!(alloc.next_const(Type::Float).unwrap(), 6000);
        assert_eq!(alloc.next_temp(Type::Bool).unwrap(), 8000);
    }

    #[test]
    fn reset_rewinds_local_and_temp_pools() {
        let mut alloc = Allocator::new();
        alloc.next_local(Type::Int).unwrap();
        alloc.next_local(Type::Int).unwrap();
        alloc.next_temp(Type::Float).unwrap();
        alloc.reset_local();
        alloc.reset_temp();
        assert_eq!(alloc.next_local(Type::Int).unwrap(), 3000);
        assert_eq!(alloc.next_temp(Type::Float).unwrap(), 7500);
    }

    #[test]
    fn exhausted_pools_report_out_of_address_space() {
        let mut alloc = Allocator::new();
        for _ in 0..500 {
            alloc.next_temp(Type::Int).unwrap();
        }
        assert_eq!(
            alloc.next_temp(Type::Int),
            Err(Error::OutOfAddressSpace {
                pool: "temporary",
                ty: Type::Int
            })
        );
    }
}
