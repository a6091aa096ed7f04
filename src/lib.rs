//! Disassembler and interpreter for Pep/8 object code.

#[macro_use]
pub mod memory;

pub mod disassembler;
pub mod instruction;
pub mod processor;
pub mod symbol;
pub mod trace;
