//! Turns a program image into a contiguous list of instructions and
//! pseudo-ops.

use std::convert::TryFrom;

use log::*;
use thiserror::Error;

use crate::instruction::{decode, DecodeError, Instruction, Mnemonic};
use crate::memory::{Memory, Word};
use crate::symbol::{Symbol, SymbolKind, SymbolTable};

pub mod formatter;

pub use formatter::Listing;

/// Why a region of the program can't be disassembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformation {
    #[error("there is no opcode")]
    MissingOpcode,
    #[error("a non-unary instruction does not contain an operand specifier")]
    MissingOperand,
    #[error("the string is not terminated by a zero byte")]
    UnterminatedAscii,
    #[error("the block is longer than the rest of the program")]
    BlockOverrun,
    #[error("the word needs two bytes but only one is left")]
    TruncatedWord,
    #[error("the block is empty")]
    EmptyBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisassemblyError {
    #[error("the program is malformed at 0x{address:04X}: {malformation}")]
    MalformedProgram {
        address: Word,
        malformation: Malformation,
    },
    #[error("the program does not contain a STOP instruction")]
    MissingTerminator,
}

impl From<DecodeError> for DisassemblyError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::MissingOpcode { address } => DisassemblyError::MalformedProgram {
                address,
                malformation: Malformation::MissingOpcode,
            },
            DecodeError::MissingOperand { address } => DisassemblyError::MalformedProgram {
                address,
                malformation: Malformation::MissingOperand,
            },
        }
    }
}

type Result<T, E = DisassemblyError> = std::result::Result<T, E>;

/// Disassembles the whole of `memory`.
///
/// At every position the first symbol declared there decides what follows:
/// `ASCII`, `BLOCK` and `WORD` symbols produce a pseudo-op spanning their
/// region, a `LINE` symbol labels the decoded instruction. Everything else is
/// decoded as an instruction.
///
/// # Errors
///
/// Fails on the first region that runs past the end of memory.
pub fn build<'s>(memory: &Memory, symbols: &'s SymbolTable) -> Result<Vec<Instruction<'s>>> {
    let mut instructions = Vec::new();
    let mut cursor = 0;

    while cursor < memory.len() {
        let instruction = match symbols.lookup(cursor) {
            Some(symbol) => symbol_instruction(memory, cursor, symbol)?,
            None => decode(cursor as Word, |offset| memory.get(cursor + offset))?,
        };

        debug!("0x{:04X}: {}", instruction.address, instruction);

        cursor = instruction.end();
        instructions.push(instruction);
    }

    info!(
        "Disassembled {} instructions from {} bytes",
        instructions.len(),
        memory.len()
    );

    Ok(instructions)
}

/// Checks that the program can stop on its own.
pub fn validate(instructions: &[Instruction<'_>]) -> Result<()> {
    if instructions
        .iter()
        .any(|instruction| instruction.mnemonic == Mnemonic::STOP)
    {
        Ok(())
    } else {
        Err(DisassemblyError::MissingTerminator)
    }
}

/// Builds the record for a position that has `symbol` declared at it
fn symbol_instruction<'s>(
    memory: &Memory,
    cursor: usize,
    symbol: &'s Symbol,
) -> Result<Instruction<'s>> {
    let address = cursor as Word;
    let remaining = memory.len() - cursor;
    let malformed = |malformation| DisassemblyError::MalformedProgram {
        address,
        malformation,
    };

    let (mnemonic, size, operand) = match symbol.kind {
        SymbolKind::Line => {
            let mut instruction: Instruction<'s> =
                decode(address, |offset| memory.get(cursor + offset))?;
            instruction.symbol = Some(symbol);
            return Ok(instruction);
        }
        SymbolKind::Ascii => {
            let terminator = memory
                .bytes(cursor, remaining)
                .iter()
                .position(|&byte| byte == 0)
                .ok_or_else(|| malformed(Malformation::UnterminatedAscii))?;
            (Mnemonic::ASCII, terminator + 1, None)
        }
        SymbolKind::Block => {
            if symbol.block_length == 0 {
                return Err(malformed(Malformation::EmptyBlock));
            }
            if symbol.block_length > remaining {
                return Err(malformed(Malformation::BlockOverrun));
            }
            (Mnemonic::BLOCK, symbol.block_length, None)
        }
        SymbolKind::Word => match memory.bytes(cursor, 2) {
            &[high, low] => (Mnemonic::WORD, 2, Some(Word::from_be_bytes([high, low]))),
            _ => return Err(malformed(Malformation::TruncatedWord)),
        },
    };

    let ascii_byte_count = if mnemonic == Mnemonic::ASCII {
        u16::try_from(size).unwrap_or(u16::MAX)
    } else {
        0
    };

    Ok(Instruction {
        address,
        opcode: memory.get(cursor).unwrap_or_default(),
        mnemonic,
        register: None,
        addressing_mode: None,
        operand,
        is_unary: false,
        ascii_byte_count,
        uses_single_digit_addressing: false,
        symbol: Some(symbol),
        size,
    })
}
