//! The listing printed for a disassembled program:
//!
//! ```text
//! --------------------------------------
//! Addr  Code   Symbol  Mnemonic  Operand
//! --------------------------------------
//! 0000  C00005 main:   LDA       0x0005,i
//! 0003  00             STOP
//! ```

use std::fmt::{self, Write as _};

use crate::instruction::{Instruction, Mnemonic};
use crate::memory::{Byte, Memory};
use crate::symbol::SymbolTable;

pub const RULE: &str = "--------------------------------------";
pub const HEADER: &str = "Addr  Code   Symbol  Mnemonic  Operand";

/// Bytes shown per row of the code column
const BYTES_PER_ROW: usize = 3;
/// Indent of the rows that continue a long pseudo-op
const CONTINUATION: &str = "      ";

fn hex(bytes: &[Byte]) -> String {
    bytes.iter().map(|byte| format!("{:02X}", byte)).collect()
}

/// Writes `bytes` as text, escaping everything that isn't printable
fn escape(out: &mut String, bytes: &[Byte]) -> fmt::Result {
    for &byte in bytes {
        if byte == b' ' || byte.is_ascii_graphic() {
            out.push(byte as char);
        } else {
            write!(out, "\\x{:02X}", byte)?;
        }
    }

    Ok(())
}

pub struct Listing<'a> {
    instructions: &'a [Instruction<'a>],
    memory: &'a Memory,
    symbols: &'a SymbolTable,
}

impl<'a> Listing<'a> {
    pub fn new(
        instructions: &'a [Instruction<'a>],
        memory: &'a Memory,
        symbols: &'a SymbolTable,
    ) -> Self {
        Self {
            instructions,
            memory,
            symbols,
        }
    }

    /// The bytes shown in the code column. Blocks show as zeros.
    fn code_bytes(&self, instruction: &Instruction<'_>) -> Vec<Byte> {
        let address = instruction.address as usize;

        match instruction.mnemonic {
            Mnemonic::BLOCK => vec![0; instruction.size],
            _ if instruction.mnemonic.is_pseudo_op() => {
                self.memory.bytes(address, instruction.size).to_vec()
            }
            _ => {
                let mut bytes = vec![instruction.opcode];
                if let Some(operand) = instruction.operand {
                    bytes.extend_from_slice(&operand.to_be_bytes());
                }
                bytes
            }
        }
    }

    fn write_operand(&self, row: &mut String, instruction: &Instruction<'_>) -> fmt::Result {
        let address = instruction.address as usize;

        match instruction.mnemonic {
            Mnemonic::ASCII => {
                let len = (instruction.ascii_byte_count as usize).saturating_sub(1);
                row.push('"');
                escape(row, self.memory.bytes(address, len))?;
                row.push_str("\\x00\"");
            }
            Mnemonic::BLOCK => write!(row, "{}", instruction.size)?,
            Mnemonic::WORD => write!(row, "0x{:04X}", instruction.operand.unwrap_or_default())?,
            _ => {
                let operand = match instruction.operand {
                    Some(operand) => operand,
                    None => return Ok(()),
                };

                match self.symbols.lookup(operand as usize) {
                    Some(symbol) => row.push_str(&symbol.label),
                    None => write!(row, "0x{:04X}", operand)?,
                }
                if let Some(mode) = instruction.addressing_mode {
                    write!(row, ",{}", mode.suffix())?;
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "{}", RULE)?;

        for instruction in self.instructions {
            let bytes = self.code_bytes(instruction);
            let mut rows = bytes.chunks(BYTES_PER_ROW);
            let code = rows.next().map(hex).unwrap_or_default();
            let label = instruction
                .symbol
                .map(|symbol| format!("{}:", symbol.label))
                .unwrap_or_default();

            let mut row = format!(
                "{:04X}  {:<7}{:<8}{:<10}",
                instruction.address, code, label, instruction.mnemonic
            );
            self.write_operand(&mut row, instruction)?;
            writeln!(f, "{}", row.trim_end())?;

            for chunk in rows {
                writeln!(f, "{}{}", CONTINUATION, hex(chunk))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::build;
    use color_eyre::eyre::Result;

    #[test]
    fn test_listing() -> Result<()> {
        let mem = memory![
            0xC1, 0x00, 0x0A, // LDA num,d
            0x04, 0x00, 0x0C, // BR done,i
            0x48, 0x69, 0x21, 0x00, // "Hi!"
            0x00, 0x2A, // 42
            0x00, // STOP
            0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let symbols: SymbolTable = "num word 10\ndone line 12\nmsg ascii 6\nbuf block 13 5"
            .parse()
            .unwrap();
        let instructions = build(&mem, &symbols)?;

        let expected = [
            RULE,
            HEADER,
            RULE,
            "0000  C1000A         LDA       num,d",
            "0003  04000C         BR        done,i",
            "0006  486921 msg:    .ASCII    \"Hi!\\x00\"",
            "      00",
            "000A  002A   num:    .WORD     0x002A",
            "000C  00     done:   STOP",
            "000D  000000 buf:    .BLOCK    5",
            "      0000",
            "",
        ]
        .join("\n");

        assert_eq!(Listing::new(&instructions, &mem, &symbols).to_string(), expected);

        Ok(())
    }

    #[test]
    fn test_unprintable_ascii_is_escaped() -> Result<()> {
        let mem = memory![0x41, 0x0A, 0x00];
        let symbols: SymbolTable = "line ascii 0".parse().unwrap();
        let instructions = build(&mem, &symbols)?;

        let listing = Listing::new(&instructions, &mem, &symbols).to_string();
        let row = listing.lines().nth(3).unwrap();
        assert_eq!(row, "0000  410A00 line:   .ASCII    \"A\\x0A\\x00\"");

        Ok(())
    }

    #[test]
    fn test_general_mode_suffixes() -> Result<()> {
        // ADDA 0x0102,sxf  CHARO 0x0000,s  NOTX
        let mem = memory![0x77, 0x01, 0x02, 0x53, 0x00, 0x00, 0x19];
        let symbols = SymbolTable::default();
        let instructions = build(&mem, &symbols)?;

        let listing = Listing::new(&instructions, &mem, &symbols).to_string();
        let rows: Vec<&str> = listing.lines().skip(3).collect();
        assert_eq!(
            rows,
            vec![
                "0000  770102         ADDA      0x0102,sxf",
                "0003  530000         CHARO     0x0000,s",
                "0006  19             NOTX",
            ]
        );

        Ok(())
    }
}
