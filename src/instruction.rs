//! Opcode classification and decoding.
//!
//! The disassembler and the interpreter both decode through [`decode`], which
//! only needs a way to pull bytes relative to the start of the instruction.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

use crate::memory::{Byte, Word};
use crate::symbol::Symbol;

macro_rules! mnemonics {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal => $text:literal , )+ ) => {
        /// Every mnemonic of the instruction set, followed by the pseudo-ops
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Mnemonic {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Mnemonic {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => $text , )+
                }
            }
        }

        impl ::std::fmt::Display for Mnemonic {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.pad(self.name())
            }
        }
    }
}

mnemonics! {
    /// Stop execution
    STOP = 0 => "STOP",
    /// Return from trap
    RETTR = 1 => "RETTR",
    /// Move stack pointer to A
    MOVSPA = 2 => "MOVSPA",
    /// Move NZVC flags to A
    MOVFLGA = 3 => "MOVFLGA",
    /// Branch unconditionally
    BR = 4 => "BR",
    /// Branch if less than or equal to
    BRLE = 5 => "BRLE",
    /// Branch if less than
    BRLT = 6 => "BRLT",
    /// Branch if equal to
    BREQ = 7 => "BREQ",
    /// Branch if not equal to
    BRNE = 8 => "BRNE",
    /// Branch if greater than or equal to
    BRGE = 9 => "BRGE",
    /// Branch if greater than
    BRGT = 10 => "BRGT",
    /// Branch if V
    BRV = 11 => "BRV",
    /// Branch if C
    BRC = 12 => "BRC",
    /// Call subroutine
    CALL = 13 => "CALL",
    /// Bitwise invert A
    NOTA = 14 => "NOTA",
    /// Bitwise invert X
    NOTX = 15 => "NOTX",
    /// Negate A
    NEGA = 16 => "NEGA",
    /// Negate X
    NEGX = 17 => "NEGX",
    /// Arithmetic shift left A
    ASLA = 18 => "ASLA",
    /// Arithmetic shift left X
    ASLX = 19 => "ASLX",
    /// Arithmetic shift right A
    ASRA = 20 => "ASRA",
    /// Arithmetic shift right X
    ASRX = 21 => "ASRX",
    /// Rotate left A
    ROLA = 22 => "ROLA",
    /// Rotate left X
    ROLX = 23 => "ROLX",
    /// Rotate right A
    RORA = 24 => "RORA",
    /// Rotate right X
    RORX = 25 => "RORX",
    /// Unary no operation trap 0
    NOP0 = 26 => "NOP0",
    /// Unary no operation trap 1
    NOP1 = 27 => "NOP1",
    /// Unary no operation trap 2
    NOP2 = 28 => "NOP2",
    /// Unary no operation trap 3
    NOP3 = 29 => "NOP3",
    /// Non-unary no operation trap
    NOP = 30 => "NOP",
    /// Decimal input trap
    DECI = 31 => "DECI",
    /// Decimal output trap
    DECO = 32 => "DECO",
    /// String output trap
    STRO = 33 => "STRO",
    /// Character input
    CHARI = 34 => "CHARI",
    /// Character output
    CHARO = 35 => "CHARO",
    /// Return from call with 0 local bytes
    RET0 = 36 => "RET0",
    /// Return from call with 1 local byte
    RET1 = 37 => "RET1",
    /// Return from call with 2 local bytes
    RET2 = 38 => "RET2",
    /// Return from call with 3 local bytes
    RET3 = 39 => "RET3",
    /// Return from call with 4 local bytes
    RET4 = 40 => "RET4",
    /// Return from call with 5 local bytes
    RET5 = 41 => "RET5",
    /// Return from call with 6 local bytes
    RET6 = 42 => "RET6",
    /// Return from call with 7 local bytes
    RET7 = 43 => "RET7",
    /// Add to stack pointer
    ADDSP = 44 => "ADDSP",
    /// Subtract from stack pointer
    SUBSP = 45 => "SUBSP",
    /// Add to A
    ADDA = 46 => "ADDA",
    /// Add to X
    ADDX = 47 => "ADDX",
    /// Subtract from A
    SUBA = 48 => "SUBA",
    /// Subtract from X
    SUBX = 49 => "SUBX",
    /// Bitwise AND to A
    ANDA = 50 => "ANDA",
    /// Bitwise AND to X
    ANDX = 51 => "ANDX",
    /// Bitwise OR to A
    ORA = 52 => "ORA",
    /// Bitwise OR to X
    ORX = 53 => "ORX",
    /// Compare A
    CPA = 54 => "CPA",
    /// Compare X
    CPX = 55 => "CPX",
    /// Load A from memory
    LDA = 56 => "LDA",
    /// Load X from memory
    LDX = 57 => "LDX",
    /// Load byte into the low half of A
    LDBYTEA = 58 => "LDBYTEA",
    /// Load byte into the low half of X
    LDBYTEX = 59 => "LDBYTEX",
    /// Store A to memory
    STA = 60 => "STA",
    /// Store X to memory
    STX = 61 => "STX",
    /// Store the low half of A to memory
    STBYTEA = 62 => "STBYTEA",
    /// Store the low half of X to memory
    STBYTEX = 63 => "STBYTEX",
    /// Zero terminated string
    ASCII = 64 => ".ASCII",
    /// Reserved, zero filled bytes
    BLOCK = 65 => ".BLOCK",
    /// Raw big endian word
    WORD = 66 => ".WORD",
}

impl Mnemonic {
    /// Whether this mnemonic names a symbol declared data region
    pub fn is_pseudo_op(&self) -> bool {
        matches!(self, Mnemonic::ASCII | Mnemonic::BLOCK | Mnemonic::WORD)
    }
}

/// The instruction families the opcode space is partitioned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Unary,
    BranchCall,
    Trap,
    CharIo,
    StackPointer,
    ArithmeticLogic,
    LoadStore,
}

/// Maps an opcode byte to its family. Every byte belongs to exactly one.
pub fn classify(opcode: Byte) -> Family {
    match opcode {
        0x00..=0x03 | 0x18..=0x27 | 0x58..=0x5F => Family::Unary,
        0x04..=0x17 => Family::BranchCall,
        0x28..=0x47 => Family::Trap,
        0x48..=0x57 => Family::CharIo,
        0x60..=0x6F => Family::StackPointer,
        0x70..=0xBF => Family::ArithmeticLogic,
        0xC0..=0xFF => Family::LoadStore,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// A
    Accumulator,
    /// X
    Index,
}

impl Register {
    /// Bit 0 of `field` selects the register
    fn from_bit(field: Byte) -> Self {
        if field & 0x01 == 0 {
            Register::Accumulator
        } else {
            Register::Index
        }
    }

    fn pick(self, [a, x]: [Mnemonic; 2]) -> Mnemonic {
        match self {
            Register::Accumulator => a,
            Register::Index => x,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(IntoPrimitive)]
pub enum AddressingMode {
    Immediate = 0,
    Direct = 1,
    Indirect = 2,
    StackRelative = 3,
    StackRelativeDeferred = 4,
    Indexed = 5,
    StackIndexed = 6,
    StackIndexedDeferred = 7,
}

impl AddressingMode {
    /// Reads the general `aaa` field in the low three bits. All eight values
    /// are modes.
    fn general(opcode: Byte) -> Self {
        match opcode & 0x07 {
            0 => AddressingMode::Immediate,
            1 => AddressingMode::Direct,
            2 => AddressingMode::Indirect,
            3 => AddressingMode::StackRelative,
            4 => AddressingMode::StackRelativeDeferred,
            5 => AddressingMode::Indexed,
            6 => AddressingMode::StackIndexed,
            _ => AddressingMode::StackIndexedDeferred,
        }
    }

    /// Reads the reduced `a` field of branches and calls
    fn reduced(opcode: Byte) -> Self {
        if opcode & 0x01 == 0 {
            AddressingMode::Immediate
        } else {
            AddressingMode::Indexed
        }
    }

    /// The suffix used in listings, `i` in `LDA 0x0005,i`
    pub fn suffix(&self) -> &'static str {
        match self {
            AddressingMode::Immediate => "i",
            AddressingMode::Direct => "d",
            AddressingMode::Indirect => "n",
            AddressingMode::StackRelative => "s",
            AddressingMode::StackRelativeDeferred => "sf",
            AddressingMode::Indexed => "x",
            AddressingMode::StackIndexed => "sx",
            AddressingMode::StackIndexedDeferred => "sxf",
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressingMode::Immediate => "Immediate",
            AddressingMode::Direct => "Direct",
            AddressingMode::Indirect => "Indirect",
            AddressingMode::StackRelative => "Stack-relative",
            AddressingMode::StackRelativeDeferred => "Stack-relative deferred",
            AddressingMode::Indexed => "Indexed",
            AddressingMode::StackIndexed => "Stack-indexed",
            AddressingMode::StackIndexedDeferred => "Stack-indexed deferred",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("there is no opcode at 0x{address:04X}")]
    MissingOpcode { address: Word },
    #[error("the non-unary instruction at 0x{address:04X} does not contain an operand specifier")]
    MissingOperand { address: Word },
}

/// One decoded instruction or pseudo-op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'s> {
    /// Address of the first byte
    pub address: Word,
    /// The instruction specifier, or the first byte of a pseudo-op
    pub opcode: Byte,
    pub mnemonic: Mnemonic,
    /// The `r` field, for instructions that have one
    pub register: Option<Register>,
    /// The `a`/`aaa` field, for instructions that have one
    pub addressing_mode: Option<AddressingMode>,
    /// The operand specifier. For a `.WORD` this is the word itself.
    pub operand: Option<Word>,
    pub is_unary: bool,
    /// Bytes of an `.ASCII` run, including its terminating zero
    pub ascii_byte_count: u16,
    /// Set for branches and calls, whose mode field is a single `i`/`x` bit
    pub uses_single_digit_addressing: bool,
    /// The symbol declared at this address
    pub symbol: Option<&'s Symbol>,
    /// Number of bytes this record spans
    pub size: usize,
}

impl<'s> Instruction<'s> {
    /// Address one past the last byte of this instruction
    pub fn end(&self) -> usize {
        self.address as usize + self.size
    }
}

impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        if let (Some(operand), false) = (self.operand, self.mnemonic.is_pseudo_op()) {
            write!(f, " 0x{:04X}", operand)?;
            if let Some(mode) = self.addressing_mode {
                write!(f, ",{}", mode.suffix())?;
            }
        }

        Ok(())
    }
}

const RETURNS: [Mnemonic; 8] = [
    Mnemonic::RET0,
    Mnemonic::RET1,
    Mnemonic::RET2,
    Mnemonic::RET3,
    Mnemonic::RET4,
    Mnemonic::RET5,
    Mnemonic::RET6,
    Mnemonic::RET7,
];

const REGISTER_UNARY: [[Mnemonic; 2]; 6] = [
    [Mnemonic::NOTA, Mnemonic::NOTX],
    [Mnemonic::NEGA, Mnemonic::NEGX],
    [Mnemonic::ASLA, Mnemonic::ASLX],
    [Mnemonic::ASRA, Mnemonic::ASRX],
    [Mnemonic::ROLA, Mnemonic::ROLX],
    [Mnemonic::RORA, Mnemonic::RORX],
];

const UNARY_NOPS: [Mnemonic; 4] = [Mnemonic::NOP0, Mnemonic::NOP1, Mnemonic::NOP2, Mnemonic::NOP3];

const BRANCHES: [Mnemonic; 10] = [
    Mnemonic::BR,
    Mnemonic::BRLE,
    Mnemonic::BRLT,
    Mnemonic::BREQ,
    Mnemonic::BRNE,
    Mnemonic::BRGE,
    Mnemonic::BRGT,
    Mnemonic::BRV,
    Mnemonic::BRC,
    Mnemonic::CALL,
];

const TRAPS: [Mnemonic; 4] = [Mnemonic::NOP, Mnemonic::DECI, Mnemonic::DECO, Mnemonic::STRO];

const ARITHMETIC: [[Mnemonic; 2]; 5] = [
    [Mnemonic::ADDA, Mnemonic::ADDX],
    [Mnemonic::SUBA, Mnemonic::SUBX],
    [Mnemonic::ANDA, Mnemonic::ANDX],
    [Mnemonic::ORA, Mnemonic::ORX],
    [Mnemonic::CPA, Mnemonic::CPX],
];

const LOAD_STORE: [[Mnemonic; 2]; 4] = [
    [Mnemonic::LDA, Mnemonic::LDX],
    [Mnemonic::LDBYTEA, Mnemonic::LDBYTEX],
    [Mnemonic::STA, Mnemonic::STX],
    [Mnemonic::STBYTEA, Mnemonic::STBYTEX],
];

/// Selects the unary mnemonic and, for the register operations, the register.
/// `opcode` must belong to [`Family::Unary`].
fn decode_unary(opcode: Byte) -> (Mnemonic, Option<Register>) {
    use Mnemonic::*;

    match opcode {
        0x00 => (STOP, None),
        0x01 => (RETTR, None),
        0x02 => (MOVSPA, None),
        0x03 => (MOVFLGA, None),
        _ if opcode & 0xF8 == 0x58 => (RETURNS[(opcode & 0x07) as usize], None),
        _ if opcode & 0xFC == 0x24 => (UNARY_NOPS[(opcode & 0x03) as usize], None),
        // 0x18..=0x23
        _ => {
            let register = Register::from_bit(opcode);
            let pair = REGISTER_UNARY[(opcode - 0x18) as usize >> 1];
            (register.pick(pair), Some(register))
        }
    }
}

/// Decodes the instruction at `address`. `fetch` returns the byte at the
/// given offset from the start of the instruction, or `None` past the end of
/// the available bytes.
///
/// # Errors
///
/// Non-unary instructions need two operand bytes after the opcode; if
/// `fetch` can't supply them this fails with [`DecodeError::MissingOperand`].
pub fn decode<F>(address: Word, mut fetch: F) -> Result<Instruction<'static>, DecodeError>
where
    F: FnMut(usize) -> Option<Byte>,
{
    let opcode = fetch(0).ok_or(DecodeError::MissingOpcode { address })?;
    let family = classify(opcode);

    let (mnemonic, register, mode) = match family {
        Family::Unary => {
            let (mnemonic, register) = decode_unary(opcode);

            return Ok(Instruction {
                address,
                opcode,
                mnemonic,
                register,
                addressing_mode: None,
                operand: None,
                is_unary: true,
                ascii_byte_count: 0,
                uses_single_digit_addressing: false,
                symbol: None,
                size: 1,
            });
        }
        Family::BranchCall => {
            let mnemonic = BRANCHES[((opcode & 0xFE) - 0x04) as usize >> 1];
            (mnemonic, None, AddressingMode::reduced(opcode))
        }
        Family::Trap => {
            let mnemonic = TRAPS[((opcode & 0xF8) - 0x28) as usize >> 3];
            (mnemonic, None, AddressingMode::general(opcode))
        }
        Family::CharIo => {
            let mnemonic = if opcode & 0xF0 == 0x40 {
                Mnemonic::CHARI
            } else {
                Mnemonic::CHARO
            };
            (mnemonic, None, AddressingMode::general(opcode))
        }
        Family::StackPointer => {
            let mnemonic = if opcode & 0xF8 == 0x60 {
                Mnemonic::ADDSP
            } else {
                Mnemonic::SUBSP
            };
            (mnemonic, None, AddressingMode::general(opcode))
        }
        Family::ArithmeticLogic => {
            let register = Register::from_bit(opcode >> 3);
            let pair = ARITHMETIC[((opcode & 0xF0) - 0x70) as usize >> 4];
            (
                register.pick(pair),
                Some(register),
                AddressingMode::general(opcode),
            )
        }
        Family::LoadStore => {
            let register = Register::from_bit(opcode >> 3);
            let pair = LOAD_STORE[((opcode & 0xF0) - 0xC0) as usize >> 4];
            (
                register.pick(pair),
                Some(register),
                AddressingMode::general(opcode),
            )
        }
    };

    let operand = match (fetch(1), fetch(2)) {
        (Some(high), Some(low)) => Word::from_be_bytes([high, low]),
        _ => return Err(DecodeError::MissingOperand { address }),
    };

    Ok(Instruction {
        address,
        opcode,
        mnemonic,
        register,
        addressing_mode: Some(mode),
        operand: Some(operand),
        is_unary: false,
        ascii_byte_count: 0,
        uses_single_digit_addressing: family == Family::BranchCall,
        symbol: None,
        size: 3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;
    use std::convert::TryFrom;

    fn decode_bytes(bytes: &[Byte]) -> Result<Instruction<'static>, DecodeError> {
        decode(0, |offset| bytes.get(offset).copied())
    }

    /// The family table written out range by range
    fn expected_family(opcode: Byte) -> Family {
        const TABLE: &[(Byte, Byte, Family)] = &[
            (0x00, 0x03, Family::Unary),
            (0x04, 0x17, Family::BranchCall),
            (0x18, 0x27, Family::Unary),
            (0x28, 0x47, Family::Trap),
            (0x48, 0x57, Family::CharIo),
            (0x58, 0x5F, Family::Unary),
            (0x60, 0x6F, Family::StackPointer),
            (0x70, 0xBF, Family::ArithmeticLogic),
            (0xC0, 0xFF, Family::LoadStore),
        ];

        let matching: Vec<Family> = TABLE
            .iter()
            .filter(|(low, high, _)| (*low..=*high).contains(&opcode))
            .map(|(_, _, family)| *family)
            .collect();
        assert_eq!(matching.len(), 1, "opcode 0x{:02X}", opcode);
        matching[0]
    }

    #[test]
    fn test_classification_is_total_and_disjoint() {
        for opcode in 0..=Byte::MAX {
            assert_eq!(classify(opcode), expected_family(opcode), "opcode 0x{:02X}", opcode);
        }
    }

    #[test]
    fn test_every_opcode_decodes() {
        for opcode in 0..=Byte::MAX {
            let instruction = decode_bytes(&[opcode, 0x12, 0x34]).unwrap();
            assert_eq!(instruction.is_unary, classify(opcode) == Family::Unary);
            assert_eq!(instruction.size, if instruction.is_unary { 1 } else { 3 });
            assert!(!instruction.mnemonic.is_pseudo_op());
        }
    }

    #[test]
    fn test_mnemonic_table() {
        assert_eq!(Mnemonic::ALL.len(), 67);
        for (id, mnemonic) in Mnemonic::ALL.iter().enumerate() {
            assert_eq!(u8::from(*mnemonic) as usize, id);
            assert_eq!(Mnemonic::try_from(id as u8).unwrap(), *mnemonic);
        }
        assert_eq!(Mnemonic::WORD.name(), ".WORD");
        assert_eq!(format!("{:<6}|", Mnemonic::BR), "BR    |");
    }

    #[test]
    fn test_general_mode_covers_every_field_value() {
        for opcode in 0..=Byte::MAX {
            let mode = AddressingMode::general(opcode);
            assert_eq!(u8::from(mode), opcode & 0x07, "opcode 0x{:02X}", opcode);
        }
    }

    #[test]
    fn test_decode_unary() -> Result<()> {
        let cases = [
            (0x00, Mnemonic::STOP, None),
            (0x01, Mnemonic::RETTR, None),
            (0x02, Mnemonic::MOVSPA, None),
            (0x03, Mnemonic::MOVFLGA, None),
            (0x18, Mnemonic::NOTA, Some(Register::Accumulator)),
            (0x19, Mnemonic::NOTX, Some(Register::Index)),
            (0x1A, Mnemonic::NEGA, Some(Register::Accumulator)),
            (0x1B, Mnemonic::NEGX, Some(Register::Index)),
            (0x1C, Mnemonic::ASLA, Some(Register::Accumulator)),
            (0x1D, Mnemonic::ASLX, Some(Register::Index)),
            (0x1E, Mnemonic::ASRA, Some(Register::Accumulator)),
            (0x1F, Mnemonic::ASRX, Some(Register::Index)),
            (0x20, Mnemonic::ROLA, Some(Register::Accumulator)),
            (0x21, Mnemonic::ROLX, Some(Register::Index)),
            (0x22, Mnemonic::RORA, Some(Register::Accumulator)),
            (0x23, Mnemonic::RORX, Some(Register::Index)),
            (0x24, Mnemonic::NOP0, None),
            (0x27, Mnemonic::NOP3, None),
            (0x58, Mnemonic::RET0, None),
            (0x5D, Mnemonic::RET5, None),
            (0x5F, Mnemonic::RET7, None),
        ];

        for &(opcode, mnemonic, register) in cases.iter() {
            // a unary instruction never touches the bytes after it
            let instruction = decode_bytes(&[opcode])?;
            assert_eq!(instruction.mnemonic, mnemonic, "opcode 0x{:02X}", opcode);
            assert_eq!(instruction.register, register);
            assert_eq!(instruction.operand, None);
            assert_eq!(instruction.addressing_mode, None);
            assert!(instruction.is_unary);
        }

        Ok(())
    }

    #[test]
    fn test_decode_branch_uses_reduced_modes() -> Result<()> {
        let br = decode_bytes(&[0x04, 0x00, 0x10])?;
        assert_eq!(br.mnemonic, Mnemonic::BR);
        assert_eq!(br.addressing_mode, Some(AddressingMode::Immediate));
        assert!(br.uses_single_digit_addressing);

        let call = decode_bytes(&[0x17, 0x01, 0x00])?;
        assert_eq!(call.mnemonic, Mnemonic::CALL);
        assert_eq!(call.addressing_mode, Some(AddressingMode::Indexed));
        assert_eq!(call.operand, Some(0x0100));

        let expected = [
            (0x06, Mnemonic::BRLE),
            (0x08, Mnemonic::BRLT),
            (0x0A, Mnemonic::BREQ),
            (0x0C, Mnemonic::BRNE),
            (0x0E, Mnemonic::BRGE),
            (0x10, Mnemonic::BRGT),
            (0x12, Mnemonic::BRV),
            (0x14, Mnemonic::BRC),
        ];
        for &(opcode, mnemonic) in expected.iter() {
            assert_eq!(decode_bytes(&[opcode, 0, 0])?.mnemonic, mnemonic);
            assert_eq!(decode_bytes(&[opcode | 1, 0, 0])?.mnemonic, mnemonic);
        }

        Ok(())
    }

    #[test]
    fn test_decode_general_modes() -> Result<()> {
        let cases = [
            (0x28, Mnemonic::NOP, AddressingMode::Immediate, None),
            (0x31, Mnemonic::DECI, AddressingMode::Direct, None),
            (0x39, Mnemonic::DECO, AddressingMode::Direct, None),
            (0x42, Mnemonic::STRO, AddressingMode::Indirect, None),
            (0x48, Mnemonic::CHARI, AddressingMode::Immediate, None),
            (0x55, Mnemonic::CHARO, AddressingMode::Indexed, None),
            (0x63, Mnemonic::ADDSP, AddressingMode::StackRelative, None),
            (0x6C, Mnemonic::SUBSP, AddressingMode::StackRelativeDeferred, None),
            (0x70, Mnemonic::ADDA, AddressingMode::Immediate, Some(Register::Accumulator)),
            (0x79, Mnemonic::ADDX, AddressingMode::Direct, Some(Register::Index)),
            (0x86, Mnemonic::SUBA, AddressingMode::StackIndexed, Some(Register::Accumulator)),
            (0x9F, Mnemonic::ANDX, AddressingMode::StackIndexedDeferred, Some(Register::Index)),
            (0xA0, Mnemonic::ORA, AddressingMode::Immediate, Some(Register::Accumulator)),
            (0xB8, Mnemonic::CPX, AddressingMode::Immediate, Some(Register::Index)),
            (0xC0, Mnemonic::LDA, AddressingMode::Immediate, Some(Register::Accumulator)),
            (0xC9, Mnemonic::LDX, AddressingMode::Direct, Some(Register::Index)),
            (0xD0, Mnemonic::LDBYTEA, AddressingMode::Immediate, Some(Register::Accumulator)),
            (0xE1, Mnemonic::STA, AddressingMode::Direct, Some(Register::Accumulator)),
            (0xE9, Mnemonic::STX, AddressingMode::Direct, Some(Register::Index)),
            (0xF9, Mnemonic::STBYTEX, AddressingMode::Direct, Some(Register::Index)),
        ];

        for &(opcode, mnemonic, mode, register) in cases.iter() {
            let instruction = decode_bytes(&[opcode, 0xAB, 0xCD])?;
            assert_eq!(instruction.mnemonic, mnemonic, "opcode 0x{:02X}", opcode);
            assert_eq!(instruction.addressing_mode, Some(mode));
            assert_eq!(instruction.register, register);
            assert_eq!(instruction.operand, Some(0xABCD));
            assert!(!instruction.uses_single_digit_addressing);
        }

        Ok(())
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            decode_bytes(&[0xC0, 0x00]),
            Err(DecodeError::MissingOperand { address: 0 })
        );
        assert_eq!(
            decode_bytes(&[]),
            Err(DecodeError::MissingOpcode { address: 0 })
        );
    }

    #[test]
    fn test_display() -> Result<()> {
        assert_eq!(decode_bytes(&[0xC0, 0x00, 0x05])?.to_string(), "LDA 0x0005,i");
        assert_eq!(decode_bytes(&[0x05, 0x00, 0x03])?.to_string(), "BR 0x0003,x");
        assert_eq!(decode_bytes(&[0x00])?.to_string(), "STOP");

        Ok(())
    }
}
