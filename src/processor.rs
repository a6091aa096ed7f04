use log::*;
use thiserror::Error;

use crate::instruction::{self, AddressingMode, DecodeError, Instruction, Mnemonic, Register};
use crate::memory::{Memory, OutOfRange, Word};
use crate::trace::{Output, Snapshot, Tracer};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("the instruction {mnemonic} at 0x{address:04X} is not supported by this interpreter")]
    UnsupportedInstruction { mnemonic: Mnemonic, address: Word },
    #[error("the addressing mode {mode} of {mnemonic} at 0x{address:04X} is not supported by this interpreter")]
    UnsupportedAddressingMode {
        mnemonic: Mnemonic,
        mode: AddressingMode,
        address: Word,
    },
    #[error("the addressing mode {mode} is not valid for {mnemonic} at 0x{address:04X}")]
    InvalidAddressingMode {
        mnemonic: Mnemonic,
        mode: AddressingMode,
        address: Word,
    },
    #[error(transparent)]
    AddressOutOfRange(#[from] OutOfRange),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("failed to report the trace")]
    Trace(#[from] std::io::Error),
}

type Result<T, E = ExecutionError> = std::result::Result<T, E>;

/// Whether the interpreter keeps going after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Continue,
    Stop,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Halt {
    /// A `STOP` instruction executed
    Stopped,
    /// The program counter moved past the end of memory
    EndOfMemory,
}

/// The bitwise complement of a 16-bit value
pub fn flip_bits(value: Word) -> Word {
    !value
}

/// Emulates the Pep/8 CPU
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Instruction register. Holds the last three fetched bytes, the top byte
    /// is unused.
    pub ir: u32,
    /// Accumulator
    pub a: Word,
    /// Index register
    pub x: Word,
    /// Program counter
    pub pc: Word,
    /// Negative flag
    pub n: bool,
    /// Zero flag
    pub z: bool,
    /// Overflow flag
    pub v: bool,
    /// Carry flag
    pub c: bool,
}

impl Processor {
    /// Initializes a new CPU with every register and flag cleared
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            n: self.n,
            z: self.z,
            v: self.v,
            c: self.c,
            a: self.a,
            x: self.x,
            pc: self.pc,
            ir: self.ir,
        }
    }

    /// Loads the three bytes at the program counter into the instruction
    /// register
    pub fn fetch(&mut self, memory: &Memory) {
        self.ir = memory.fetch(self.pc);
    }

    /// Decodes the instruction register
    pub fn decode(&self) -> Result<Instruction<'static>> {
        let bytes = self.ir.to_be_bytes();
        Ok(instruction::decode(self.pc, |offset| {
            bytes.get(offset + 1).copied()
        })?)
    }

    /// Moves the program counter past `instruction`
    pub fn increment(&mut self, instruction: &Instruction<'_>) {
        self.pc = self.pc.wrapping_add(instruction.size as Word);
    }

    /// Runs one fetch, decode, increment, trace and execute cycle
    pub fn step<T: Tracer>(&mut self, memory: &mut Memory, tracer: &mut T) -> Result<Step> {
        self.fetch(memory);
        let instruction = self.decode()?;
        self.increment(&instruction);
        tracer.cycle(&self.snapshot())?;
        self.execute_instruction(&instruction, memory, tracer)
    }

    /// Resets the CPU and runs the program from address 0 until it stops or
    /// the program counter leaves memory
    pub fn execute_until_stop<T: Tracer>(
        &mut self,
        memory: &mut Memory,
        tracer: &mut T,
    ) -> Result<Halt> {
        self.reset();

        let halt = loop {
            if self.pc as usize >= memory.len() {
                break Halt::EndOfMemory;
            }
            if self.step(memory, tracer)? == Step::Stop {
                break Halt::Stopped;
            }
        };
        tracer.finish()?;

        info!(
            "Program terminated ({:?}). A: 0x{:04X} X: 0x{:04X}",
            halt, self.a, self.x
        );

        Ok(halt)
    }

    /// Executes a single decoded instruction. The program counter must
    /// already point past it.
    pub fn execute_instruction<T: Tracer>(
        &mut self,
        instruction: &Instruction<'_>,
        memory: &mut Memory,
        tracer: &mut T,
    ) -> Result<Step> {
        use Mnemonic::*;

        debug!("0x{:04X}: {}", instruction.address, instruction);

        match instruction.mnemonic {
            STOP => return Ok(Step::Stop),
            ADDA | ADDX | SUBA | SUBX | ANDA | ANDX | ORA | ORX => {
                self.execute_arithmetic(instruction, memory)?
            }
            CPA | CPX => self.execute_compare(instruction, memory)?,
            NOTA | NOTX | NEGA | NEGX => self.execute_negation(instruction)?,
            LDA | LDX | LDBYTEA | LDBYTEX => self.execute_load(instruction, memory)?,
            STA | STX | STBYTEA | STBYTEX => self.execute_store(instruction, memory, tracer)?,
            DECO | CHARO => self.execute_output(instruction, memory, tracer)?,
            BR | BRLE | BRLT | BREQ | BRNE | BRGE | BRGT | CALL => {
                self.execute_branch(instruction)
            }
            mnemonic => {
                return Err(ExecutionError::UnsupportedInstruction {
                    mnemonic,
                    address: instruction.address,
                })
            }
        }

        Ok(Step::Continue)
    }

    /// Whether `mnemonic` branches with the current flags. `None` for
    /// anything that isn't an executable branch, including `BRV` and `BRC`.
    pub fn branch_taken(&self, mnemonic: Mnemonic) -> Option<bool> {
        use Mnemonic::*;

        let taken = match mnemonic {
            BR | CALL => true,
            BRLE => self.n || self.z,
            BRLT => self.n,
            BREQ => self.z,
            BRNE => !self.z,
            BRGE => !self.n,
            BRGT => !self.n && !self.z,
            _ => return None,
        };

        Some(taken)
    }

    fn register(&self, register: Register) -> Word {
        match register {
            Register::Accumulator => self.a,
            Register::Index => self.x,
        }
    }

    fn register_mut(&mut self, register: Register) -> &mut Word {
        match register {
            Register::Accumulator => &mut self.a,
            Register::Index => &mut self.x,
        }
    }

    /// Stores `value` in `register` and sets N and Z from it
    fn set_register(&mut self, register: Register, value: Word) {
        *self.register_mut(register) = value;
        self.z = value == 0;
        self.n = value & 0x8000 != 0;
    }

    /// The register an instruction operates on
    fn target(instruction: &Instruction<'_>) -> Result<Register> {
        instruction
            .register
            .ok_or(ExecutionError::UnsupportedInstruction {
                mnemonic: instruction.mnemonic,
                address: instruction.address,
            })
    }

    /// The addressing mode of an instruction, immediate if it has none
    fn mode(instruction: &Instruction<'_>) -> AddressingMode {
        instruction
            .addressing_mode
            .unwrap_or(AddressingMode::Immediate)
    }

    fn unsupported_mode(instruction: &Instruction<'_>, mode: AddressingMode) -> ExecutionError {
        ExecutionError::UnsupportedAddressingMode {
            mnemonic: instruction.mnemonic,
            mode,
            address: instruction.address,
        }
    }

    /// Resolves the operand of an immediate or direct instruction to a word
    fn resolve_word(instruction: &Instruction<'_>, memory: &Memory) -> Result<Word> {
        let operand = instruction.operand.unwrap_or_default();

        match Self::mode(instruction) {
            AddressingMode::Immediate => Ok(operand),
            AddressingMode::Direct => Ok(memory.read_word(operand)?),
            mode => Err(Self::unsupported_mode(instruction, mode)),
        }
    }

    /// Resolves the operand of an immediate or direct instruction to a byte
    fn resolve_byte(instruction: &Instruction<'_>, memory: &Memory) -> Result<u8> {
        let operand = instruction.operand.unwrap_or_default();

        match Self::mode(instruction) {
            AddressingMode::Immediate => Ok(operand as u8),
            AddressingMode::Direct => Ok(memory.read_byte(operand)?),
            mode => Err(Self::unsupported_mode(instruction, mode)),
        }
    }

    fn execute_arithmetic(&mut self, instruction: &Instruction<'_>, memory: &Memory) -> Result<()> {
        use Mnemonic::*;

        let register = Self::target(instruction)?;
        let operand = Self::resolve_word(instruction, memory)?;
        let value = self.register(register);

        let result = match instruction.mnemonic {
            ADDA | ADDX => value.wrapping_add(operand),
            SUBA | SUBX => value.wrapping_sub(operand),
            ANDA | ANDX => value & operand,
            _ => value | operand,
        };
        self.set_register(register, result);

        debug!("{} 0x{:04X} 0x{:04X}: 0x{:04X}", instruction.mnemonic, value, operand, result);

        Ok(())
    }

    fn execute_compare(&mut self, instruction: &Instruction<'_>, memory: &Memory) -> Result<()> {
        let register = Self::target(instruction)?;
        let operand = Self::resolve_word(instruction, memory)? as i16;
        let value = self.register(register) as i16;

        self.z = value == operand;
        self.n = value < operand;

        debug!("{} {} {}: N={} Z={}", instruction.mnemonic, value, operand, self.n, self.z);

        Ok(())
    }

    /// `NOTr` and `NEGr` leave the flags alone
    fn execute_negation(&mut self, instruction: &Instruction<'_>) -> Result<()> {
        let register = Self::target(instruction)?;
        let value = self.register(register);

        let result = match instruction.mnemonic {
            Mnemonic::NOTA | Mnemonic::NOTX => flip_bits(value),
            _ => flip_bits(value).wrapping_add(1),
        };
        *self.register_mut(register) = result;

        debug!("{} 0x{:04X}: 0x{:04X}", instruction.mnemonic, value, result);

        Ok(())
    }

    fn execute_load(&mut self, instruction: &Instruction<'_>, memory: &Memory) -> Result<()> {
        let register = Self::target(instruction)?;

        let result = match instruction.mnemonic {
            Mnemonic::LDBYTEA | Mnemonic::LDBYTEX => {
                let byte = Self::resolve_byte(instruction, memory)?;
                self.register(register) & 0xFF00 | byte as Word
            }
            _ => Self::resolve_word(instruction, memory)?,
        };
        self.set_register(register, result);

        debug!("{}: 0x{:04X}", instruction.mnemonic, result);

        Ok(())
    }

    fn execute_store<T: Tracer>(
        &mut self,
        instruction: &Instruction<'_>,
        memory: &mut Memory,
        tracer: &mut T,
    ) -> Result<()> {
        let register = Self::target(instruction)?;
        let address = instruction.operand.unwrap_or_default();

        match Self::mode(instruction) {
            AddressingMode::Direct => {}
            AddressingMode::Immediate => {
                return Err(ExecutionError::InvalidAddressingMode {
                    mnemonic: instruction.mnemonic,
                    mode: AddressingMode::Immediate,
                    address: instruction.address,
                })
            }
            mode => return Err(Self::unsupported_mode(instruction, mode)),
        }

        let value = self.register(register);
        let [high, low] = value.to_be_bytes();
        match instruction.mnemonic {
            Mnemonic::STBYTEA | Mnemonic::STBYTEX => {
                memory.write_byte(address, low)?;
                tracer.store(&[(address, low)])?;
            }
            _ => {
                memory.write_word(address, value)?;
                tracer.store(&[(address, high), (address.wrapping_add(1), low)])?;
            }
        }

        debug!("{} -> 0x{:04X}", instruction.mnemonic, address);

        Ok(())
    }

    fn execute_output<T: Tracer>(
        &mut self,
        instruction: &Instruction<'_>,
        memory: &Memory,
        tracer: &mut T,
    ) -> Result<()> {
        let output = match instruction.mnemonic {
            Mnemonic::DECO => Output::Decimal(Self::resolve_word(instruction, memory)? as i16),
            _ => Output::Character(Self::resolve_byte(instruction, memory)?),
        };

        debug!("{:?}", output);
        tracer.output(output)?;

        Ok(())
    }

    /// The target is always the operand itself. Indexed branches do not add
    /// the index register.
    fn execute_branch(&mut self, instruction: &Instruction<'_>) {
        let target = instruction.operand.unwrap_or_default();

        if let Some(true) = self.branch_taken(instruction.mnemonic) {
            self.pc = target;
            debug!("{} taken: PC = 0x{:04X}", instruction.mnemonic, target);
        } else {
            debug!("{} not taken", instruction.mnemonic);
        }
    }
}
