//! What the interpreter reports while it runs: a register snapshot per
//! cycle, program output and memory stores.

use std::fmt;
use std::io::{self, Write};

use crate::memory::{Byte, Word};

pub const DIVIDER: &str = "------------------------------------";

/// The CPU registers, as seen between increment and execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot {
    pub n: bool,
    pub z: bool,
    pub v: bool,
    pub c: bool,
    pub a: Word,
    pub x: Word,
    pub pc: Word,
    pub ir: u32,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |flag: bool| if flag { 1 } else { 0 };

        writeln!(
            f,
            "{:<28}{} {} {} {}",
            "Status bits (NZVC)",
            bit(self.n),
            bit(self.z),
            bit(self.v),
            bit(self.c)
        )?;
        writeln!(f, "{:<28}0x{:04X}", "Accumulator (A)", self.a)?;
        writeln!(f, "{:<28}0x{:04X}", "Index Register (X)", self.x)?;
        writeln!(f, "{:<28}0x{:04X}", "Program counter (PC)", self.pc)?;
        write!(f, "{:<28}0x{:06X}", "Instruction register (IR)", self.ir)
    }
}

/// Output produced by the program itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Output {
    /// `DECO`
    Decimal(i16),
    /// `CHARO`
    Character(Byte),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Output::Decimal(value) => write!(f, "Output: {}", value),
            Output::Character(byte) if byte == b' ' || byte.is_ascii_graphic() => {
                write!(f, "Output '{}'", byte as char)
            }
            Output::Character(byte) => write!(f, "Output '\\x{:02X}'", byte),
        }
    }
}

/// Receives everything the interpreter reports
pub trait Tracer {
    /// Called once per cycle, after the program counter was incremented and
    /// before the instruction executes
    fn cycle(&mut self, snapshot: &Snapshot) -> io::Result<()>;

    fn output(&mut self, output: Output) -> io::Result<()>;

    /// The bytes written by one store instruction, in address order
    fn store(&mut self, writes: &[(Word, Byte)]) -> io::Result<()>;

    /// Called once when the run ends, whether by `STOP` or by running off the
    /// end of memory
    fn finish(&mut self) -> io::Result<()>;
}

/// Prints the trace the way the command line tool shows it
pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Tracer for Console<W> {
    fn cycle(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        writeln!(self.out, "{}", DIVIDER)?;
        writeln!(self.out, "{}", snapshot)
    }

    fn output(&mut self, output: Output) -> io::Result<()> {
        writeln!(self.out, "{}", DIVIDER)?;
        writeln!(self.out, "  {}", output)
    }

    fn store(&mut self, writes: &[(Word, Byte)]) -> io::Result<()> {
        writeln!(self.out, "{}", DIVIDER)?;
        for (address, value) in writes {
            writeln!(self.out, "  Mem[{:04X}] <-- 0x{:04X}", address, value)?;
        }

        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", DIVIDER)?;
        self.out.flush()
    }
}

/// Keeps every report in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recorder {
    pub snapshots: Vec<Snapshot>,
    pub outputs: Vec<Output>,
    pub stores: Vec<(Word, Byte)>,
    pub finished: bool,
}

impl Tracer for Recorder {
    fn cycle(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        self.snapshots.push(*snapshot);
        Ok(())
    }

    fn output(&mut self, output: Output) -> io::Result<()> {
        self.outputs.push(output);
        Ok(())
    }

    fn store(&mut self, writes: &[(Word, Byte)]) -> io::Result<()> {
        self.stores.extend_from_slice(writes);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        Ok(())
    }
}
