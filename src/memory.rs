use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Largest program image. The 16-bit program counter must be able to point
/// one past its last byte.
pub const MAX_IMAGE_SIZE: usize = Word::MAX as usize;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("failed to read program image")]
    Io(#[from] io::Error),
    #[error("program image is empty")]
    Empty,
    #[error("program image has {0} bytes, at most 65535 are supported")]
    TooLarge(usize),
}

/// An access to an address past the end of the loaded program image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address 0x{address:04X} is outside of memory ({len} bytes)")]
pub struct OutOfRange {
    pub address: usize,
    pub len: usize,
}

/// The program image, which doubles as the memory of the CPU
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Memory {
    /// The actual data of the memory
    pub data: Vec<Byte>,
}

impl From<Vec<Byte>> for Memory {
    fn from(data: Vec<Byte>) -> Self {
        Self::new(data)
    }
}

impl Memory {
    pub fn new(data: Vec<Byte>) -> Self {
        Memory { data }
    }

    /// Loads a program image from disk.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read, is empty, or is larger than
    /// [`MAX_IMAGE_SIZE`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let data = fs::read(path)?;

        if data.is_empty() {
            return Err(MemoryError::Empty);
        }
        if data.len() > MAX_IMAGE_SIZE {
            return Err(MemoryError::TooLarge(data.len()));
        }

        log::debug!("Program image contains {} bytes", data.len());

        Ok(Self::new(data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the byte at `position`, if there is one
    pub fn get(&self, position: usize) -> Option<Byte> {
        self.data.get(position).copied()
    }

    /// Returns `len` bytes starting at `start`, clipped to the end of memory
    pub fn bytes(&self, start: usize, len: usize) -> &[Byte] {
        let start = start.min(self.data.len());
        let end = start.saturating_add(len).min(self.data.len());
        &self.data[start..end]
    }

    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Word) -> Result<Byte, OutOfRange> {
        self.get(position as usize).ok_or_else(|| self.out_of_range(position as usize))
    }

    /// Reads a word from the memory (big endian)
    pub fn read_word(&self, position: Word) -> Result<Word, OutOfRange> {
        let high = self.read_byte(position)?;
        let low = self
            .get(position as usize + 1)
            .ok_or_else(|| self.out_of_range(position as usize + 1))?;

        Ok(Word::from_be_bytes([high, low]))
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Word, value: Byte) -> Result<(), OutOfRange> {
        let len = self.data.len();
        let slot = self.data.get_mut(position as usize).ok_or(OutOfRange {
            address: position as usize,
            len,
        })?;
        *slot = value;

        Ok(())
    }

    /// Writes a word to the memory (big endian). Nothing is written unless
    /// both bytes fit.
    pub fn write_word(&mut self, position: Word, value: Word) -> Result<(), OutOfRange> {
        let start = position as usize;
        if start + 1 >= self.data.len() {
            let address = if start < self.data.len() { start + 1 } else { start };
            return Err(self.out_of_range(address));
        }

        self.data[start..start + 2].copy_from_slice(&value.to_be_bytes());

        Ok(())
    }

    /// Reads the three bytes at `position` as one big endian value, the way
    /// the instruction register is loaded. Bytes past the end read as zero.
    pub fn fetch(&self, position: Word) -> u32 {
        let position = position as usize;

        (0..3).fold(0u32, |acc, offset| {
            acc << 8 | self.get(position + offset).unwrap_or(0) as u32
        })
    }

    /// Renders every byte as a three digit decimal number, wrapping at 80
    /// columns.
    pub fn decimal_dump(&self) -> String {
        let mut dump = String::with_capacity(self.data.len() * 4 + 1);

        for row in self.data.chunks(20) {
            let line: Vec<String> = row.iter().map(|byte| format!("{:03}", byte)).collect();
            dump.push_str(&line.join(" "));
            dump.push('\n');
        }
        if self.data.is_empty() {
            dump.push('\n');
        }

        dump
    }

    fn out_of_range(&self, address: usize) -> OutOfRange {
        OutOfRange {
            address,
            len: self.data.len(),
        }
    }
}

/// Builds a [`Memory`] from a list of bytes
#[macro_export]
macro_rules! memory {
    ( $( $byte:expr ),* $(,)? ) => {
        $crate::memory::Memory::new(vec![
            $(
                $byte as $crate::memory::Byte,
            )*
        ])
    };
}
