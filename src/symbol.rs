use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

pub mod parse;

pub use parse::{ParseError, ParseErrorKind};

/// What a symbol declares at its offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A plain label in front of an instruction
    Line,
    /// A zero terminated string
    Ascii,
    /// A reserved block of `block_length` bytes
    Block,
    /// A raw two byte word
    Word,
}

impl SymbolKind {
    pub const ALL: [Self; 4] = [
        SymbolKind::Line,
        SymbolKind::Ascii,
        SymbolKind::Block,
        SymbolKind::Word,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SymbolKind::Line => "LINE",
            SymbolKind::Ascii => "ASCII",
            SymbolKind::Block => "BLOCK",
            SymbolKind::Word => "WORD",
        }
    }

    /// Looks up a kind by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub label: String,
    pub kind: SymbolKind,
    /// Byte offset into the program image
    pub offset: usize,
    /// Only meaningful for [`SymbolKind::Block`]
    pub block_length: usize,
}

impl Symbol {
    pub fn new<S: Into<String>>(label: S, kind: SymbolKind, offset: usize) -> Self {
        Self {
            label: label.into(),
            kind,
            offset,
            block_length: 0,
        }
    }

    pub fn block<S: Into<String>>(label: S, offset: usize, block_length: usize) -> Self {
        Self {
            block_length,
            ..Self::new(label, SymbolKind::Block, offset)
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read symbol file")]
    Io(#[from] io::Error),
    #[error("symbol file is illegally formatted ({} errors)", .0.len())]
    Format(Vec<ParseError>),
}

/// The symbols of a program, in the order they were declared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Reads and validates a symbol file.
    ///
    /// # Errors
    ///
    /// Every malformed line is reported, not just the first one.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let data = fs::read_to_string(path)?;
        data.parse().map_err(LoadError::Format)
    }

    /// The first symbol declared at `offset`
    pub fn lookup(&self, offset: usize) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.offset == offset)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
