//! Symbol files list one symbol per line:
//!
//! ```text
//! msg    ascii  3
//! buffer BLOCK  17 4
//! main   line   0
//! ```
//!
//! The fields are the label, the kind (case-insensitive), the decimal byte
//! offset and, for blocks only, the decimal block length.

use std::borrow::Cow;
use std::error;
use std::str::FromStr;
use std::{fmt, str::Lines};

use super::{Symbol, SymbolKind, SymbolTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    MissingField,
    InvalidKind,
    UnknownKind,
    InvalidOffset,
    InvalidBlockLength,
    MissingBlockLength,
    TooManyFields,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::MissingField => {
                f.write_str("each line of the symbol table must contain at least 3 items")
            }
            ParseErrorKind::InvalidKind => {
                f.write_str("the symbol type contains characters that are not letters")
            }
            ParseErrorKind::UnknownKind => f.write_str("the symbol type is not valid"),
            ParseErrorKind::InvalidOffset => f.write_str("the byte offset of the symbol is invalid"),
            ParseErrorKind::InvalidBlockLength => f.write_str("the block length is invalid"),
            ParseErrorKind::MissingBlockLength => {
                f.write_str("the symbol is a block but has no block length")
            }
            ParseErrorKind::TooManyFields => {
                f.write_str("only block symbols may have more than 3 items")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

impl FromStr for SymbolTable {
    type Err = Vec<ParseError>;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Parser::new(data).parse()
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line_nr: usize,
    symbols: Vec<Symbol>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for `data`.
    pub fn new(data: &'a str) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            symbols: Vec::new(),
        }
    }

    /// Consumes `self` and tries to parse every line of the input.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<SymbolTable, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(SymbolTable::new(self.symbols))
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line. Blank lines are skipped.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            return Some(Ok(()));
        }

        Some(self.parse_symbol(&fields).map(|symbol| {
            log::debug!(
                "[{}] Found {} symbol `{}` at offset {}",
                self.line_nr,
                symbol.kind.name(),
                symbol.label,
                symbol.offset
            );
            self.symbols.push(symbol);
        }))
    }

    /// Tries to build a symbol from the whitespace separated `fields` of a
    /// line.
    ///
    /// # Examples
    ///
    /// - `msg ascii 3`
    /// - `buffer BLOCK 17 4`
    fn parse_symbol(&self, fields: &[&str]) -> Result<Symbol> {
        let (label, kind, offset, rest) = match fields {
            [label, kind, offset, rest @ ..] => (*label, *kind, *offset, rest),
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingField,
                    format!("found {} item(s)", fields.len()),
                    self.line_nr,
                ))
            }
        };

        let kind = self.parse_kind(kind)?;
        let offset = self.parse_number(offset, ParseErrorKind::InvalidOffset)?;

        let block_length = match (kind, rest) {
            (SymbolKind::Block, [length]) => {
                self.parse_number(length, ParseErrorKind::InvalidBlockLength)?
            }
            (SymbolKind::Block, []) => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingBlockLength,
                    format!("`{}` needs a length", label),
                    self.line_nr,
                ))
            }
            (_, []) => 0,
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::TooManyFields,
                    format!("found {} items", fields.len()),
                    self.line_nr,
                ))
            }
        };

        Ok(Symbol {
            label: label.to_owned(),
            kind,
            offset,
            block_length,
        })
    }

    fn parse_kind(&self, kind: &str) -> Result<SymbolKind> {
        if !kind.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidKind,
                format!("`{}`", kind),
                self.line_nr,
            ));
        }

        SymbolKind::from_name(kind).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UnknownKind,
                format!("`{}` is none of LINE, ASCII, BLOCK or WORD", kind),
                self.line_nr,
            )
        })
    }

    /// Parses an unsigned decimal number, digits only
    fn parse_number(&self, field: &str, kind: ParseErrorKind) -> Result<usize> {
        if !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::new(kind, format!("`{}`", field), self.line_nr));
        }

        field
            .parse()
            .map_err(|_| ParseError::new(kind, format!("`{}` is out of range", field), self.line_nr))
    }
}
