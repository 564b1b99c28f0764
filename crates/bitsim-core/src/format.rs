//! Text embedding file format
//!
//! # File Structure
//!
//! ```text
//! <bits>                      (filtered variant)
//! <word_count> <bits>         (vocabulary-building variant)
//! word  b_0 b_1 ... b_{n-1}   one record per line, n = ceil(bits / 64)
//! ```
//!
//! Blocks are unsigned 64-bit integers in the file's radix (decimal by
//! default). Bit `i` of the vector is bit `i % 64` of block `i / 64`; bits of
//! the last block above the declared width must be zero.
//!
//! The header occupies the first non-blank line. Records are line oriented:
//! a bad record is reported on its own and never bleeds into the next one.

use std::fmt;
use std::io::{self, BufRead};
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

use crate::simd::blocks_for;
use crate::store::{BinaryVector, ShapeError};

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Missing header: file is empty")]
    MissingHeader,

    #[error("Invalid header field `{field}`: {value:?}")]
    InvalidHeader { field: &'static str, value: String },

    #[error("Invalid header: bit width must be positive")]
    ZeroWidth,
}

/// Reasons a single record is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid block {token:?}: {source}")]
    InvalidBlock {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Radix of the packed block integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    #[default]
    Decimal,
    Hex,
}

impl Radix {
    #[inline]
    pub fn base(self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }

    fn parse_block(self, token: &str) -> Result<u64, ParseIntError> {
        let digits = match self {
            Radix::Decimal => token,
            Radix::Hex => token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token),
        };
        u64::from_str_radix(digits, self.base())
    }
}

impl FromStr for Radix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dec" | "decimal" | "10" => Ok(Radix::Decimal),
            "hex" | "hexadecimal" | "16" => Ok(Radix::Hex),
            other => Err(format!("unknown radix `{other}` (expected dec or hex)")),
        }
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radix::Decimal => f.write_str("dec"),
            Radix::Hex => f.write_str("hex"),
        }
    }
}

/// Which header the file starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// `<bits>`
    BitsOnly,
    /// `<word_count> <bits>`
    CountAndBits,
}

/// Parsed embedding file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingHeader {
    /// Declared number of records (vocabulary-building variant only)
    pub word_count: Option<usize>,
    /// Bit width of every vector
    pub bits: usize,
}

impl EmbeddingHeader {
    /// Parse the header fields from the first non-blank line
    pub fn parse(line: &str, layout: HeaderLayout) -> Result<Self, FormatError> {
        let mut tokens = line.split_whitespace();

        let word_count = match layout {
            HeaderLayout::BitsOnly => None,
            HeaderLayout::CountAndBits => Some(parse_field(tokens.next(), "word_count")?),
        };
        let bits = parse_field(tokens.next(), "bits")?;
        if bits == 0 {
            return Err(FormatError::ZeroWidth);
        }

        Ok(Self { word_count, bits })
    }

    /// Blocks per vector
    #[inline]
    pub fn blocks(&self) -> usize {
        blocks_for(self.bits)
    }
}

fn parse_field(token: Option<&str>, field: &'static str) -> Result<usize, FormatError> {
    let token = token.ok_or(FormatError::InvalidHeader {
        field,
        value: String::new(),
    })?;
    token.parse().map_err(|_| FormatError::InvalidHeader {
        field,
        value: token.to_owned(),
    })
}

/// One record line, borrowed from the reader's buffer
#[derive(Debug, Clone, Copy)]
pub struct RecordLine<'a> {
    /// 1-based line number in the source
    pub line: usize,
    pub word: &'a str,
    rest: &'a str,
}

impl<'a> RecordLine<'a> {
    /// Parse the block fields into a vector of the given width
    pub fn vector(&self, bits: usize, radix: Radix) -> Result<BinaryVector, RecordError> {
        parse_blocks(self.rest, bits, radix)
    }
}

/// Parse whitespace-separated blocks into a `bits`-wide vector
pub fn parse_blocks(fields: &str, bits: usize, radix: Radix) -> Result<BinaryVector, RecordError> {
    // Sized by the fields present, never by the declared width.
    let blocks = fields
        .split_whitespace()
        .map(|token| {
            radix.parse_block(token).map_err(|source| RecordError::InvalidBlock {
                token: token.to_owned(),
                source,
            })
        })
        .collect::<Result<Vec<u64>, _>>()?;
    Ok(BinaryVector::new(blocks, bits)?)
}

/// Streaming reader over an embedding file
pub struct EmbeddingReader<R> {
    reader: R,
    header: EmbeddingHeader,
    radix: Radix,
    buf: String,
    line: usize,
}

impl<R: BufRead> EmbeddingReader<R> {
    /// Read the header and position the reader at the first record
    pub fn new(mut reader: R, layout: HeaderLayout, radix: Radix) -> Result<Self, FormatError> {
        let mut buf = String::new();
        let mut line = 0;

        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Err(FormatError::MissingHeader);
            }
            line += 1;
            if !buf.trim().is_empty() {
                break;
            }
        }

        let header = EmbeddingHeader::parse(&buf, layout)?;
        tracing::debug!(
            "Embedding header: bits={}, blocks={}, word_count={:?}",
            header.bits,
            header.blocks(),
            header.word_count
        );

        Ok(Self {
            reader,
            header,
            radix,
            buf,
            line,
        })
    }

    pub fn header(&self) -> &EmbeddingHeader {
        &self.header
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    /// Advance to the next non-blank record line
    pub fn next_record(&mut self) -> Result<Option<RecordLine<'_>>, FormatError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if !self.buf.trim().is_empty() {
                break;
            }
        }

        let trimmed = self.buf.trim_start();
        let (word, rest) = match trimmed.find(char::is_whitespace) {
            Some(split) => trimmed.split_at(split),
            None => (trimmed.trim_end(), ""),
        };

        Ok(Some(RecordLine {
            line: self.line,
            word,
            rest,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_layouts() {
        let h = EmbeddingHeader::parse("256\n", HeaderLayout::BitsOnly).unwrap();
        assert_eq!(h, EmbeddingHeader { word_count: None, bits: 256 });
        assert_eq!(h.blocks(), 4);

        let h = EmbeddingHeader::parse("3000 128", HeaderLayout::CountAndBits).unwrap();
        assert_eq!(h.word_count, Some(3000));
        assert_eq!(h.bits, 128);
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(
            EmbeddingHeader::parse("abc", HeaderLayout::BitsOnly),
            Err(FormatError::InvalidHeader { field: "bits", .. })
        ));
        assert!(matches!(
            EmbeddingHeader::parse("12", HeaderLayout::CountAndBits),
            Err(FormatError::InvalidHeader { field: "bits", .. })
        ));
        assert!(matches!(
            EmbeddingHeader::parse("0", HeaderLayout::BitsOnly),
            Err(FormatError::ZeroWidth)
        ));
    }

    #[test]
    fn test_missing_header() {
        let result = EmbeddingReader::new(Cursor::new("\n  \n"), HeaderLayout::BitsOnly, Radix::Decimal);
        assert!(matches!(result, Err(FormatError::MissingHeader)));
    }

    #[test]
    fn test_records_skip_blank_lines() {
        let data = "8\ncat 15\n\n  dog 14  \nlonely\n";
        let mut reader =
            EmbeddingReader::new(Cursor::new(data), HeaderLayout::BitsOnly, Radix::Decimal).unwrap();

        let rec = reader.next_record().unwrap().unwrap();
        assert_eq!((rec.line, rec.word), (2, "cat"));
        assert_eq!(rec.vector(8, Radix::Decimal).unwrap().blocks(), &[15]);

        let rec = reader.next_record().unwrap().unwrap();
        assert_eq!((rec.line, rec.word), (4, "dog"));

        let rec = reader.next_record().unwrap().unwrap();
        assert_eq!(rec.word, "lonely");
        assert!(matches!(
            rec.vector(8, Radix::Decimal),
            Err(RecordError::Shape(ShapeError::BlockCount { expected: 1, actual: 0 }))
        ));

        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_parse_blocks_radix() {
        let v = parse_blocks("ff 0x0F", 128, Radix::Hex).unwrap();
        assert_eq!(v.blocks(), &[0xff, 0x0f]);

        let v = parse_blocks("18446744073709551615", 64, Radix::Decimal).unwrap();
        assert_eq!(v.blocks(), &[u64::MAX]);
    }

    #[test]
    fn test_parse_blocks_rejects_bad_records() {
        assert!(matches!(
            parse_blocks("12 x7", 128, Radix::Decimal),
            Err(RecordError::InvalidBlock { ref token, .. }) if token == "x7"
        ));
        assert!(matches!(
            parse_blocks("-1", 64, Radix::Decimal),
            Err(RecordError::InvalidBlock { .. })
        ));
        assert!(matches!(
            parse_blocks("1 2 3", 128, Radix::Decimal),
            Err(RecordError::Shape(ShapeError::BlockCount { expected: 2, actual: 3 }))
        ));
        assert!(matches!(
            parse_blocks("256", 8, Radix::Decimal),
            Err(RecordError::Shape(ShapeError::TailBits { bits: 8 }))
        ));
    }

    #[test]
    fn test_huge_declared_width_rejects_record() {
        let bits = 1usize << 62;
        assert!(matches!(
            parse_blocks("1", bits, Radix::Decimal),
            Err(RecordError::Shape(ShapeError::BlockCount { expected, actual: 1 })) if expected == 1 << 56
        ));

        let data = "1 4611686018427387904\ncat 1\n";
        let mut reader =
            EmbeddingReader::new(Cursor::new(data), HeaderLayout::CountAndBits, Radix::Decimal).unwrap();
        assert_eq!(reader.header().bits, bits);
        let rec = reader.next_record().unwrap().unwrap();
        assert!(rec.vector(bits, Radix::Decimal).is_err());
    }

    #[test]
    fn test_radix_from_str() {
        assert_eq!("hex".parse::<Radix>().unwrap(), Radix::Hex);
        assert_eq!("DEC".parse::<Radix>().unwrap(), Radix::Decimal);
        assert!("octal".parse::<Radix>().is_err());
        assert_eq!(Radix::default().to_string(), "dec");
    }
}
