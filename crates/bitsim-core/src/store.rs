//! Packed binary vector storage
//!
//! Maps a vocabulary identifier to an optional [`BinaryVector`]. Every vector
//! in a store has the same bit width and block count. A word may be known to
//! the vocabulary without having a vector; that is a normal state.
//!
//! Two population policies are supported:
//!
//! - **filtered** ([`VectorStore::load_filtered`]): only words already in the
//!   vocabulary are stored, everything else is skipped.
//! - **vocabulary-building** ([`VectorStore::load_building`]): every record's
//!   word is lower-cased and inserted into the vocabulary as it is read.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::format::{EmbeddingReader, FormatError, HeaderLayout, Radix};
use crate::simd::{blocks_for, sokal_michener, tail_mask};
use crate::vocab::{normalize, Vocabulary};

/// Upper bound on identifiers reserved up front from a declared word count
const MAX_PREALLOC: usize = 1 << 20;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid vector: {0}")]
    Shape(#[from] ShapeError),

    #[error("Bit width must be positive")]
    ZeroWidth,
}

/// Vector shape violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("expected {expected} blocks, got {actual}")]
    BlockCount { expected: usize, actual: usize },

    #[error("bits set beyond declared width of {bits}")]
    TailBits { bits: usize },

    #[error("width mismatch: store holds {expected}-bit vectors, got {actual}")]
    Width { expected: usize, actual: usize },
}

/// Fixed-width bitstring packed into `u64` blocks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryVector {
    blocks: Box<[u64]>,
    bits: usize,
}

impl BinaryVector {
    /// Wrap `blocks` as a `bits`-wide vector
    ///
    /// Fails if the block count is not `ceil(bits / 64)` or if any bit above
    /// `bits` is set in the last block.
    pub fn new(blocks: Vec<u64>, bits: usize) -> Result<Self, ShapeError> {
        let expected = blocks_for(bits);
        if blocks.len() != expected {
            return Err(ShapeError::BlockCount {
                expected,
                actual: blocks.len(),
            });
        }
        if let Some(&last) = blocks.last() {
            if last & !tail_mask(bits) != 0 {
                return Err(ShapeError::TailBits { bits });
            }
        }
        Ok(Self {
            blocks: blocks.into_boxed_slice(),
            bits,
        })
    }

    #[inline]
    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    #[inline]
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Sokal-Michener similarity: fraction of positions where both agree
    ///
    /// # Panics
    ///
    /// Panics if the vectors have different widths. Vectors from the same
    /// [`VectorStore`] always share a width.
    #[inline]
    pub fn similarity(&self, other: &BinaryVector) -> f32 {
        assert_eq!(self.bits, other.bits, "Vector width mismatch");
        sokal_michener(&self.blocks, &other.blocks, self.bits)
    }
}

/// Counters collected while loading an embedding file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Record lines read after the header
    pub records: usize,
    /// Vectors stored (a replaced duplicate counts once)
    pub stored: usize,
    /// Records dropped because the word is not in the vocabulary
    pub out_of_vocabulary: usize,
    /// Records dropped because a field failed to parse or had the wrong shape
    pub malformed: usize,
    /// Records that replaced an earlier vector for the same word
    pub duplicates: usize,
}

/// Identifier-indexed store of optional binary vectors
#[derive(Debug, Clone)]
pub struct VectorStore {
    bits: usize,
    vectors: Vec<Option<BinaryVector>>,
    present: usize,
    stats: LoadStats,
}

impl VectorStore {
    /// Create an empty store of `bits`-wide vectors covering `len` identifiers
    pub fn with_width(bits: usize, len: usize) -> Result<Self, StoreError> {
        if bits == 0 {
            return Err(StoreError::ZeroWidth);
        }
        Ok(Self {
            bits,
            vectors: vec![None; len],
            present: 0,
            stats: LoadStats::default(),
        })
    }

    /// Store `vector` under `id`, growing the identifier range if needed
    ///
    /// Returns the vector previously stored under `id`, if any.
    pub fn insert(&mut self, id: usize, vector: BinaryVector) -> Result<Option<BinaryVector>, StoreError> {
        if vector.bits() != self.bits {
            return Err(ShapeError::Width {
                expected: self.bits,
                actual: vector.bits(),
            }
            .into());
        }
        if id >= self.vectors.len() {
            self.vectors.resize(id + 1, None);
        }
        let previous = self.vectors[id].replace(vector);
        if previous.is_none() {
            self.present += 1;
        }
        Ok(previous)
    }

    /// Vector for `id`, `None` if absent or out of range
    #[inline]
    pub fn get(&self, id: usize) -> Option<&BinaryVector> {
        self.vectors.get(id).and_then(Option::as_ref)
    }

    /// Bit width shared by every vector
    #[inline]
    pub fn bits(&self) -> usize {
        self.bits
    }

    #[inline]
    pub fn blocks_per_vector(&self) -> usize {
        blocks_for(self.bits)
    }

    /// Size of the identifier range (present or not)
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Number of identifiers that have a vector
    pub fn present(&self) -> usize {
        self.present
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Iterate `(id, vector)` over present vectors in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BinaryVector)> {
        self.vectors
            .iter()
            .enumerate()
            .filter_map(|(id, v)| v.as_ref().map(|v| (id, v)))
    }

    /// Load `<bits>`-headed records for words already in `vocab`
    pub fn load_filtered<P: AsRef<Path>>(
        path: P,
        vocab: &Vocabulary,
        radix: Radix,
    ) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Self::read_filtered(BufReader::new(file), vocab, radix)
    }

    /// Load `<word_count> <bits>`-headed records, inserting every word into `vocab`
    pub fn load_building<P: AsRef<Path>>(
        path: P,
        vocab: &mut Vocabulary,
        radix: Radix,
    ) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Self::read_building(BufReader::new(file), vocab, radix)
    }

    /// Filtered load from any buffered reader
    pub fn read_filtered<R: BufRead>(
        reader: R,
        vocab: &Vocabulary,
        radix: Radix,
    ) -> Result<Self, StoreError> {
        let mut records = EmbeddingReader::new(reader, HeaderLayout::BitsOnly, radix)?;
        let bits = records.header().bits;
        let mut store = Self::with_width(bits, vocab.len())?;
        let mut stats = LoadStats::default();

        while let Some(record) = records.next_record()? {
            stats.records += 1;

            let Some(id) = vocab.lookup(record.word) else {
                stats.out_of_vocabulary += 1;
                continue;
            };

            match record.vector(bits, radix) {
                Ok(vector) => store.record(id, vector, &mut stats)?,
                Err(err) => {
                    stats.malformed += 1;
                    tracing::warn!("Skipping record for {:?} at line {}: {}", record.word, record.line, err);
                }
            }
        }

        store.finish(stats);
        Ok(store)
    }

    /// Vocabulary-building load from any buffered reader
    pub fn read_building<R: BufRead>(
        reader: R,
        vocab: &mut Vocabulary,
        radix: Radix,
    ) -> Result<Self, StoreError> {
        let mut records = EmbeddingReader::new(reader, HeaderLayout::CountAndBits, radix)?;
        let header = *records.header();
        let declared = header.word_count.unwrap_or(0);
        let mut store = Self::with_width(header.bits, 0)?;
        store.vectors.reserve(declared.min(MAX_PREALLOC));
        let mut stats = LoadStats::default();

        while let Some(record) = records.next_record()? {
            stats.records += 1;

            match record.vector(header.bits, radix) {
                Ok(vector) => {
                    let id = vocab.insert_if_absent(&normalize(record.word));
                    store.record(id, vector, &mut stats)?;
                }
                Err(err) => {
                    stats.malformed += 1;
                    tracing::warn!("Skipping record for {:?} at line {}: {}", record.word, record.line, err);
                }
            }
        }

        // Words seen before this load keep their ids; cover the whole range.
        if store.vectors.len() < vocab.len() {
            store.vectors.resize(vocab.len(), None);
        }

        if stats.records != declared {
            tracing::warn!(
                "Header declared {} words but file contains {} records",
                declared,
                stats.records
            );
        }

        store.finish(stats);
        Ok(store)
    }

    fn record(&mut self, id: usize, vector: BinaryVector, stats: &mut LoadStats) -> Result<(), StoreError> {
        if self.insert(id, vector)?.is_some() {
            stats.duplicates += 1;
        } else {
            stats.stored += 1;
        }
        Ok(())
    }

    fn finish(&mut self, stats: LoadStats) {
        tracing::info!(
            "Loaded {} vectors of {} bits ({} records, {} out of vocabulary, {} malformed, {} duplicates)",
            stats.stored,
            self.bits,
            stats.records,
            stats.out_of_vocabulary,
            stats.malformed,
            stats.duplicates
        );
        self.stats = stats;
    }
}
