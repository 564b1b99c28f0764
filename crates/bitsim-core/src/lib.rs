//! bitsim core – vocabulary, packed binary vectors, Sokal-Michener similarity,
//! exact top-k search and rank-correlation evaluation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │   Top-K Selector (topk)      │  Correlation Evaluator (eval)│
//! ├──────────────────────────────┴──────────────────────────────┤
//! │        Sokal-Michener similarity (simd, popcount)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │   VectorStore (store) ◄── embedding text format (format)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │   Vocabulary (vocab) ◄── judgment datasets (dataset)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is built once and read-only afterwards, so a loaded
//! [`VectorStore`] can be shared across threads by reference.

pub mod dataset;
pub mod eval;
pub mod format;
pub mod simd;
pub mod store;
pub mod topk;
pub mod vocab;

pub use dataset::{Dataset, Judgment};
pub use eval::{evaluate, spearman, DatasetScore};
pub use format::{EmbeddingHeader, HeaderLayout, Radix};
pub use simd::{sokal_michener, BLOCK_BITS};
pub use store::{BinaryVector, LoadStats, VectorStore};
pub use topk::{nearest_words, top_k, Neighbor, QueryOutcome};
pub use vocab::Vocabulary;
