//! bitsim: benchmark and query binary word embeddings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 CLI (clap): evaluate · topk · stats         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │        session: timed load → evaluate / query phases        │
//! │        report: table + JSON      config: env + flags        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         bitsim-core                         │
//! │  Vocabulary · VectorStore · Sokal-Michener · top-k · ρ      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod report;
pub mod session;

pub use bitsim_core::{dataset, eval, format, simd, store, topk, vocab};
pub use bitsim_core::{
    nearest_words, sokal_michener, top_k, BinaryVector, Neighbor, QueryOutcome, Radix,
    VectorStore, Vocabulary,
};
pub use config::EvalConfig;
pub use report::EvaluationReport;
pub use session::{evaluate_embedding, QuerySession};
