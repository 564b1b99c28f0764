//! End-to-end runs behind the CLI subcommands

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;

use bitsim_core::dataset::load_datasets;
use bitsim_core::{evaluate, nearest_words, QueryOutcome, Radix, VectorStore, Vocabulary};

use crate::config::EvalConfig;
use crate::report::{EvaluationReport, PhaseTiming};

/// Build the vocabulary from the datasets, load matching vectors, score every dataset
pub fn evaluate_embedding(embedding: &Path, config: &EvalConfig) -> anyhow::Result<EvaluationReport> {
    let mut timings = Vec::with_capacity(3);

    let start = Instant::now();
    let datasets = load_datasets(&config.datasets_dir, config.max_lines)
        .with_context(|| format!("create_vocab: reading datasets from {:?}", config.datasets_dir))?;
    let mut vocab = Vocabulary::new();
    for dataset in &datasets {
        dataset.extend_vocabulary(&mut vocab);
    }
    timings.push(PhaseTiming::new("create_vocab", start.elapsed()));
    tracing::info!(
        "Vocabulary of {} words from {} datasets",
        vocab.len(),
        datasets.len()
    );

    let start = Instant::now();
    let store = VectorStore::load_filtered(embedding, &vocab, config.radix)
        .with_context(|| format!("load_vectors: loading embeddings from {:?}", embedding))?;
    timings.push(PhaseTiming::new("load_vectors", start.elapsed()));

    let start = Instant::now();
    let scores = datasets
        .iter()
        .map(|dataset| evaluate(dataset, &vocab, &store))
        .collect();
    timings.push(PhaseTiming::new("evaluate", start.elapsed()));

    Ok(EvaluationReport {
        embedding: embedding.display().to_string(),
        bits: store.bits(),
        vocabulary: vocab.len(),
        vectors: store.present(),
        datasets: scores,
        timings,
    })
}

/// Vocabulary and vectors loaded for nearest-neighbor queries
pub struct QuerySession {
    pub vocab: Vocabulary,
    pub store: VectorStore,
    pub load_time: Duration,
}

impl QuerySession {
    /// Load a `<word_count> <bits>` embedding file, every word becomes queryable
    pub fn open(embedding: &Path, radix: Radix) -> anyhow::Result<Self> {
        let start = Instant::now();
        let mut vocab = Vocabulary::new();
        let store = VectorStore::load_building(embedding, &mut vocab, radix)
            .with_context(|| format!("load_vectors: loading embeddings from {:?}", embedding))?;
        Ok(Self {
            vocab,
            store,
            load_time: start.elapsed(),
        })
    }

    /// Nearest words to `word` and the time the scan took
    pub fn query(&self, word: &str, k: usize) -> (QueryOutcome, Duration) {
        let start = Instant::now();
        let outcome = nearest_words(&self.vocab, &self.store, word, k);
        (outcome, start.elapsed())
    }
}
