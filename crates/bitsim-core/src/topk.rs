//! Exact brute-force top-k search
//!
//! Scans every present vector except the query's own, keeping the best `k`
//! in a list sorted by descending similarity. A candidate enters at the tail
//! and is swapped toward the head while it beats its predecessor, so each
//! insertion costs at most `k` swaps and a query is `O(n·k)`.
//!
//! # Tie-break
//!
//! Once the list is full, a candidate must score strictly higher than the
//! current minimum to enter. Within the list, equal scores keep scan order.
//! Together this means the earlier-scanned (lower) identifier wins any tie.

use crate::store::{BinaryVector, VectorStore};
use crate::vocab::{normalize, Vocabulary};

/// A candidate neighbor and its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub score: f32,
}

/// Bounded list of the best `k` neighbors seen so far
#[derive(Debug, Clone)]
pub struct TopK {
    k: usize,
    entries: Vec<Neighbor>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            entries: Vec::with_capacity(k),
        }
    }

    /// Score a full list must beat, `None` while there is still room
    #[inline]
    pub fn threshold(&self) -> Option<f32> {
        if self.entries.len() < self.k {
            None
        } else {
            self.entries.last().map(|n| n.score)
        }
    }

    /// Offer a candidate; returns whether it was kept
    pub fn offer(&mut self, candidate: Neighbor) -> bool {
        if self.k == 0 {
            return false;
        }

        if self.entries.len() < self.k {
            self.entries.push(candidate);
        } else {
            match self.threshold() {
                Some(min) if candidate.score > min => {
                    let last = self.entries.len() - 1;
                    self.entries[last] = candidate;
                }
                _ => return false,
            }
        }

        let mut i = self.entries.len() - 1;
        while i > 0 && self.entries[i - 1].score < self.entries[i].score {
            self.entries.swap(i - 1, i);
            i -= 1;
        }
        true
    }

    /// Neighbors sorted by non-increasing score
    pub fn into_sorted_vec(self) -> Vec<Neighbor> {
        self.entries
    }
}

/// The `k` vectors most similar to `query`, skipping identifier `exclude`
pub fn top_k_by_vector(
    store: &VectorStore,
    query: &BinaryVector,
    k: usize,
    exclude: Option<usize>,
) -> Vec<Neighbor> {
    let mut best = TopK::new(k);
    for (id, vector) in store.iter() {
        if Some(id) == exclude {
            continue;
        }
        best.offer(Neighbor {
            id,
            score: query.similarity(vector),
        });
    }
    best.into_sorted_vec()
}

/// The `k` nearest neighbors of identifier `query_id`, excluding itself
///
/// Returns `None` when `query_id` has no vector. The result may hold fewer
/// than `k` entries when the store has fewer than `k + 1` present vectors.
pub fn top_k(store: &VectorStore, query_id: usize, k: usize) -> Option<Vec<Neighbor>> {
    let query = store.get(query_id)?;
    Some(top_k_by_vector(store, query, k, Some(query_id)))
}

/// Result of a word-level nearest-neighbor query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// `(word, score)` pairs sorted by non-increasing score
    Found(Vec<(String, f32)>),
    /// The word is unknown or has no vector
    OutOfVocabulary,
}

/// Look up `word` (lower-cased) and return its `k` nearest words
pub fn nearest_words(vocab: &Vocabulary, store: &VectorStore, word: &str, k: usize) -> QueryOutcome {
    let Some(id) = vocab.lookup(&normalize(word)) else {
        return QueryOutcome::OutOfVocabulary;
    };
    let Some(neighbors) = top_k(store, id, k) else {
        return QueryOutcome::OutOfVocabulary;
    };

    QueryOutcome::Found(
        neighbors
            .into_iter()
            .filter_map(|n| vocab.word(n.id).map(|w| (w.to_owned(), n.score)))
            .collect(),
    )
}
