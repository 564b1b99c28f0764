//! Rank-correlation evaluation against human similarity judgments
//!
//! For each judgment both words are looked up; pairs where either word has no
//! vector are dropped but still counted toward the out-of-vocabulary ratio.
//! The remaining `(human, computed)` pairs are scored with Spearman's ρ.

use serde::Serialize;

use crate::dataset::{Dataset, Judgment};
use crate::store::VectorStore;
use crate::vocab::Vocabulary;

/// Average 0-based ranks, ties share the mean of the positions they span
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let avg = (start + end - 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = avg;
        }
        start = end;
    }
    ranks
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        (cov / denom).clamp(-1.0, 1.0)
    }
}

/// Spearman rank correlation of two equal-length sequences
///
/// Returns `NaN` for fewer than two points or when either sequence is constant.
///
/// # Panics
///
/// Panics if the sequences differ in length.
pub fn spearman(xs: &[f64], ys: &[f64]) -> f64 {
    assert_eq!(xs.len(), ys.len(), "Sequence length mismatch");
    if xs.len() < 2 {
        return f64::NAN;
    }
    pearson(&ranks(xs), &ranks(ys))
}

/// Correlate `(gold, computed)` pairs; returns `(coefficient, pair count)`
pub fn correlate(pairs: &[(f32, f32)]) -> (f64, usize) {
    let (gold, computed): (Vec<f64>, Vec<f64>) = pairs
        .iter()
        .map(|&(g, c)| (f64::from(g), f64::from(c)))
        .unzip();
    (spearman(&gold, &computed), pairs.len())
}

/// Score of one dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetScore {
    pub name: String,
    /// Spearman's ρ over matched pairs, `NaN` when undefined
    pub coefficient: f64,
    /// Judgments read from the dataset
    pub total: usize,
    /// Judgments where both words had a vector
    pub matched: usize,
}

impl DatasetScore {
    /// Share of judgments dropped for missing vectors, in percent
    ///
    /// `0.0` for an empty dataset.
    pub fn oov_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.total - self.matched) as f64 * 100.0 / self.total as f64
    }
}

/// Pair each judgment with the similarity of its two words' vectors
///
/// Judgments with an unknown word or a missing vector are left out.
pub fn score_pairs(judgments: &[Judgment], vocab: &Vocabulary, store: &VectorStore) -> Vec<(f32, f32)> {
    let vector = |word: &str| vocab.lookup(word).and_then(|id| store.get(id));

    judgments
        .iter()
        .filter_map(|j| {
            let a = vector(&j.word1)?;
            let b = vector(&j.word2)?;
            Some((j.score, a.similarity(b)))
        })
        .collect()
}

/// Evaluate one dataset against the loaded vectors
pub fn evaluate(dataset: &Dataset, vocab: &Vocabulary, store: &VectorStore) -> DatasetScore {
    let pairs = score_pairs(&dataset.judgments, vocab, store);
    let (coefficient, matched) = correlate(&pairs);

    tracing::debug!(
        "{}: {} of {} pairs matched, rho={:.3}",
        dataset.name,
        matched,
        dataset.judgments.len(),
        coefficient
    );

    DatasetScore {
        name: dataset.name.clone(),
        coefficient,
        total: dataset.judgments.len(),
        matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_judgments;
    use crate::store::BinaryVector;
    use std::io::Cursor;

    fn toy() -> (Vocabulary, VectorStore) {
        let mut vocab = Vocabulary::new();
        let mut store = VectorStore::with_width(8, 0).unwrap();
        for (word, bits) in [("cat", 0b0000_1111), ("dog", 0b0000_1110), ("car", 0b1111_0000)] {
            let id = vocab.insert_if_absent(word);
            store.insert(id, BinaryVector::new(vec![bits], 8).unwrap()).unwrap();
        }
        vocab.insert_if_absent("ghost");
        (vocab, store)
    }

    fn dataset(text: &str) -> Dataset {
        Dataset {
            name: "toy.txt".into(),
            judgments: read_judgments(Cursor::new(text), 3500).unwrap(),
        }
    }

    #[test]
    fn test_ranks_with_ties() {
        assert_eq!(ranks(&[10.0, 30.0, 20.0]), vec![0.0, 2.0, 1.0]);
        assert_eq!(ranks(&[1.0, 2.0, 2.0, 3.0]), vec![0.0, 1.5, 1.5, 3.0]);
    }

    #[test]
    fn test_spearman_monotonic() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((spearman(&xs, &[10.0, 20.0, 35.0, 100.0]) - 1.0).abs() < 1e-12);
        assert!((spearman(&xs, &[4.0, 3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_known_value() {
        // d = [0, -1, 1, 0, 0] → ρ = 1 - 6·2 / (5·24) = 0.9
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [1.0, 3.0, 2.0, 4.0, 5.0];
        assert!((spearman(&xs, &ys) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_degenerate() {
        assert!(spearman(&[], &[]).is_nan());
        assert!(spearman(&[1.0], &[2.0]).is_nan());
        assert!(spearman(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_two_point_scenario() {
        let (vocab, store) = toy();
        let score = evaluate(&dataset("cat dog 0.9\ncat car 0.1\n"), &vocab, &store);

        assert_eq!(score.matched, 2);
        assert_eq!(score.total, 2);
        assert!((score.coefficient - 1.0).abs() < 1e-12);
        assert_eq!(score.oov_percent(), 0.0);
    }

    #[test]
    fn test_oov_pairs_are_dropped_but_counted() {
        let (vocab, store) = toy();
        let text = "cat dog 0.9\nCAT car 0.1\ncat ghost 0.5\nzebra dog 0.3\n";
        let score = evaluate(&dataset(text), &vocab, &store);

        assert_eq!(score.total, 4);
        assert_eq!(score.matched, 2);
        assert!(score.matched <= score.total);
        assert_eq!(score.oov_percent(), 50.0);
    }

    #[test]
    fn test_all_oov() {
        let (vocab, store) = toy();
        let score = evaluate(&dataset("emu yak 1.0\nowl bat 2.0\n"), &vocab, &store);

        assert_eq!(score.matched, 0);
        assert_eq!(score.oov_percent(), 100.0);
        assert!(score.coefficient.is_nan());
    }

    #[test]
    fn test_empty_dataset() {
        let (vocab, store) = toy();
        let score = evaluate(&dataset(""), &vocab, &store);
        assert_eq!(score.total, 0);
        assert_eq!(score.oov_percent(), 0.0);
    }

    #[test]
    fn test_correlate_pairs() {
        let (rho, n) = correlate(&[(0.9, 0.875), (0.1, 0.0)]);
        assert_eq!(n, 2);
        assert!((rho - 1.0).abs() < 1e-12);
    }
}
