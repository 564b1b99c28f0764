//! Console and JSON rendering of evaluation results

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use bitsim_core::DatasetScore;

/// Wall-clock time spent in one phase of a run
#[derive(Debug, Clone, Serialize)]
pub struct PhaseTiming {
    pub phase: &'static str,
    pub seconds: f64,
}

impl PhaseTiming {
    pub fn new(phase: &'static str, elapsed: Duration) -> Self {
        Self {
            phase,
            seconds: elapsed.as_secs_f64(),
        }
    }
}

/// Full result of an evaluation run
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub embedding: String,
    pub bits: usize,
    pub vocabulary: usize,
    pub vectors: usize,
    pub datasets: Vec<DatasetScore>,
    pub timings: Vec<PhaseTiming>,
}

impl EvaluationReport {
    /// `Dataset | Spearman | OOV` table, one row per dataset
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<12} | {:<8} | {:>3}", "Dataset", "Spearman", "OOV");
        let _ = writeln!(out, "{}", "=".repeat(30));
        for score in &self.datasets {
            let _ = writeln!(
                out,
                "{:<12} | {:>8.3} | {:>3.0}%",
                score.name,
                score.coefficient,
                score.oov_percent().floor()
            );
        }
        out
    }

    /// Per-phase timing lines
    pub fn render_timings(&self) -> String {
        self.timings
            .iter()
            .map(|t| format!("{}(): {:.6}s\n", t.phase, t.seconds))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> EvaluationReport {
        EvaluationReport {
            embedding: "vectors.txt".into(),
            bits: 256,
            vocabulary: 10,
            vectors: 8,
            datasets: vec![
                DatasetScore {
                    name: "MEN".into(),
                    coefficient: 0.6312,
                    total: 4,
                    matched: 3,
                },
                DatasetScore {
                    name: "empty".into(),
                    coefficient: f64::NAN,
                    total: 0,
                    matched: 0,
                },
            ],
            timings: vec![PhaseTiming::new("evaluate", Duration::from_millis(1500))],
        }
    }

    #[test]
    fn test_table_rows() {
        let table = report().render_table();
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines[0], "Dataset      | Spearman | OOV");
        assert_eq!(lines[2], "MEN          |    0.631 |  25%");
        assert_eq!(lines[3], "empty        |      NaN |   0%");
    }

    #[test]
    fn test_oov_percent_truncates() {
        let mut report = report();
        report.datasets = vec![DatasetScore {
            name: "RW".into(),
            coefficient: 0.5,
            total: 3,
            matched: 1,
        }];

        let table = report.render_table();
        assert_eq!(table.lines().nth(2), Some("RW           |    0.500 |  66%"));
    }

    #[test]
    fn test_timings() {
        assert_eq!(report().render_timings(), "evaluate(): 1.500000s\n");
    }

    #[test]
    fn test_json_nan_is_null() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["bits"], 256);
        assert_eq!(json["datasets"][0]["matched"], 3);
        assert!(json["datasets"][1]["coefficient"].is_null());
    }
}
