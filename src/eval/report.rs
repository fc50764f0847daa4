// ============================================================
// Layer 5 — Evaluation Report
// ============================================================
// The outcome of one scoring run.
//
// Example log output:
//   Evaluated on 42,031 QA pairs with top-1 predictions.
//   Overall accuracy = 0.355
//   Question type "what" accuracy = 0.383 (6,543 / 17,097)
//   ...
//
// Accuracy is correct / total. With total = 0 it is undefined:
// accuracy() returns VqaError::NoComparablePairs and the caller
// reports "no comparable QA pairs found" instead of a NaN.

use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, VqaError};
use crate::eval::scorer::EvalMode;

/// A correct/total counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: usize,
    pub total:   usize,
}

impl Tally {
    /// Count one scored pair
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// correct / total, or NoComparablePairs when nothing was counted
    pub fn accuracy(&self) -> Result<f64> {
        if self.total == 0 {
            return Err(VqaError::NoComparablePairs);
        }
        Ok(self.correct as f64 / self.total as f64)
    }
}

/// One row of the per-category table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAccuracy {
    pub category: String,
    pub correct:  usize,
    pub total:    usize,
    pub accuracy: f64,
}

/// Complete result of a scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub split: String,
    pub mode:  EvalMode,

    /// The top-k actually applied (1 in multiple-choice mode)
    pub top_k: usize,

    #[serde(flatten)]
    pub overall: Tally,

    /// None when no pair could be compared
    pub accuracy: Option<f64>,

    /// Empty unless categorisation was requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryAccuracy>,
}

impl EvaluationReport {
    /// Overall accuracy.
    ///
    /// # Errors
    /// `VqaError::NoComparablePairs` if no pair was evaluated.
    pub fn accuracy(&self) -> Result<f64> {
        self.overall.accuracy()
    }

    /// Emit the report through tracing
    pub fn log(&self) {
        match self.accuracy() {
            Ok(acc) => {
                tracing::info!(
                    "Evaluated on {} QA pairs with top-{} predictions.",
                    with_commas(self.overall.total),
                    self.top_k
                );
                tracing::info!("Overall accuracy = {:.3}", acc);
            }
            Err(e) => tracing::warn!("Split '{}': {}", self.split, e),
        }

        for c in &self.categories {
            tracing::info!(
                "Question type \"{}\" accuracy = {:.3} ({} / {})",
                c.category,
                c.accuracy,
                with_commas(c.correct),
                with_commas(c.total)
            );
        }
    }
}

/// Format a count with thousands separators: 42031 → "42,031"
pub fn with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_accuracy() {
        let mut t = Tally::default();
        t.record(true);
        t.record(false);
        t.record(true);
        t.record(true);
        assert_eq!(t, Tally { correct: 3, total: 4 });
        assert!((t.accuracy().unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_empty_tally_is_no_data() {
        assert!(matches!(
            Tally::default().accuracy(),
            Err(VqaError::NoComparablePairs)
        ));
    }

    #[test]
    fn test_with_commas() {
        assert_eq!(with_commas(0), "0");
        assert_eq!(with_commas(999), "999");
        assert_eq!(with_commas(1000), "1,000");
        assert_eq!(with_commas(42031), "42,031");
        assert_eq!(with_commas(1234567), "1,234,567");
    }

    #[test]
    fn test_report_json_shape() {
        let report = EvaluationReport {
            split:      "val".into(),
            mode:       EvalMode::Open,
            top_k:      1,
            overall:    Tally { correct: 1, total: 2 },
            accuracy:   Some(0.5),
            categories: Vec::new(),
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["correct"], 1);
        assert_eq!(v["total"], 2);
        assert_eq!(v["mode"], "open");
        assert!(v.get("categories").is_none());
    }
}
