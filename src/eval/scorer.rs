// ============================================================
// Layer 5 — Scoring Engine
// ============================================================
// Compares a predictions collection with the ground truth of one
// split and produces an EvaluationReport.
//
// A prediction is correct when ANY of its first k candidates
// matches the ground-truth answer (top-k accuracy). In
// multiple-choice mode the model makes one discrete decision, so
// k is forced to 1.
//
// Steps:
//   1. Check the split may be scored (test answers are withheld
//      unless the deployment allows it)
//   2. Index the split's QA pairs by qa_id
//   3. For every prediction: resolve its pair (an unknown id
//      aborts the whole run), truncate to k, match, count
//   4. Fold counts into overall and per-category accuracy
//
// Nothing is reported for a run that aborts part-way.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::data::dataset::DatasetAccessor;
use crate::data::split_index::{TEST, TRAIN, VAL};
use crate::domain::error::{Result, VqaError};
use crate::domain::prediction::PredictionEntry;
use crate::domain::qa_pair::{QaId, QaPair};
use crate::eval::categorizer::{CategorySource, CategoryTally};
use crate::eval::matcher::AnswerMatching;
use crate::eval::report::{with_commas, EvaluationReport, Tally};

/// How often progress is logged, in evaluated pairs
const PROGRESS_EVERY: usize = 10_000;

/// Open-ended or multiple-choice evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalMode {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "mc")]
    MultipleChoice,
}

impl EvalMode {
    /// Short tag used in file names: "open" or "mc"
    pub fn tag(self) -> &'static str {
        match self {
            EvalMode::Open           => "open",
            EvalMode::MultipleChoice => "mc",
        }
    }
}

impl FromStr for EvalMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "open" => Ok(EvalMode::Open),
            "mc"   => Ok(EvalMode::MultipleChoice),
            other  => Err(format!("evaluation mode \"{other}\" is not supported (expected open or mc)")),
        }
    }
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Everything that changes how a run is scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Candidates examined per prediction
    pub top_k: usize,

    pub mode: EvalMode,

    pub matching: AnswerMatching,

    /// Per-category breakdown source; None disables it
    pub categories: Option<CategorySource>,

    /// Whether the test split may be scored locally
    pub allow_test_split: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_k:            1,
            mode:             EvalMode::Open,
            matching:         AnswerMatching::Tokens,
            categories:       None,
            allow_test_split: false,
        }
    }
}

/// Scores predictions against a loaded dataset
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// The top-k that will actually be applied
    pub fn effective_top_k(&self) -> usize {
        match self.config.mode {
            EvalMode::MultipleChoice => 1,
            EvalMode::Open           => self.config.top_k,
        }
    }

    fn check_scoreable(&self, dp: &DatasetAccessor, split: &str) -> Result<()> {
        if !dp.index().contains(split) {
            return Err(VqaError::UnknownSplit(split.to_string()));
        }
        let allowed = split == TRAIN
            || split == VAL
            || (split == TEST && self.config.allow_test_split);
        if allowed {
            Ok(())
        } else {
            Err(VqaError::SplitNotScoreable(split.to_string()))
        }
    }

    /// Score `predictions` against the ground truth of `split`.
    ///
    /// # Errors
    /// - `UnknownSplit` / `SplitNotScoreable` for a bad split
    /// - `UnknownQaId` if a prediction is not in the split
    /// - `Format` if a ground-truth record is malformed
    pub fn score(
        &self,
        dp:          &DatasetAccessor,
        split:       &str,
        predictions: &[PredictionEntry],
    ) -> Result<EvaluationReport> {
        match self.config.mode {
            EvalMode::MultipleChoice => {
                tracing::info!("Multiple-choice QA evaluation");
                if self.config.top_k != 1 {
                    tracing::warn!(
                        "top_k was {}; it is set to 1 for multiple-choice QA",
                        self.config.top_k
                    );
                }
            }
            EvalMode::Open => {
                tracing::info!("Open-ended QA evaluation");
                if self.config.top_k == 0 {
                    tracing::warn!("top_k is 0; no candidate is examined and nothing can match");
                }
            }
        }
        let top_k = self.effective_top_k();

        self.check_scoreable(dp, split)?;

        let pairs: HashMap<QaId, &QaPair> = dp
            .iter_qa_pairs(split)?
            .map(|p| p.map(|p| (p.qa_id, p)))
            .collect::<Result<_>>()?;

        let mut overall    = Tally::default();
        let mut categories = self.config.categories.map(CategoryTally::new);
        let mut skipped    = 0usize;

        for (idx, entry) in predictions.iter().enumerate() {
            let pair = pairs.get(&entry.qa_id).ok_or_else(|| VqaError::UnknownQaId {
                qa_id: entry.qa_id,
                split: split.to_string(),
            })?;

            match self.config.matching.any_match(pair, entry.top_k(top_k))? {
                Some(correct) => {
                    overall.record(correct);
                    if let Some(c) = categories.as_mut() {
                        c.record(pair, correct);
                    }
                }
                None => {
                    tracing::debug!("QA #{} has no ground-truth answer; skipped", entry.qa_id);
                    skipped += 1;
                }
            }

            if (idx + 1) % PROGRESS_EVERY == 0 {
                tracing::info!("Evaluated {} QA pairs...", with_commas(idx + 1));
            }
        }

        if skipped > 0 {
            tracing::info!("{} predictions had no ground-truth answer to compare", skipped);
        }

        Ok(EvaluationReport {
            split: split.to_string(),
            mode: self.config.mode,
            top_k,
            overall,
            accuracy: overall.accuracy().ok(),
            categories: categories.map(CategoryTally::finish).unwrap_or_default(),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::ImageRecord;

    fn dataset(tokenize: bool) -> DatasetAccessor {
        let images = vec![
            ImageRecord::new(1, "val", vec![
                QaPair::new(1, "What is it?", Some("A dog.")).with_category("object"),
                QaPair::new(2, "Where is it?", Some("On the sofa.")).with_category("place"),
            ]),
            ImageRecord::new(2, "val", vec![
                QaPair::new(3, "What color is it?", Some("Brown.")).with_category("object"),
                QaPair::new(4, "Who owns it?", None),
            ]),
            ImageRecord::new(3, "train", vec![QaPair::new(5, "Why?", Some("Because."))]),
            ImageRecord::new(4, "test", vec![QaPair::new(6, "How?", Some("Slowly."))]),
        ];
        DatasetAccessor::new(images, tokenize)
    }

    fn open(top_k: usize) -> Scorer {
        Scorer::new(ScoringConfig { top_k, ..ScoringConfig::default() })
    }

    #[test]
    fn test_single_exact_match() {
        let dp = dataset(true);
        let preds = vec![PredictionEntry::new(1, ["a dog"])];
        let report = open(1).score(&dp, "val", &preds).unwrap();
        assert_eq!(report.overall, Tally { correct: 1, total: 1 });
        assert_eq!(report.accuracy().unwrap(), 1.0);
    }

    #[test]
    fn test_top_k_truncation() {
        let dp = dataset(true);
        let preds = vec![PredictionEntry::new(
            1,
            ["a cat", "a bird", "a dog", "a fish", "a cow"],
        )];
        let report = open(2).score(&dp, "val", &preds).unwrap();
        assert_eq!(report.overall.correct, 0);

        let report = open(3).score(&dp, "val", &preds).unwrap();
        assert_eq!(report.overall.correct, 1);
    }

    #[test]
    fn test_zero_top_k_examines_nothing() {
        let dp = dataset(true);
        let scorer = open(0);
        assert_eq!(scorer.effective_top_k(), 0);

        let preds = vec![PredictionEntry::new(1, ["a dog"])];
        let report = scorer.score(&dp, "val", &preds).unwrap();
        assert_eq!(report.top_k, 0);
        assert_eq!(report.overall, Tally { correct: 0, total: 1 });
    }

    #[test]
    fn test_multiple_choice_forces_top_one() {
        let dp = dataset(true);
        let scorer = Scorer::new(ScoringConfig {
            top_k: 5,
            mode: EvalMode::MultipleChoice,
            ..ScoringConfig::default()
        });
        assert_eq!(scorer.effective_top_k(), 1);
        let preds = vec![PredictionEntry::new(1, ["A cat.", "A dog."])];
        let report = scorer.score(&dp, "val", &preds).unwrap();
        assert_eq!(report.top_k, 1);
        assert_eq!(report.overall.correct, 0);
    }

    #[test]
    fn test_unknown_qa_id_aborts() {
        let dp = dataset(true);
        let preds = vec![PredictionEntry::new(1, ["a dog"]), PredictionEntry::new(5, ["x"])];
        let err = open(1).score(&dp, "val", &preds).unwrap_err();
        assert!(matches!(err, VqaError::UnknownQaId { qa_id: 5, .. }));
    }

    #[test]
    fn test_no_comparable_pairs() {
        let dp = dataset(true);
        let report = open(1).score(&dp, "val", &[]).unwrap();
        assert!(report.accuracy.is_none());
        assert!(matches!(report.accuracy(), Err(VqaError::NoComparablePairs)));

        // a pair without an answer is not comparable either
        let preds = vec![PredictionEntry::new(4, ["Someone."])];
        let report = open(1).score(&dp, "val", &preds).unwrap();
        assert_eq!(report.overall.total, 0);
    }

    #[test]
    fn test_split_policy() {
        let dp = dataset(true);
        assert!(matches!(
            open(1).score(&dp, "test", &[]),
            Err(VqaError::SplitNotScoreable(_))
        ));
        assert!(matches!(
            open(1).score(&dp, "dev", &[]),
            Err(VqaError::UnknownSplit(_))
        ));
        assert!(open(1).score(&dp, "train", &[]).is_ok());

        let permissive = Scorer::new(ScoringConfig {
            allow_test_split: true,
            ..ScoringConfig::default()
        });
        let preds = vec![PredictionEntry::new(6, ["slowly"])];
        assert_eq!(permissive.score(&dp, "test", &preds).unwrap().overall.correct, 1);
    }

    #[test]
    fn test_lexical_categories() {
        let dp = dataset(true);
        let scorer = Scorer::new(ScoringConfig {
            categories: Some(CategorySource::Lexical),
            ..ScoringConfig::default()
        });
        let preds = vec![
            PredictionEntry::new(1, ["a dog"]),
            PredictionEntry::new(2, ["in the yard"]),
            PredictionEntry::new(3, ["brown"]),
        ];
        let report = scorer.score(&dp, "val", &preds).unwrap();
        let rows: Vec<(&str, usize, usize)> = report
            .categories
            .iter()
            .map(|c| (c.category.as_str(), c.correct, c.total))
            .collect();
        assert_eq!(rows, vec![("what", 2, 2), ("where", 0, 1)]);
    }

    #[test]
    fn test_contractions_count_under_their_question_word() {
        let dp = DatasetAccessor::new(
            vec![ImageRecord::new(1, "val", vec![
                QaPair::new(1, "What's on the table?", Some("A cup.")),
                QaPair::new(2, "Who's there?", Some("A man.")),
                QaPair::new(3, "What is it?", Some("A dog.")),
            ])],
            true,
        );
        let scorer = Scorer::new(ScoringConfig {
            categories: Some(CategorySource::Lexical),
            ..ScoringConfig::default()
        });
        let preds = vec![
            PredictionEntry::new(1, ["a cup"]),
            PredictionEntry::new(2, ["a man"]),
            PredictionEntry::new(3, ["a dog"]),
        ];
        let report = scorer.score(&dp, "val", &preds).unwrap();
        let rows: Vec<(&str, usize)> = report
            .categories
            .iter()
            .map(|c| (c.category.as_str(), c.total))
            .collect();
        assert_eq!(rows, vec![("what", 2), ("who", 1)]);
        assert_eq!(report.overall.total, 3);
    }

    #[test]
    fn test_explicit_categories_with_case_insensitive_matching() {
        let dp = dataset(false);
        let scorer = Scorer::new(ScoringConfig {
            matching: AnswerMatching::CaseInsensitive,
            categories: Some(CategorySource::Explicit),
            ..ScoringConfig::default()
        });
        let preds = vec![
            PredictionEntry::new(1, ["a dog."]),
            PredictionEntry::new(2, ["on the sofa"]),
        ];
        let report = scorer.score(&dp, "val", &preds).unwrap();
        assert_eq!(report.overall, Tally { correct: 1, total: 2 });
        assert_eq!(report.categories[0].category, "object");
        assert_eq!(report.categories[1].category, "place");
        assert_eq!(report.categories[1].correct, 0);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("mc".parse::<EvalMode>().unwrap(), EvalMode::MultipleChoice);
        assert_eq!("open".parse::<EvalMode>().unwrap().to_string(), "open");
        assert!("closed".parse::<EvalMode>().is_err());
    }

    #[test]
    fn test_partial_predictions_are_fine() {
        let dp = dataset(true);
        let preds = vec![PredictionEntry::new(3, ["Brown."])];
        let report = open(1).score(&dp, "val", &preds).unwrap();
        assert_eq!(report.overall.total, 1);
        assert_eq!(report.accuracy, Some(1.0));
    }
}
