// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Orchestrates one scoring run:
//
//   Step 1: Load the dataset, without features  (Layer 4 - data)
//   Step 2: Load the predictions file           (Layer 6 - infra)
//   Step 3: Score against the chosen split      (Layer 5 - eval)
//   Step 4: Log the report                      (Layer 5 - eval)
//   Step 5: Save the summary, if asked          (Layer 6 - infra)
//
// Any failure aborts the run before a report is produced.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::config::DatasetConfig;
use crate::eval::report::EvaluationReport;
use crate::eval::scorer::{EvalMode, Scorer, ScoringConfig};
use crate::infra::{predictions::load_predictions, report_writer::ReportWriter};

// ─── Evaluation Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub dataset:          DatasetConfig,
    pub results:          String,
    pub split:            String,
    pub mode:             EvalMode,
    pub top_k:            usize,
    pub verbose:          bool,
    pub output_path:      Option<String>,
    pub allow_test_split: bool,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            dataset:          DatasetConfig::default(),
            results:          "results/result_visual7w-telling_open.json".to_string(),
            split:            "val".to_string(),
            mode:             EvalMode::Open,
            top_k:            1,
            verbose:          false,
            output_path:      None,
            allow_test_split: false,
        }
    }
}

impl EvaluateConfig {
    /// Scorer settings implied by this run and the dataset variant
    pub fn scoring(&self) -> ScoringConfig {
        let variant = self.dataset.variant;
        ScoringConfig {
            top_k:            self.top_k,
            mode:             self.mode,
            matching:         variant.matching(),
            categories:       self.verbose.then(|| variant.category_source()),
            allow_test_split: self.allow_test_split,
        }
    }
}

// ─── EvaluateUseCase ─────────────────────────────────────────────────────────
pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    /// Run the evaluation and return the report
    pub fn execute(&self) -> Result<EvaluationReport> {
        let cfg = &self.config;

        // ── Step 1: Dataset (feature files are never needed here) ────────────
        let dataset_cfg = DatasetConfig { load_features: false, ..cfg.dataset.clone() };
        let dp = dataset_cfg.open()?;

        // ── Step 2: Predictions ──────────────────────────────────────────────
        let predictions = load_predictions(Path::new(&cfg.results))?;

        // ── Step 3: Score ────────────────────────────────────────────────────
        let scorer = Scorer::new(cfg.scoring());
        let report = scorer
            .score(&dp, &cfg.split, &predictions)
            .with_context(|| format!("Evaluation of '{}' failed", cfg.results))?;

        // ── Step 4: Log ──────────────────────────────────────────────────────
        tracing::info!("Done!");
        report.log();

        // ── Step 5: Save summary ─────────────────────────────────────────────
        if let Some(dir) = &cfg.output_path {
            let path = ReportWriter::new(dir).write(&cfg.dataset.dataset, &report)?;
            tracing::info!("Evaluation summary saved to '{}'", path.display());
        }

        Ok(report)
    }
}
