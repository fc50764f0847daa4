// ============================================================
// Layer 6 — Report Writer
// ============================================================
// Saves the structured evaluation summary next to the logs so a
// run can be compared with later ones.
//
// Output file: <output_dir>/evaluation_<dataset>_<mode>.json
//
// Example:
//   {
//     "dataset": "visual7w-telling",
//     "split": "val",
//     "mode": "open",
//     "top_k": 1,
//     "correct": 14923,
//     "total": 42031,
//     "accuracy": 0.355,
//     "categories": [ { "category": "what", ... } ]
//   }

use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs, path::PathBuf};

use crate::eval::report::EvaluationReport;

#[derive(Serialize)]
struct Summary<'a> {
    dataset: &'a str,
    #[serde(flatten)]
    report:  &'a EvaluationReport,
}

/// Writes evaluation summaries as pretty JSON
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the summary and return the file it went to
    pub fn write(&self, dataset: &str, report: &EvaluationReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create output directory '{}'", self.dir.display()))?;

        let path = self
            .dir
            .join(format!("evaluation_{}_{}.json", dataset, report.mode.tag()));

        let summary = Summary { dataset, report };
        fs::write(&path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("Cannot write report '{}'", path.display()))?;

        tracing::debug!("Wrote evaluation summary to '{}'", path.display());
        Ok(path)
    }
}
