// ============================================================
// Layer 6 — Predictions File I/O
// ============================================================
// Reads the predictions collection submitted for scoring, and
// writes the ones produced by the baseline predictors.
//
// File naming convention for baselines:
//   results/
//     result_<dataset>_open.json   ← open-ended predictions
//     result_<dataset>_mc.json     ← multiple-choice predictions

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::prediction::PredictionEntry;

/// Load a predictions JSON array from disk
pub fn load_predictions(path: &Path) -> Result<Vec<PredictionEntry>> {
    if !path.is_file() {
        anyhow::bail!("Cannot read result file from '{}'", path.display());
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read result file '{}'", path.display()))?;
    let entries: Vec<PredictionEntry> = serde_json::from_str(&text)
        .with_context(|| format!("Malformed result file '{}'", path.display()))?;

    tracing::info!("Loaded {} predictions from '{}'", entries.len(), path.display());
    Ok(entries)
}

/// Path of a baseline result file inside `result_dir`
pub fn result_path(result_dir: &Path, dataset: &str, mode_tag: &str) -> PathBuf {
    result_dir.join(format!("result_{dataset}_{mode_tag}.json"))
}

/// Write predictions as pretty JSON, creating the directory if needed
pub fn save_predictions(path: &Path, entries: &[PredictionEntry]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;
    }

    tracing::info!("Writing {} predictions to '{}'", entries.len(), path.display());
    fs::write(path, serde_json::to_string_pretty(entries)?)
        .with_context(|| format!("Cannot write result file '{}'", path.display()))?;
    Ok(())
}
