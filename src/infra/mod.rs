// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-backed collaborators of the core:
//
//   feature_store.rs  — Per-image visual feature matrix.
//                       Loaded once, looked up by image id.
//
//   predictions.rs    — Reads submitted predictions and writes
//                       the ones produced by baselines.
//
//   report_writer.rs  — Saves evaluation summaries as JSON.
//
// All loads are one-shot: open, parse fully, close.

/// Feature matrix loading and lookup
pub mod feature_store;

/// Predictions file reading and writing
pub mod predictions;

/// Evaluation summary output
pub mod report_writer;
