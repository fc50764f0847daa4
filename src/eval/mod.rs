// ============================================================
// Layer 5 — Scoring Engine
// ============================================================
// Turns a predictions collection plus the ground truth of one
// split into accuracy numbers.
//
//   predictions.json ──┐
//                      ├──▶ Scorer ──▶ EvaluationReport
//   DatasetAccessor ───┘      │
//                             ├── AnswerMatching  (is it right?)
//                             └── CategoryTally   (which kind?)

/// Top-k scoring over one split
pub mod scorer;

/// Token-sequence and case-insensitive answer comparison
pub mod matcher;

/// Lexical and explicit question categories
pub mod categorizer;

/// Counters and the final report
pub mod report;
