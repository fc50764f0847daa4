// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case opens the dataset,
// calls into the data, eval and infra layers in order, and hands
// a result back to the CLI.
//
// Rules for this layer:
//   - No scoring or tokenization logic here
//   - No printing here (that's Layer 1)
//   - No clap types: configs are plain serde structs

// Dataset location and variant
pub mod config;

// Scoring a predictions file
pub mod evaluate_use_case;

// Writing baseline predictions
pub mod baseline_use_case;

// Split sizes and a sampled test
pub mod stats_use_case;
