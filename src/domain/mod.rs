// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing a VQA benchmark:
// images, QA pairs, predictions, and the errors the core raises.
//
// Rules for this layer:
//   - NO file I/O
//   - NO randomness
//   - Only structs, enums, and traits
//
// Derived data (tokens, feature vectors) is cached on the
// records through explicit ensure_* accessors rather than by
// mutating shared structures behind the caller's back.

/// Error taxonomy of the dataset and scoring core
pub mod error;

/// An image record with its QA pairs and optional features
pub mod image;

/// A question/answer pair with cached token sequences
pub mod qa_pair;

/// Ranked candidate answers submitted for scoring
pub mod prediction;

/// Seams to loaders, feature stores and predictors
pub mod traits;
