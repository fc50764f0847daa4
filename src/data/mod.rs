// ============================================================
// Layer 4 — Dataset Access Layer
// ============================================================
// Everything between the dataset file on disk and the views the
// scorer and the baselines iterate over.
//
//   dataset.json
//       │
//       ▼
//   JsonDatasetLoader   → parses image records in one shot
//       │
//       ▼
//   SplitIndex          → groups images by train/val/test
//       │
//       ▼
//   DatasetAccessor     → sampling and lazy iteration, tokens and
//       │                 features attached on first access
//       ├── Tokenizer         (normalised word sequences)
//       ├── MultipleChoice    (answer mixed into distractors)
//       └── QaBatcher         (fixed-size batches)

/// Reads dataset.json into image records
pub mod loader;

/// Question/answer text normalisation
pub mod tokenizer;

/// Split name → image positions
pub mod split_index;

/// Multiple-choice candidate assembly
pub mod multiple_choice;

/// Sampling and iteration over a loaded dataset
pub mod dataset;

/// Batching adapter for pair iteration
pub mod batcher;
