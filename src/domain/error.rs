// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Every structural failure the core can hit has its own variant.
// None of them are transient, so nothing here is retried: the
// top-level operation aborts and the message names the record,
// split or identifier that caused it.
//
// The application layer wraps these in anyhow::Error and adds
// file-level context; the core only ever returns VqaError.

use thiserror::Error;

use crate::domain::image::ImageId;
use crate::domain::qa_pair::QaId;

/// Errors raised by the dataset access layer and the scoring engine
#[derive(Debug, Error)]
pub enum VqaError {
    /// Source text is missing its required terminal punctuation
    #[error("malformed text {text:?}: expected terminal '{expected}'")]
    Format { text: String, expected: char },

    /// The split name is not present in the dataset
    #[error("unknown split '{0}'")]
    UnknownSplit(String),

    /// The split exists but may not be scored in this deployment
    #[error("split '{0}' cannot be scored here (test answers are withheld; use the evaluation server)")]
    SplitNotScoreable(String),

    /// Feature lookup miss: the image has no column in the feature matrix
    #[error("no feature column for image {0}: dataset and feature file are inconsistent")]
    FeatureNotFound(ImageId),

    /// The feature file is structurally broken
    #[error("invalid feature matrix: {0}")]
    InvalidFeatureMatrix(String),

    /// A prediction references a QA pair that is not in the scored split
    #[error("cannot find QA #{qa_id} in split '{split}'. Are you using the correct split?")]
    UnknownQaId { qa_id: QaId, split: String },

    /// Nothing could be compared, so accuracy is undefined
    #[error("no comparable QA pairs found")]
    NoComparablePairs,
}

/// Result type for core dataset and scoring operations
pub type Result<T> = std::result::Result<T, VqaError>;
