// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between the core and its collaborators:
//
//   DatasetSource   — where image records come from
//                     (JsonDatasetLoader reads dataset.json)
//   FeatureLookup   — where per-image feature vectors come from
//                     (FeatureStore reads the feature matrix)
//   Predictor       — anything that turns QA pairs into ranked
//                     candidate answers (the baselines, or an
//                     external model whose output was saved)
//
// The accessor and scorer only see these traits, so tests can
// plug in small in-memory implementations.

use anyhow::Result;

use crate::domain::error;
use crate::domain::image::{ImageId, ImageRecord};
use crate::domain::prediction::PredictionEntry;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Any component that can produce the full list of image records.
pub trait DatasetSource {
    /// Load every image record, in file order.
    fn load_images(&self) -> Result<Vec<ImageRecord>>;
}

// ─── FeatureLookup ────────────────────────────────────────────────────────────
/// Maps an image id to its opaque visual feature vector.
pub trait FeatureLookup {
    /// Return the feature column for `image_id`.
    ///
    /// A miss is `VqaError::FeatureNotFound`, never a default vector.
    fn feature_column(&self, image_id: ImageId) -> error::Result<Vec<f32>>;
}

// ─── Predictor ────────────────────────────────────────────────────────────────
/// Produces a predictions collection for one split.
pub trait Predictor {
    /// Short name used in logs, e.g. "open-most-frequent"
    fn name(&self) -> &'static str;

    /// Predict ranked candidates for every QA pair of the split
    fn predict(&mut self) -> Result<Vec<PredictionEntry>>;
}
