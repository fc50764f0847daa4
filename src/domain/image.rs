// ============================================================
// Layer 3 — Image Domain Type
// ============================================================
// One image of the dataset, the split it belongs to, and all
// the questions asked about it.
//
// The visual feature vector is opaque to this crate. It lives in
// a separate matrix file and is attached at most once, on first
// access, through ensure_features().

use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

use crate::domain::error::Result;
use crate::domain::qa_pair::QaPair;
use crate::domain::traits::FeatureLookup;

/// Dataset-wide unique image identifier
pub type ImageId = u64;

/// An image record as stored in the dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_id: ImageId,

    /// Split label: "train", "val" or "test"
    pub split: String,

    /// Image file name, kept for traceability only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Questions about this image, in file order
    #[serde(default)]
    pub qa_pairs: Vec<QaPair>,

    #[serde(skip)]
    features: OnceCell<Vec<f32>>,
}

impl ImageRecord {
    /// Create an image record with the given pairs
    pub fn new(image_id: ImageId, split: impl Into<String>, qa_pairs: Vec<QaPair>) -> Self {
        Self {
            image_id,
            split: split.into(),
            filename: None,
            qa_pairs,
            features: OnceCell::new(),
        }
    }

    /// Attach the feature vector on first call; later calls return
    /// the cached vector without touching the lookup.
    ///
    /// # Errors
    /// `VqaError::FeatureNotFound` if the lookup has no column for this image.
    pub fn ensure_features(&self, lookup: &dyn FeatureLookup) -> Result<&[f32]> {
        if let Some(f) = self.features.get() {
            return Ok(f);
        }
        let column = lookup.feature_column(self.image_id)?;
        Ok(self.features.get_or_init(|| column))
    }

    /// The attached feature vector, if any
    pub fn features(&self) -> Option<&[f32]> {
        self.features.get().map(Vec::as_slice)
    }
}
