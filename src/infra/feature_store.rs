// ============================================================
// Layer 6 — Feature Store
// ============================================================
// Loads the per-image visual feature matrix and answers lookups
// by image id.
//
// File layout (features.json):
//   {
//     "features":  [[...], [...], ...],   ← D rows, one per dimension
//     "image_ids": [101, 102, ...]        ← N ids, one per column
//   }
//
//   The matrix is D × N: column j is the feature vector of
//   image_ids[j]. Every row must therefore hold exactly N values.
//
// The vectors are opaque here: no normalisation, no reshaping.
// The whole matrix is held in memory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

use crate::domain::error::{self, VqaError};
use crate::domain::image::ImageId;
use crate::domain::traits::FeatureLookup;

#[derive(Debug, Deserialize)]
struct FeatureFile {
    features:  Vec<Vec<f32>>,
    image_ids: Vec<ImageId>,
}

/// In-memory feature matrix with an image id → column map
#[derive(Debug, Clone)]
pub struct FeatureStore {
    /// Row-major D × N matrix
    rows:   Vec<Vec<f32>>,
    /// Image id → column index
    column: HashMap<ImageId, usize>,
}

impl FeatureStore {
    /// Build a store from a D × N matrix and its N column ids.
    ///
    /// # Errors
    /// `VqaError::InvalidFeatureMatrix` if a row does not have one
    /// value per image id.
    pub fn new(rows: Vec<Vec<f32>>, image_ids: Vec<ImageId>) -> error::Result<Self> {
        if let Some((r, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != image_ids.len())
        {
            return Err(VqaError::InvalidFeatureMatrix(format!(
                "row {} has {} values but there are {} image ids",
                r,
                row.len(),
                image_ids.len()
            )));
        }

        let column = image_ids
            .into_iter()
            .enumerate()
            .map(|(j, id)| (id, j))
            .collect();

        Ok(Self { rows, column })
    }

    /// Read a feature file from disk
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Reading image features from '{}'", path.display());

        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read feature file '{}'", path.display()))?;
        let file: FeatureFile = serde_json::from_str(&text)
            .with_context(|| format!("Malformed feature file '{}'", path.display()))?;

        let store = Self::new(file.features, file.image_ids)
            .with_context(|| format!("Invalid feature file '{}'", path.display()))?;

        tracing::info!(
            "Loaded {}-dimensional features for {} images",
            store.dim(),
            store.len()
        );
        Ok(store)
    }

    /// Feature dimension (number of rows)
    pub fn dim(&self) -> usize {
        self.rows.len()
    }

    /// Number of images with a feature column
    pub fn len(&self) -> usize {
        self.column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column.is_empty()
    }
}

impl FeatureLookup for FeatureStore {
    fn feature_column(&self, image_id: ImageId) -> error::Result<Vec<f32>> {
        let j = *self
            .column
            .get(&image_id)
            .ok_or(VqaError::FeatureNotFound(image_id))?;
        Ok(self.rows.iter().map(|row| row[j]).collect())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_column_lookup() {
        // 2 dims × 3 images
        let store = FeatureStore::new(
            vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]],
            vec![7, 8, 9],
        )
        .unwrap();
        assert_eq!(store.dim(), 2);
        assert_eq!(store.len(), 3);
        assert_eq!(store.feature_column(8).unwrap(), vec![2.0, 20.0]);
    }

    #[test]
    fn test_unknown_image_is_an_error() {
        let store = FeatureStore::new(vec![vec![1.0]], vec![1]).unwrap();
        assert!(matches!(
            store.feature_column(2),
            Err(VqaError::FeatureNotFound(2))
        ));
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let err = FeatureStore::new(vec![vec![1.0, 2.0], vec![1.0]], vec![1, 2]).unwrap_err();
        assert!(matches!(err, VqaError::InvalidFeatureMatrix(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"features": [[0.5, 1.5]], "image_ids": [4, 5]}}"#).unwrap();
        let store = FeatureStore::load(f.path()).unwrap();
        assert_eq!(store.feature_column(5).unwrap(), vec![1.5]);
    }
}
