// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Reads the dataset description file into memory in one shot.
//
// Expected layout (dataset.json):
//   {
//     "images": [
//       { "image_id": 2354786, "split": "train", "filename": "v7w_2354786.jpg",
//         "qa_pairs": [
//           { "qa_id": 986, "question": "Where is the cat?",
//             "answer": "On the sofa.",
//             "multiple_choices": ["On the floor.", "Outside.", "In a box."],
//             "type": "where" }
//         ] },
//       ...
//     ]
//   }
//
// Unknown fields are ignored so richer dataset files still load.
// The whole file is parsed before anything is returned; there is
// no streaming mode.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::domain::image::ImageRecord;
use crate::domain::traits::DatasetSource;

/// Top-level object of the dataset file
#[derive(Debug, Deserialize)]
struct DatasetFile {
    images: Vec<ImageRecord>,
}

/// Loads image records from a dataset JSON file.
/// Implements the DatasetSource trait from Layer 3.
pub struct JsonDatasetLoader {
    path: PathBuf,
}

impl JsonDatasetLoader {
    /// Create a loader for the given dataset file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for JsonDatasetLoader {
    fn load_images(&self) -> Result<Vec<ImageRecord>> {
        tracing::info!("Reading dataset from '{}'", self.path.display());

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read dataset file '{}'", self.path.display()))?;

        let file: DatasetFile = serde_json::from_str(&text)
            .with_context(|| format!("Malformed dataset file '{}'", self.path.display()))?;

        let pairs: usize = file.images.iter().map(|img| img.qa_pairs.len()).sum();
        tracing::info!("Loaded {} images with {} QA pairs", file.images.len(), pairs);

        Ok(file.images)
    }
}

/// In-memory source, handy for tests and for callers that
/// already hold the records.
impl DatasetSource for Vec<ImageRecord> {
    fn load_images(&self) -> Result<Vec<ImageRecord>> {
        Ok(self.clone())
    }
}
