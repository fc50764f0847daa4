// ============================================================
// Layer 2 — Dataset Configuration
// ============================================================
// Where a dataset lives and which flavour of it we are reading.
//
// Directory convention:
//   datasets/
//     visual7w-telling/
//       dataset.json      ← images + QA pairs
//       features.json     ← optional feature matrix
//
// Two dataset variants exist and disagree on two points, so the
// variant is configuration rather than a guess:
//
//   variant   answer matching      categories        tokenized
//   ───────   ──────────────────   ───────────────   ─────────
//   telling   token sequences      leading W-word    yes
//   labeled   case-insensitive     `type` field      no

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

use crate::data::dataset::DatasetAccessor;
use crate::data::loader::JsonDatasetLoader;
use crate::eval::categorizer::CategorySource;
use crate::eval::matcher::AnswerMatching;
use crate::infra::feature_store::FeatureStore;

/// Dataset flavour, selecting matching and category policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetVariant {
    Telling,
    Labeled,
}

impl DatasetVariant {
    pub fn matching(self) -> AnswerMatching {
        match self {
            DatasetVariant::Telling => AnswerMatching::Tokens,
            DatasetVariant::Labeled => AnswerMatching::CaseInsensitive,
        }
    }

    pub fn category_source(self) -> CategorySource {
        match self {
            DatasetVariant::Telling => CategorySource::Lexical,
            DatasetVariant::Labeled => CategorySource::Explicit,
        }
    }

    /// Whether records are tokenized as they are accessed
    pub fn tokenizes(self) -> bool {
        matches!(self, DatasetVariant::Telling)
    }
}

impl FromStr for DatasetVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "telling" => Ok(DatasetVariant::Telling),
            "labeled" | "labelled" => Ok(DatasetVariant::Labeled),
            other => Err(format!("unknown dataset variant '{other}' (expected telling or labeled)")),
        }
    }
}

impl fmt::Display for DatasetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatasetVariant::Telling => "telling",
            DatasetVariant::Labeled => "labeled",
        })
    }
}

/// How to find and open a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name, e.g. "visual7w-telling"
    pub dataset: String,

    /// Root directory; defaults to datasets/<dataset>
    pub dataset_root: Option<String>,

    /// Load the feature matrix alongside the dataset
    pub load_features: bool,

    pub variant: DatasetVariant,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset:       "visual7w-telling".to_string(),
            dataset_root:  None,
            load_features: false,
            variant:       DatasetVariant::Telling,
        }
    }
}

impl DatasetConfig {
    /// Directory holding the dataset files
    pub fn root(&self) -> PathBuf {
        match &self.dataset_root {
            Some(root) => PathBuf::from(root),
            None       => PathBuf::from("datasets").join(&self.dataset),
        }
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.root().join("dataset.json")
    }

    pub fn features_path(&self) -> PathBuf {
        self.root().join("features.json")
    }

    /// Load the dataset (and features, if requested) into an accessor
    pub fn open(&self) -> Result<DatasetAccessor> {
        tracing::info!("Initializing data provider for dataset {}...", self.dataset);

        let loader = JsonDatasetLoader::new(self.dataset_path());
        let dp = DatasetAccessor::from_source(&loader, self.variant.tokenizes())
            .with_context(|| format!("Cannot load dataset '{}'", self.dataset))?;

        if !self.load_features {
            return Ok(dp);
        }

        let store = FeatureStore::load(&self.features_path())?;
        Ok(dp.with_features(store))
    }
}
