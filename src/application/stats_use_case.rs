// ============================================================
// Layer 2 — StatsUseCase
// ============================================================
// A quick look at a dataset before using it: how many images and
// QA pairs each split holds, and one sampled multiple-choice test
// rendered exactly as a model would see it.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::application::config::DatasetConfig;
use crate::data::dataset::SizeUnit;

/// Counts for one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitStats {
    pub split:    String,
    pub images:   usize,
    pub qa_pairs: usize,
}

/// One sampled multiple-choice test, owned for display
#[derive(Debug, Clone)]
pub struct SampledTest {
    pub image_id:   u64,
    pub question:   String,
    pub candidates: Vec<String>,
    pub selection:  Option<usize>,
}

/// Everything the stats command reports
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub splits: Vec<SplitStats>,
    pub sample: Option<SampledTest>,
}

pub struct StatsUseCase {
    dataset:      DatasetConfig,
    sample_split: String,
    seed:         u64,
}

impl StatsUseCase {
    pub fn new(dataset: DatasetConfig, sample_split: impl Into<String>, seed: u64) -> Self {
        Self { dataset, sample_split: sample_split.into(), seed }
    }

    pub fn execute(&self) -> Result<DatasetStats> {
        let dp = self.dataset.open()?;

        let mut splits = Vec::new();
        for name in dp.index().names() {
            let stats = SplitStats {
                split:    name.to_string(),
                images:   dp.split_size(name, SizeUnit::Images)?,
                qa_pairs: dp.split_size(name, SizeUnit::QaPairs)?,
            };
            tracing::info!(
                "Split '{}': {} images, {} QA pairs",
                stats.split,
                stats.images,
                stats.qa_pairs
            );
            splits.push(stats);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let sample = dp
            .sample_image_qa_multiple_choice(&self.sample_split, true, &mut rng)?
            .map(|s| SampledTest {
                image_id:   s.image.image_id,
                question:   s.mc.qa_pair.question.clone(),
                candidates: s
                    .mc
                    .choices
                    .as_ref()
                    .map(|mc| mc.candidates.iter().map(|c| c.to_string()).collect())
                    .unwrap_or_default(),
                selection:  s.mc.choices.as_ref().and_then(|mc| mc.selection),
            });

        Ok(DatasetStats { splits, sample })
    }
}
