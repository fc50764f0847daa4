// ============================================================
// Layer 2 — Baseline Predictors
// ============================================================
// Simple reference predictors, built only on the public dataset
// API, that write a predictions file the scorer can consume.
//
//   open  + telling   → OpenMostFrequent
//                       the top-k most frequent training answers,
//                       the same list for every question
//   mc    + telling   → McMostFrequent
//                       the candidate seen most often as a training
//                       answer (first candidate wins ties)
//   mc    + pointing  → McRandomGuess
//                       a uniformly random candidate; box-id
//                       answers are read as text, so pointing
//                       datasets are opened with the labeled variant
//
// Multiple-choice baselines read shuffled candidate lists, so the
// answer's position carries no signal. A seed makes runs
// reproducible.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::application::config::DatasetConfig;
use crate::data::dataset::DatasetAccessor;
use crate::data::split_index::TRAIN;
use crate::domain::prediction::PredictionEntry;
use crate::domain::traits::Predictor;
use crate::eval::scorer::EvalMode;
use crate::infra::predictions::{result_path, save_predictions};

// ─── Baseline Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    pub dataset:     DatasetConfig,
    pub result_path: String,
    pub mode:        EvalMode,
    pub top_k:       usize,
    pub split:       String,
    pub seed:        Option<u64>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            dataset:     DatasetConfig::default(),
            result_path: "results".to_string(),
            mode:        EvalMode::Open,
            top_k:       5,
            split:       "val".to_string(),
            seed:        None,
        }
    }
}

// ─── Answer frequencies ──────────────────────────────────────────────────────
/// Training answers with their counts, most frequent first.
/// Equal counts keep first-seen order.
pub fn answer_frequencies(dp: &DatasetAccessor) -> Result<Vec<(String, usize)>> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for item in dp.iter_image_qa_pair(TRAIN, None)? {
        let item = item?;
        if let Some(answer) = item.qa_pair.answer.as_deref() {
            let next = counts.len();
            counts.entry(answer).or_insert((0, next)).0 += 1;
        }
    }

    let mut sorted: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

    Ok(sorted
        .into_iter()
        .map(|(answer, (count, _))| (answer.to_string(), count))
        .collect())
}

// ─── OpenMostFrequent ────────────────────────────────────────────────────────
pub struct OpenMostFrequent<'a> {
    dp:    &'a DatasetAccessor,
    split: String,
    top_k: usize,
}

impl<'a> OpenMostFrequent<'a> {
    pub fn new(dp: &'a DatasetAccessor, split: impl Into<String>, top_k: usize) -> Self {
        Self { dp, split: split.into(), top_k }
    }
}

impl Predictor for OpenMostFrequent<'_> {
    fn name(&self) -> &'static str {
        "open-most-frequent"
    }

    fn predict(&mut self) -> Result<Vec<PredictionEntry>> {
        let top_answers: Vec<String> = answer_frequencies(self.dp)?
            .into_iter()
            .take(self.top_k)
            .map(|(answer, _)| answer)
            .collect();

        self.dp
            .iter_image_qa_pair(&self.split, None)?
            .map(|item| -> Result<PredictionEntry> {
                let pair = item?.qa_pair;
                Ok(PredictionEntry::new(pair.qa_id, top_answers.iter().cloned())
                    .with_question(pair.question.as_str()))
            })
            .collect()
    }
}

// ─── McMostFrequent ──────────────────────────────────────────────────────────
pub struct McMostFrequent<'a> {
    dp:    &'a DatasetAccessor,
    split: String,
    rng:   StdRng,
}

impl<'a> McMostFrequent<'a> {
    pub fn new(dp: &'a DatasetAccessor, split: impl Into<String>, rng: StdRng) -> Self {
        Self { dp, split: split.into(), rng }
    }
}

impl Predictor for McMostFrequent<'_> {
    fn name(&self) -> &'static str {
        "mc-most-frequent"
    }

    fn predict(&mut self) -> Result<Vec<PredictionEntry>> {
        let freqs: HashMap<String, usize> = answer_frequencies(self.dp)?.into_iter().collect();

        let mut out = Vec::new();
        for item in self
            .dp
            .iter_image_qa_multiple_choice(&self.split, None, true, &mut self.rng)?
        {
            let view = item?.mc;
            let Some(mc) = view.choices else {
                tracing::debug!("QA #{} has no multiple choices; skipped", view.qa_pair.qa_id);
                continue;
            };

            // strict '>' keeps the earliest candidate on ties
            let mut best: Option<(&str, usize)> = None;
            for &candidate in &mc.candidates {
                let freq = freqs.get(candidate).copied().unwrap_or(0);
                if best.map_or(true, |(_, f)| freq > f) {
                    best = Some((candidate, freq));
                }
            }

            if let Some((prediction, _)) = best {
                out.push(
                    PredictionEntry::new(view.qa_pair.qa_id, [prediction])
                        .with_question(view.qa_pair.question.as_str()),
                );
            }
        }
        Ok(out)
    }
}

// ─── McRandomGuess ───────────────────────────────────────────────────────────
pub struct McRandomGuess<'a> {
    dp:    &'a DatasetAccessor,
    split: String,
    rng:   StdRng,
}

impl<'a> McRandomGuess<'a> {
    pub fn new(dp: &'a DatasetAccessor, split: impl Into<String>, rng: StdRng) -> Self {
        Self { dp, split: split.into(), rng }
    }
}

impl Predictor for McRandomGuess<'_> {
    fn name(&self) -> &'static str {
        "mc-random-guess"
    }

    fn predict(&mut self) -> Result<Vec<PredictionEntry>> {
        // The guess needs its own draws, so shuffling uses a second
        // generator seeded from the first.
        let mut layout_rng = StdRng::from_rng(&mut self.rng)?;

        let mut out = Vec::new();
        for item in self
            .dp
            .iter_image_qa_multiple_choice(&self.split, None, true, &mut layout_rng)?
        {
            let view = item?.mc;
            let Some(mc) = view.choices else {
                tracing::debug!("QA #{} has no multiple choices; skipped", view.qa_pair.qa_id);
                continue;
            };
            if let Some(&prediction) = mc.candidates.choose(&mut self.rng) {
                out.push(
                    PredictionEntry::new(view.qa_pair.qa_id, [prediction])
                        .with_question(view.qa_pair.question.as_str()),
                );
            }
        }
        Ok(out)
    }
}

// ─── BaselineUseCase ─────────────────────────────────────────────────────────
pub struct BaselineUseCase {
    config: BaselineConfig,
}

impl BaselineUseCase {
    pub fn new(config: BaselineConfig) -> Self {
        Self { config }
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        }
    }

    /// Pick the baseline for this dataset and mode
    fn predictor<'a>(&self, dp: &'a DatasetAccessor) -> Result<Box<dyn Predictor + 'a>> {
        let cfg = &self.config;
        let name = cfg.dataset.dataset.as_str();

        if name.ends_with("telling") {
            let predictor: Box<dyn Predictor + 'a> = match cfg.mode {
                EvalMode::Open => Box::new(OpenMostFrequent::new(dp, &cfg.split, cfg.top_k)),
                EvalMode::MultipleChoice => Box::new(McMostFrequent::new(dp, &cfg.split, self.rng())),
            };
            Ok(predictor)
        } else if name.ends_with("pointing") {
            if cfg.mode != EvalMode::MultipleChoice {
                bail!("Evaluation mode {} not supported in pointing QA", cfg.mode);
            }
            Ok(Box::new(McRandomGuess::new(dp, &cfg.split, self.rng())))
        } else {
            bail!("No baseline available for dataset '{}'", name)
        }
    }

    /// Run the baseline and write its predictions; returns the file path
    pub fn execute(&self) -> Result<PathBuf> {
        let cfg = &self.config;
        let dp = cfg.dataset.open()?;

        let mut predictor = self.predictor(&dp)?;
        tracing::info!("Running baseline '{}' on split '{}'", predictor.name(), cfg.split);
        let predictions = predictor.predict()?;

        let path = result_path(Path::new(&cfg.result_path), &cfg.dataset.dataset, cfg.mode.tag());
        save_predictions(&path, &predictions)?;
        Ok(path)
    }
}
