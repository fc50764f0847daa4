// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `evaluate`, `baseline` and `stats`,
// and all their configurable flags.
//
// Flags shared by every command (dataset name, root, variant) live
// in DatasetArgs and are flattened into each subcommand.

use clap::{Args, Subcommand};
use std::path::Path;

use crate::application::baseline_use_case::BaselineConfig;
use crate::application::config::{DatasetConfig, DatasetVariant};
use crate::application::evaluate_use_case::EvaluateConfig;
use crate::eval::scorer::EvalMode;
use crate::infra::predictions::result_path;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a predictions file against a dataset split
    Evaluate(EvaluateArgs),

    /// Write predictions from a frequency or random baseline
    Baseline(BaselineArgs),

    /// Print split sizes and one sampled multiple-choice test
    Stats(StatsArgs),
}

/// Where the dataset lives and how to read it
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Dataset name (visual7w-telling or visual7w-pointing; pointing
    /// files answer with box ids and need `--variant labeled`)
    #[arg(short = 'd', long, default_value = "visual7w-telling")]
    pub dataset: String,

    /// Directory holding dataset.json; defaults to datasets/<dataset>
    #[arg(long)]
    pub dataset_root: Option<String>,

    /// Dataset variant: telling (token matching, W-word categories)
    /// or labeled (case-insensitive matching, `type` categories)
    #[arg(long, default_value = "telling")]
    pub variant: DatasetVariant,
}

impl DatasetArgs {
    fn into_config(self, load_features: bool) -> DatasetConfig {
        DatasetConfig {
            dataset:      self.dataset,
            dataset_root: self.dataset_root,
            load_features,
            variant:      self.variant,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Evaluation mode: open or mc
    #[arg(short = 'm', long, default_value = "open")]
    pub mode: EvalMode,

    /// Number of top candidates considered in open-ended mode
    #[arg(short = 'k', long, default_value_t = 1)]
    pub topk: usize,

    /// Predictions file; defaults to results/result_<dataset>_<mode>.json
    #[arg(short = 'j', long)]
    pub results: Option<String>,

    /// Directory to save the evaluation summary into
    #[arg(short = 'o', long)]
    pub output_path: Option<String>,

    /// Split to score against
    #[arg(short = 's', long, default_value = "val")]
    pub split: String,

    /// Report per-category accuracy as well
    #[arg(long, short)]
    pub verbose: bool,

    /// Permit scoring against the test split
    #[arg(long)]
    pub allow_test_split: bool,
}

/// Convert CLI EvaluateArgs into the application-layer EvaluateConfig.
impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        let results = a.results.unwrap_or_else(|| {
            result_path(Path::new("results"), &a.dataset.dataset, a.mode.tag())
                .to_string_lossy()
                .into_owned()
        });
        EvaluateConfig {
            dataset:          a.dataset.into_config(false),
            results,
            split:            a.split,
            mode:             a.mode,
            top_k:            a.topk,
            verbose:          a.verbose,
            output_path:      a.output_path,
            allow_test_split: a.allow_test_split,
        }
    }
}

/// All arguments for the `baseline` command
#[derive(Args, Debug)]
pub struct BaselineArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Baseline mode: open or mc
    #[arg(short = 'm', long, default_value = "open")]
    pub mode: EvalMode,

    /// Number of answers emitted per question in open-ended mode
    #[arg(short = 'k', long, default_value_t = 5)]
    pub topk: usize,

    /// Directory the predictions file is written into
    #[arg(short = 'r', long, default_value = "results")]
    pub result_path: String,

    /// Split to predict for
    #[arg(short = 's', long, default_value = "val")]
    pub split: String,

    /// Seed for shuffling and random guesses
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<BaselineArgs> for BaselineConfig {
    fn from(a: BaselineArgs) -> Self {
        BaselineConfig {
            dataset:     a.dataset.into_config(false),
            result_path: a.result_path,
            mode:        a.mode,
            top_k:       a.topk,
            split:       a.split,
            seed:        a.seed,
        }
    }
}

/// All arguments for the `stats` command
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Also load features.json and check it covers the dataset
    #[arg(long)]
    pub load_features: bool,

    /// Split to draw the sample test from
    #[arg(short = 's', long, default_value = "train")]
    pub split: String,

    /// Seed for the sampled test
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

impl StatsArgs {
    pub fn dataset_config(&self) -> DatasetConfig {
        self.dataset.clone().into_config(self.load_features)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_evaluate_defaults() {
        let cli = Cli::try_parse_from(["vqa-bench", "evaluate"]).unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("wrong command") };
        let cfg: EvaluateConfig = args.into();
        assert_eq!(cfg.mode, EvalMode::Open);
        assert_eq!(cfg.top_k, 1);
        assert_eq!(cfg.split, "val");
        assert_eq!(
            Path::new(&cfg.results),
            Path::new("results/result_visual7w-telling_open.json")
        );
        assert!(!cfg.dataset.load_features);
    }

    #[test]
    fn test_evaluate_flags() {
        let cli = Cli::try_parse_from([
            "vqa-bench", "evaluate", "--mode", "mc", "--variant", "labeled",
            "--dataset", "visual7w-pointing", "-v",
        ])
        .unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("wrong command") };
        let cfg: EvaluateConfig = args.into();
        assert_eq!(cfg.mode, EvalMode::MultipleChoice);
        assert_eq!(cfg.dataset.variant, DatasetVariant::Labeled);
        assert!(cfg.verbose);
        assert!(cfg.results.ends_with("result_visual7w-pointing_mc.json"));
    }

    #[test]
    fn test_baseline_args() {
        let cli = Cli::try_parse_from(["vqa-bench", "baseline", "--seed", "7"]).unwrap();
        let Commands::Baseline(args) = cli.command else { panic!("wrong command") };
        let cfg: BaselineConfig = args.into();
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.result_path, "results");
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "vqa-bench", "evaluate", "-d", "visual7w-telling", "-m", "open", "-k", "3",
            "-j", "out/preds.json", "-o", "reports", "-s", "train", "-v",
        ])
        .unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("wrong command") };
        let cfg: EvaluateConfig = args.into();
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.results, "out/preds.json");
        assert_eq!(cfg.output_path.as_deref(), Some("reports"));
        assert_eq!(cfg.split, "train");

        let cli = Cli::try_parse_from(["vqa-bench", "baseline", "-r", "preds", "-m", "mc"]).unwrap();
        let Commands::Baseline(args) = cli.command else { panic!("wrong command") };
        let cfg: BaselineConfig = args.into();
        assert_eq!(cfg.result_path, "preds");
        assert_eq!(cfg.mode, EvalMode::MultipleChoice);
    }

    #[test]
    fn test_bad_mode_rejected() {
        assert!(Cli::try_parse_from(["vqa-bench", "evaluate", "--mode", "closed"]).is_err());
    }
}
