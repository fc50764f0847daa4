// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All work is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `evaluate` — scores a predictions file against a split
//   2. `baseline` — writes predictions from a simple baseline
//   3. `stats`    — shows split sizes and one sampled test

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BaselineArgs, Commands, EvaluateArgs, StatsArgs};

use crate::domain::error::VqaError;

/// Benchmark tooling for Visual7W-style visual question answering.
#[derive(Parser, Debug)]
#[command(
    name = "vqa-bench",
    version = "0.1.0",
    about = "Load VQA datasets, run baselines and score predictions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case; never computes anything itself.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Baseline(args) => run_baseline(args),
            Commands::Stats(args)    => run_stats(args),
        }
    }
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(args.into()).execute()?;
    match report.accuracy() {
        Ok(acc) => println!(
            "{} accuracy on '{}' (top {}): {:.3}",
            report.mode, report.split, report.top_k, acc
        ),
        Err(VqaError::NoComparablePairs) => println!("{}", VqaError::NoComparablePairs),
        Err(e) => return Err(e.into()),
    }
    for c in &report.categories {
        println!("  {:<10} {:.3}", c.category, c.accuracy);
    }
    Ok(())
}

fn run_baseline(args: BaselineArgs) -> Result<()> {
    use crate::application::baseline_use_case::BaselineUseCase;

    let path = BaselineUseCase::new(args.into()).execute()?;
    println!("Predictions written to {}", path.display());
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    use crate::application::stats_use_case::StatsUseCase;

    let use_case = StatsUseCase::new(args.dataset_config(), args.split.clone(), args.seed);
    let stats = use_case.execute()?;

    for s in &stats.splits {
        println!("{:<8} {:>8} images {:>10} QA pairs", s.split, s.images, s.qa_pairs);
    }

    match stats.sample {
        Some(sample) => {
            println!("\nImage {}: {}", sample.image_id, sample.question);
            for (i, c) in sample.candidates.iter().enumerate() {
                let mark = if Some(i) == sample.selection { "*" } else { " " };
                println!("  {mark} {c}");
            }
        }
        None => println!("\nSplit '{}' has no QA pairs to sample.", args.split),
    }
    Ok(())
}
