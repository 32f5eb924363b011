// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands each subcommand to its
// Layer 2 use case. Nothing here computes; it only routes and
// prints the final summary line.
//
// Ctrl-C during `train` sets a shared cancel flag that the
// training loop polls between batches.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{AnalyzeArgs, BatchArgs, Commands, SynthesizeArgs, TrainArgs};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::application::analyze_use_case::{AnalyzeConfig, AnalyzeUseCase};
use crate::domain::traits::DesignAnalyzer;

#[derive(Parser, Debug)]
#[command(
    name = "design-critique",
    version,
    about = "Predict where users will look on a UI design and critique its attention hierarchy."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)      => run_train(args),
            Commands::Analyze(args)    => run_analyze(args),
            Commands::Batch(args)      => run_batch(args),
            Commands::Synthesize(args) => run_synthesize(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let cancel  = Arc::new(AtomicBool::new(false));
    let handler = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received; stopping after the current batch...");
        handler.store(true, Ordering::SeqCst);
    })
    .context("Cannot install Ctrl-C handler")?;

    tracing::info!("Starting training on images in: {}", args.image_dir.display());
    let summary = TrainUseCase::new(args.into(), cancel).execute()?;

    match summary.best_val_loss {
        Some(best) if summary.interrupted => {
            println!("Training interrupted after {} epochs. Best val_loss={best:.6}", summary.epochs_run)
        }
        Some(best) => println!("Training complete. Best val_loss={best:.6}"),
        None       => println!("Training stopped before any epoch finished; no model saved."),
    }
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let cfg: AnalyzeConfig = args.options.into();
    let use_case = AnalyzeUseCase::from_config(&cfg)?;
    let report   = use_case.analyze_file(&args.image)?;

    println!("\nAttention score: {:.2}/100 ({})", report.score, report.saliency_source);
    println!("Cognitive load:  {}", report.cognitive_load.level.description());
    for (subcategory, issues) in report.issues_by_subcategory() {
        println!("{}:", subcategory.label());
        for issue in issues {
            println!("  - [{:?}] {}", issue.severity, issue.description);
        }
    }
    println!("Report written to '{}'", use_case.output_dir().display());
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<()> {
    use crate::application::batch_use_case::BatchUseCase;

    let cfg: AnalyzeConfig = args.options.into();
    let analyzer = AnalyzeUseCase::from_config(&cfg)?;
    let report   = BatchUseCase::new(analyzer, &args.input_dir, &cfg.output_dir).execute()?;

    println!("\nAnalysed {} of {} images", report.succeeded, report.total);
    if let Some(avg) = report.average_score {
        println!("Average score: {avg:.2}");
    }
    for ranked in &report.ranking {
        println!("  {:>3}. {:<40} {:.2}", ranked.rank, ranked.file, ranked.score);
    }
    Ok(())
}

fn run_synthesize(args: SynthesizeArgs) -> Result<()> {
    use crate::application::synthesize_use_case::SynthesizeUseCase;

    let summary = SynthesizeUseCase::new(&args.image_dir, &args.saliency_dir).execute()?;
    println!(
        "Wrote {} synthetic maps to '{}' ({} failed)",
        summary.written,
        args.saliency_dir.display(),
        summary.failed
    );
    Ok(())
}
