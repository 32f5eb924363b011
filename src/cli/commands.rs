// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and their flags:
//
//   train       — fit the U-Net on image / saliency pairs
//   analyze     — critique one design image
//   batch       — critique a directory and rank the results
//   synthesize  — generate synthetic ground-truth maps
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{analyze_use_case::AnalyzeConfig, train_use_case::TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the saliency model on image / saliency-map pairs
    Train(TrainArgs),

    /// Analyse a single design image
    Analyze(AnalyzeArgs),

    /// Analyse every image in a directory and write a comparison report
    Batch(BatchArgs),

    /// Write synthetic saliency maps for a directory of images
    Synthesize(SynthesizeArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory of design images (png/jpg/jpeg)
    #[arg(long, default_value = "data/images")]
    pub image_dir: PathBuf,

    /// Directory of ground-truth maps named <stem>.png
    #[arg(long, default_value = "data/saliency")]
    pub saliency_dir: PathBuf,

    /// Where weights, checkpoints, config and metrics are written
    #[arg(long, default_value = "models")]
    pub model_dir: PathBuf,

    /// Square input side; must be a multiple of 8
    #[arg(long, default_value_t = 256)]
    pub image_size: usize,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Fraction of pairs used for training; the rest validate
    #[arg(long, default_value_t = 0.8)]
    pub train_split: f64,

    /// DataLoader worker threads
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,

    /// Epochs without improvement before the learning rate is cut
    #[arg(long, default_value_t = 5)]
    pub lr_patience: usize,

    /// Multiplier applied to the learning rate on a plateau
    #[arg(long, default_value_t = 0.5)]
    pub lr_factor: f64,

    /// Save a full resumable checkpoint every N epochs
    #[arg(long, default_value_t = 10)]
    pub checkpoint_every: usize,

    /// Width of the first encoder stage
    #[arg(long, default_value_t = 64)]
    pub base_channels: usize,

    /// Seed for the train/validation split and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Continue from the latest full checkpoint in --model-dir
    #[arg(long)]
    pub resume: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            image_dir:        a.image_dir,
            saliency_dir:     a.saliency_dir,
            model_dir:        a.model_dir,
            image_size:       a.image_size,
            batch_size:       a.batch_size,
            num_epochs:       a.epochs,
            learning_rate:    a.lr,
            train_split:      a.train_split,
            num_workers:      a.num_workers,
            lr_patience:      a.lr_patience,
            lr_factor:        a.lr_factor,
            checkpoint_every: a.checkpoint_every,
            base_channels:    a.base_channels,
            seed:             a.seed,
            resume:           a.resume,
        }
    }
}

/// Options shared by `analyze` and `batch`.
#[derive(Args, Debug, Clone)]
pub struct AnalysisOptions {
    /// Directory holding saliency_model.mpk and train_config.json
    #[arg(long, default_value = "models")]
    pub model_dir: PathBuf,

    /// Where reports and heatmaps are written
    #[arg(long, default_value = "reports")]
    pub output_dir: PathBuf,

    /// Use the heuristic even if trained weights exist
    #[arg(long)]
    pub heuristic: bool,

    /// Do not render the heatmap overlay
    #[arg(long)]
    pub no_heatmap: bool,
}

impl From<AnalysisOptions> for AnalyzeConfig {
    fn from(o: AnalysisOptions) -> Self {
        AnalyzeConfig {
            model_dir:      o.model_dir,
            output_dir:     o.output_dir,
            heuristic_only: o.heuristic,
            write_heatmap:  !o.no_heatmap,
        }
    }
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Design image to analyse
    pub image: PathBuf,

    #[command(flatten)]
    pub options: AnalysisOptions,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory of design images
    pub input_dir: PathBuf,

    #[command(flatten)]
    pub options: AnalysisOptions,
}

#[derive(Args, Debug)]
pub struct SynthesizeArgs {
    /// Directory of design images
    #[arg(long, default_value = "data/images")]
    pub image_dir: PathBuf,

    /// Where <stem>.png maps are written
    #[arg(long, default_value = "data/saliency")]
    pub saliency_dir: PathBuf,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use super::*;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["design-critique", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let def = TrainConfig::default();
        assert_eq!(cfg.image_size, def.image_size);
        assert_eq!(cfg.num_epochs, def.num_epochs);
        assert_eq!(cfg.learning_rate, def.learning_rate);
        assert_eq!(cfg.checkpoint_every, def.checkpoint_every);
        assert_eq!(cfg.seed, def.seed);
        assert!(!cfg.resume);
    }

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::try_parse_from([
            "design-critique", "analyze", "page.png", "--heuristic", "--no-heatmap", "--output-dir", "out",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else { panic!("expected analyze") };
        assert_eq!(args.image, PathBuf::from("page.png"));
        let cfg: AnalyzeConfig = args.options.into();
        assert!(cfg.heuristic_only);
        assert!(!cfg.write_heatmap);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
    }
}
