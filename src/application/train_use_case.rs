// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration    (Layer 2)
//   Step 2: Pair images with saliency maps (Layer 4 - data)
//   Step 3: Split train/validation         (Layer 4 - data)
//   Step 4: Build datasets                 (Layer 4 - data)
//   Step 5: Save config                    (Layer 6 - infra)
//   Step 6: Run training loop              (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    path::PathBuf,
    sync::{atomic::AtomicBool, Arc},
};

use crate::data::{
    dataset::SaliencyDataset,
    loader::PairLoader,
    splitter::split_train_val,
};
use crate::domain::error::CritiqueError;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::SaliencyModelConfig;
use crate::ml::trainer::{run_training, TrainingSummary};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Saved as train_config.json
// next to the weights so inference can rebuild the same architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub image_dir:        PathBuf,
    pub saliency_dir:     PathBuf,
    pub model_dir:        PathBuf,
    pub image_size:       usize,
    pub batch_size:       usize,
    pub num_epochs:       usize,
    pub learning_rate:    f64,
    pub train_split:      f64,
    pub num_workers:      usize,
    pub lr_patience:      usize,
    pub lr_factor:        f64,
    pub checkpoint_every: usize,
    pub base_channels:    usize,
    pub seed:             u64,
    /// Continue from latest_checkpoint.json instead of starting fresh
    pub resume:           bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            image_dir:        PathBuf::from("data/images"),
            saliency_dir:     PathBuf::from("data/saliency"),
            model_dir:        PathBuf::from("models"),
            image_size:       256,
            batch_size:       8,
            num_epochs:       50,
            learning_rate:    1e-4,
            train_split:      0.8,
            num_workers:      2,
            lr_patience:      5,
            lr_factor:        0.5,
            checkpoint_every: 10,
            base_channels:    64,
            seed:             42,
            resume:           false,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> SaliencyModelConfig {
        SaliencyModelConfig::new()
            .with_base_channels(self.base_channels)
            .with_image_size(self.image_size)
    }

    pub fn validate(&self) -> Result<(), CritiqueError> {
        if self.batch_size == 0 {
            return Err(CritiqueError::config("batch_size must be at least 1"));
        }
        if self.num_epochs == 0 {
            return Err(CritiqueError::config("num_epochs must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(CritiqueError::config("learning_rate must be a positive number"));
        }
        if !(0.0..=1.0).contains(&self.train_split) {
            return Err(CritiqueError::config("train_split must lie in [0, 1]"));
        }
        if !(self.lr_factor > 0.0 && self.lr_factor < 1.0) {
            return Err(CritiqueError::config("lr_factor must lie in (0, 1)"));
        }
        if self.checkpoint_every == 0 {
            return Err(CritiqueError::config("checkpoint_every must be at least 1"));
        }
        self.model_config().validate()
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
    cancel: Arc<AtomicBool>,
}

impl TrainUseCase {
    /// `cancel` is polled between batches; setting it stops training
    /// cleanly with the best checkpoint intact.
    pub fn new(config: TrainConfig, cancel: Arc<AtomicBool>) -> Self {
        Self { config, cancel }
    }

    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;

        // ── Step 1: Reject bad hyper-parameters before touching disk ─────────
        cfg.validate()?;

        // ── Step 2: Enumerate image / ground-truth pairs ─────────────────────
        tracing::info!("Loading pairs from '{}' and '{}'", cfg.image_dir.display(), cfg.saliency_dir.display());
        let pairs = PairLoader::new(&cfg.image_dir, &cfg.saliency_dir).load_pairs()?;
        if pairs.is_empty() {
            return Err(CritiqueError::EmptyDataset(format!(
                "no image in '{}' has a matching map in '{}'",
                cfg.image_dir.display(),
                cfg.saliency_dir.display()
            ))
            .into());
        }

        // ── Step 3: Seeded train / validation split ──────────────────────────
        let (train_items, val_items) = split_train_val(pairs, cfg.train_split, cfg.seed);
        if train_items.is_empty() {
            return Err(CritiqueError::EmptyDataset(format!(
                "train_split {} leaves no training samples",
                cfg.train_split
            ))
            .into());
        }
        tracing::info!("Split: {} train, {} validation", train_items.len(), val_items.len());

        // ── Step 4: Build Burn datasets ──────────────────────────────────────
        let train_dataset = SaliencyDataset::new(train_items);
        let val_dataset   = SaliencyDataset::new(val_items);

        // ── Step 5: Save config for inference ────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.model_dir)?;
        ckpt_manager.save_config(cfg)?;

        // ── Step 6: Run training loop (Layer 5) ──────────────────────────────
        let summary = run_training(cfg, train_dataset, val_dataset, &ckpt_manager, self.cancel.clone())?;
        Ok(summary)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.image_size, 256);
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.num_epochs, 50);
        assert_eq!(cfg.checkpoint_every, 10);
        assert_eq!(cfg.seed, 42);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_is_config_error() {
        let cfg = TrainConfig { batch_size: 0, ..TrainConfig::default() };
        assert!(matches!(cfg.validate(), Err(CritiqueError::Config(_))));
    }

    #[test]
    fn test_image_size_not_divisible_by_eight() {
        let cfg = TrainConfig { image_size: 250, ..TrainConfig::default() };
        assert!(matches!(cfg.validate(), Err(CritiqueError::Config(_))));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: TrainConfig = serde_json::from_str(r#"{ "base_channels": 8 }"#).unwrap();
        assert_eq!(cfg.base_channels, 8);
        assert_eq!(cfg.image_size, 256);
    }

    #[test]
    fn test_empty_dataset_aborts() {
        let root = tempdir().unwrap();
        let images   = root.path().join("images");
        let saliency = root.path().join("saliency");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&saliency).unwrap();

        let cfg = TrainConfig {
            image_dir:    images,
            saliency_dir: saliency,
            model_dir:    root.path().join("models"),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg, Arc::new(AtomicBool::new(false)))
            .execute()
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<CritiqueError>(), Some(CritiqueError::EmptyDataset(_))));
    }

    #[test]
    fn test_missing_image_dir_aborts() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("saliency")).unwrap();
        let cfg = TrainConfig {
            image_dir:    root.path().join("nope"),
            saliency_dir: root.path().join("saliency"),
            model_dir:    root.path().join("models"),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg, Arc::new(AtomicBool::new(false))).execute().is_err());
    }
}
