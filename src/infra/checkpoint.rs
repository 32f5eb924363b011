// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights with Burn's named MessagePack
// recorder (full precision).
//
// Two kinds of checkpoint live side by side:
//
//   1. "best" weights: rewritten whenever validation loss hits a
//      new minimum; this is what inference loads.
//   2. full training state, every N epochs: weights, optimiser
//      record and a JSON sidecar (epoch, losses, scheduler
//      counters, history) so an interrupted run can resume.
//
// File naming convention:
//   models/
//     saliency_model.mpk              ← best weights
//     saliency_model.json             ← loss the best weights reached
//     checkpoint_epoch_10.mpk         ← weights at epoch 10
//     checkpoint_epoch_10_optim.mpk   ← Adam moments at epoch 10
//     checkpoint_epoch_10.json        ← TrainingState at epoch 10
//     latest_checkpoint.json          ← number of the newest full state
//     train_config.json               ← hyper-parameters / architecture
//
// Every write goes to a `*_partial` file first and is renamed
// into place, so an interrupt mid-write never leaves a truncated
// best model behind.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    module::Module,
    optim::Optimizer,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::infra::metrics::EpochMetrics;
use crate::ml::model::SaliencyModel;
use crate::ml::scheduler::ReduceLrOnPlateau;

pub const BEST_MODEL_STEM:   &str = "saliency_model";
pub const WEIGHTS_EXTENSION: &str = "mpk";
pub const BEST_LOSS_FILE:    &str = "saliency_model.json";
pub const CONFIG_FILE:       &str = "train_config.json";
pub const LATEST_FILE:       &str = "latest_checkpoint.json";

type WeightsRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Everything besides tensors needed to resume a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    /// Last completed epoch
    pub epoch:         usize,
    pub train_loss:    f64,
    pub val_loss:      f64,
    /// None until some epoch produced a finite validation loss
    pub best_val_loss: Option<f64>,
    pub learning_rate: f64,
    pub scheduler:     ReduceLrOnPlateau,
    pub history:       Vec<EpochMetrics>,
}

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create model directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Manager over an existing directory, without creating it.
    /// Used by inference, where a missing directory just means
    /// "no weights".
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn best_model_path(&self) -> PathBuf {
        self.dir.join(format!("{BEST_MODEL_STEM}.{WEIGHTS_EXTENSION}"))
    }

    pub fn has_best(&self) -> bool {
        self.best_model_path().is_file()
    }

    // ─── Best weights ────────────────────────────────────────────────────────

    /// Atomically replace the best weights with `model`'s, together
    /// with the loss they reached. The loss lands first, so a crash
    /// between the two writes leaves a stricter bar, never a looser one.
    pub fn save_best<B: Backend>(&self, model: &SaliencyModel<B>, loss: f64) -> Result<()> {
        self.write_json_atomic(BEST_LOSS_FILE, &loss)?;
        self.record_atomic::<B, _>(model.clone().into_record(), BEST_MODEL_STEM)?;
        tracing::debug!("Saved best model (loss={loss:.6}) to '{}'", self.best_model_path().display());
        Ok(())
    }

    /// Loss recorded alongside the best weights, if any.
    pub fn best_loss(&self) -> Result<Option<f64>> {
        let path = self.dir.join(BEST_LOSS_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let loss = serde_json::from_str::<f64>(&s)
            .with_context(|| format!("Corrupt best-loss file '{}'", path.display()))?;
        Ok(Some(loss))
    }

    /// Load the best weights into `model` (which must have the
    /// architecture they were saved from).
    pub fn load_best<B: Backend>(
        &self,
        model:  SaliencyModel<B>,
        device: &B::Device,
    ) -> Result<SaliencyModel<B>> {
        let path   = self.dir.join(BEST_MODEL_STEM);
        let record = Recorder::<B>::load(&WeightsRecorder::new(), path, device)
            .with_context(|| {
                format!("Cannot load weights '{}'", self.best_model_path().display())
            })?;
        Ok(model.load_record(record))
    }

    // ─── Full training state ─────────────────────────────────────────────────

    pub fn save_training_state<B, O>(
        &self,
        model: &SaliencyModel<B>,
        optim: &O,
        state: &TrainingState,
    ) -> Result<()>
    where
        B: AutodiffBackend,
        O: Optimizer<SaliencyModel<B>, B>,
    {
        let stem = format!("checkpoint_epoch_{}", state.epoch);

        self.record_atomic::<B, _>(model.clone().into_record(), &stem)?;
        self.record_atomic::<B, _>(optim.to_record(), &format!("{stem}_optim"))?;
        self.write_json_atomic(&format!("{stem}.json"), state)?;
        self.write_json_atomic(LATEST_FILE, &state.epoch)?;

        tracing::info!("Saved full training state for epoch {}", state.epoch);
        Ok(())
    }

    /// Epoch of the newest full training state, if any.
    pub fn latest_checkpoint(&self) -> Result<Option<usize>> {
        let path = self.dir.join(LATEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(Some(serde_json::from_str::<usize>(&s)?))
    }

    pub fn load_training_state<B, O>(
        &self,
        epoch:  usize,
        model:  SaliencyModel<B>,
        optim:  O,
        device: &B::Device,
    ) -> Result<(SaliencyModel<B>, O, TrainingState)>
    where
        B: AutodiffBackend,
        O: Optimizer<SaliencyModel<B>, B>,
    {
        let stem = format!("checkpoint_epoch_{epoch}");

        let model_record = Recorder::<B>::load(&WeightsRecorder::new(), self.dir.join(&stem), device)
            .with_context(|| format!("Cannot load checkpoint weights for epoch {epoch}"))?;
        let optim_record: O::Record =
            Recorder::<B>::load(&WeightsRecorder::new(), self.dir.join(format!("{stem}_optim")), device)
            .with_context(|| format!("Cannot load optimiser state for epoch {epoch}"))?;

        let json_path = self.dir.join(format!("{stem}.json"));
        let json      = fs::read_to_string(&json_path)
            .with_context(|| format!("Cannot read '{}'", json_path.display()))?;
        let state: TrainingState = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt training state '{}'", json_path.display()))?;

        Ok((model.load_record(model_record), optim.load_record(optim_record), state))
    }

    // ─── Config ──────────────────────────────────────────────────────────────

    /// Must be written before training starts so inference can
    /// rebuild the same architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json_atomic(CONFIG_FILE, cfg)?;
        tracing::debug!("Saved training config to '{}'", self.dir.join(CONFIG_FILE).display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Corrupt config '{}'", path.display()))
    }

    pub fn has_config(&self) -> bool {
        self.dir.join(CONFIG_FILE).is_file()
    }

    // ─── Atomic writes ───────────────────────────────────────────────────────

    fn record_atomic<B: Backend, R: burn::record::Record<B>>(&self, record: R, stem: &str) -> Result<()> {
        let partial = self.dir.join(format!("{stem}_partial"));
        Recorder::<B>::record(&WeightsRecorder::new(), record, partial.clone())
            .with_context(|| format!("Failed to write '{}'", partial.display()))?;

        let written = partial.with_extension(WEIGHTS_EXTENSION);
        let target  = self.dir.join(format!("{stem}.{WEIGHTS_EXTENSION}"));
        fs::rename(&written, &target)
            .with_context(|| format!("Failed to move '{}' into place", written.display()))?;
        Ok(())
    }

    fn write_json_atomic<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        let target  = self.dir.join(file);
        let partial = self.dir.join(format!("{file}.partial"));
        fs::write(&partial, serde_json::to_string_pretty(value)?)
            .with_context(|| format!("Cannot write '{}'", partial.display()))?;
        fs::rename(&partial, &target)
            .with_context(|| format!("Cannot move '{}' into place", target.display()))?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SaliencyModelConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::AdamConfig;
    use tempfile::tempdir;

    type TestBackend     = NdArray;
    type TestAutodiff    = Autodiff<NdArray>;

    fn tiny() -> SaliencyModelConfig {
        SaliencyModelConfig::new().with_base_channels(4).with_image_size(16)
    }

    fn forward_ones<B: Backend>(model: &SaliencyModel<B>, device: &B::Device) -> Vec<f32> {
        let x = Tensor::<B, 4>::ones([1, 3, 16, 16], device);
        model.forward(x).into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_best_model_round_trip() {
        let _rng = crate::ml::backend_rng_lock();
        let dir    = tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        assert!(!ckpt.has_best());
        assert_eq!(ckpt.best_loss().unwrap(), None);
        let model: SaliencyModel<TestBackend> = tiny().init(&device);
        ckpt.save_best(&model, 0.042).unwrap();
        assert!(ckpt.has_best());
        assert_eq!(ckpt.best_loss().unwrap(), Some(0.042));
        assert!(!dir.path().join("saliency_model_partial.mpk").exists());
        assert!(!dir.path().join("saliency_model.json.partial").exists());

        let fresh: SaliencyModel<TestBackend> = tiny().init(&device);
        let loaded = ckpt.load_best(fresh, &device).unwrap();
        assert_eq!(forward_ones(&model, &device), forward_ones(&loaded, &device));
    }

    #[test]
    fn test_corrupt_weights_fail_to_load() {
        let _rng = crate::ml::backend_rng_lock();
        let dir  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        fs::write(ckpt.best_model_path(), b"garbage").unwrap();

        let device = Default::default();
        let model: SaliencyModel<TestBackend> = tiny().init(&device);
        assert!(ckpt.load_best(model, &device).is_err());
    }

    #[test]
    fn test_training_state_round_trip() {
        let _rng = crate::ml::backend_rng_lock();
        let dir    = tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        let model: SaliencyModel<TestAutodiff> = tiny().init(&device);
        let optim = AdamConfig::new().init::<TestAutodiff, SaliencyModel<TestAutodiff>>();
        let state = TrainingState {
            epoch:         10,
            train_loss:    0.05,
            val_loss:      0.06,
            best_val_loss: Some(0.055),
            learning_rate: 5e-5,
            scheduler:     ReduceLrOnPlateau::new(1e-4, 0.5, 5),
            history:       vec![EpochMetrics::new(10, 0.05, 0.06, 5e-5, false)],
        };

        assert_eq!(ckpt.latest_checkpoint().unwrap(), None);
        ckpt.save_training_state(&model, &optim, &state).unwrap();
        assert_eq!(ckpt.latest_checkpoint().unwrap(), Some(10));

        let fresh_model: SaliencyModel<TestAutodiff> = tiny().init(&device);
        let fresh_optim = AdamConfig::new().init::<TestAutodiff, SaliencyModel<TestAutodiff>>();
        let (loaded, _optim, loaded_state) =
            ckpt.load_training_state(10, fresh_model, fresh_optim, &device).unwrap();

        assert_eq!(loaded_state, state);
        assert_eq!(forward_ones(&model, &device), forward_ones(&loaded, &device));
    }

    #[test]
    fn test_config_round_trip() {
        let dir  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let cfg  = TrainConfig { num_epochs: 3, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        assert!(ckpt.has_config());
        assert_eq!(ckpt.load_config().unwrap().num_epochs, 3);
    }
}
