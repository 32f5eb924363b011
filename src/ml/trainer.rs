// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
// One epoch:
//   train pass  → forward, MSE, backward, Adam step
//   val pass    → model.valid() on the inner backend (no autodiff)
//   scheduler   → reduce-on-plateau on the validation loss
//   checkpoints → best weights on strict improvement,
//                 full state every `checkpoint_every` epochs
//
// Epoch losses are sample-weighted means, so a short final batch
// counts for exactly as many samples as it holds.
//
// `cfg.seed` seeds the backend RNG before the weights are drawn,
// so two runs with the same config and data train identically.
//
// The cancel flag is polled at every batch boundary. Cancelling
// abandons the current epoch; the best weights already on disk
// are never touched by an unfinished epoch.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{SaliencyBatch, SaliencyBatcher},
    dataset::SaliencyDataset,
};
use crate::infra::checkpoint::{CheckpointManager, TrainingState};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::SaliencyModel;
use crate::ml::scheduler::ReduceLrOnPlateau;
use crate::ml::TrainBackend;

/// What a finished (or interrupted) run reports back.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    /// Epochs completed in this invocation (resumed epochs excluded)
    pub epochs_run:    usize,
    pub best_val_loss: Option<f64>,
    /// Every epoch so far, including those restored on resume
    pub history:       Vec<EpochMetrics>,
    pub interrupted:   bool,
}

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: SaliencyDataset,
    val_dataset:   SaliencyDataset,
    ckpt_manager:  &CheckpointManager,
    cancel:        Arc<AtomicBool>,
) -> Result<TrainingSummary> {
    let device = <TrainBackend as Backend>::Device::default();
    tracing::info!("Using device: {:?}", device);
    train_loop::<TrainBackend>(cfg, train_dataset, val_dataset, ckpt_manager, &cancel, device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: SaliencyDataset,
    val_dataset:   SaliencyDataset,
    ckpt_manager:  &CheckpointManager,
    cancel:        &AtomicBool,
    device:        B::Device,
) -> Result<TrainingSummary> {
    let val_len = val_dataset.item_count();

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config();
    model_cfg.validate()?;
    B::seed(&device, cfg.seed);
    let mut model: SaliencyModel<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: base_channels={}, image_size={}",
        cfg.base_channels,
        cfg.image_size
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .init::<B, SaliencyModel<B>>();

    let mut scheduler     = ReduceLrOnPlateau::new(cfg.learning_rate, cfg.lr_factor, cfg.lr_patience);
    let mut best_val_loss = None;
    let mut history       = Vec::new();
    let mut start_epoch   = 1;
    let mut resumed_from  = None;

    // ── Resume from the latest full-state checkpoint ──────────────────────────
    if cfg.resume {
        match ckpt_manager.latest_checkpoint()? {
            Some(epoch) => {
                let (m, o, state) = ckpt_manager.load_training_state(epoch, model, optim, &device)?;
                model         = m;
                optim         = o;
                scheduler     = state.scheduler;
                history       = state.history;
                start_epoch   = state.epoch + 1;
                resumed_from  = Some(state.epoch);

                // Best weights may have moved on after the snapshot
                best_val_loss = match (state.best_val_loss, ckpt_manager.best_loss()?) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b)             => a.or(b),
                };
                tracing::info!(
                    "Resuming after epoch {} (lr={:.3e}, best={:?})",
                    state.epoch,
                    scheduler.lr(),
                    best_val_loss
                );
            }
            None => tracing::warn!(
                "No checkpoint in '{}' to resume from; starting fresh",
                ckpt_manager.dir().display()
            ),
        }
    }

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let batcher = SaliencyBatcher::new(cfg.image_size as u32);
    let train_loader: Arc<dyn DataLoader<B, SaliencyBatch<B>>> = DataLoaderBuilder::new(batcher.clone())
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend, no autodiff) ─────────────────────
    let val_loader: Arc<dyn DataLoader<B::InnerBackend, SaliencyBatch<B::InnerBackend>>> =
        DataLoaderBuilder::new(batcher)
            .batch_size(cfg.batch_size)
            .num_workers(cfg.num_workers)
            .build(val_dataset);

    if val_len == 0 {
        tracing::warn!("Validation split is empty; train loss drives the scheduler and best-model selection");
    }

    let metrics_logger = match resumed_from {
        Some(epoch) => MetricsLogger::resume(ckpt_manager.dir(), epoch)?,
        None        => MetricsLogger::create(ckpt_manager.dir())?,
    };
    let mut epochs_run  = 0usize;
    let mut interrupted = false;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in start_epoch..=cfg.num_epochs {
        let lr = scheduler.lr();

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut samples  = 0usize;

        for batch in train_loader.iter() {
            if cancel.load(Ordering::SeqCst) {
                interrupted = true;
                break;
            }
            let n    = batch.images.dims()[0];
            let loss = model.forward_loss(batch.images, batch.targets);

            loss_sum += loss.clone().into_scalar().elem::<f64>() * n as f64;
            samples  += n;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(lr, model, grads);
        }
        if interrupted {
            break;
        }
        let train_loss = weighted_mean(loss_sum, samples);

        // ── Validation phase ──────────────────────────────────────────────────
        let val_loss = if val_len == 0 {
            train_loss
        } else {
            match evaluate(&model.valid(), val_loader.as_ref(), cancel) {
                Some(loss) => loss,
                None => {
                    interrupted = true;
                    break;
                }
            }
        };

        // ── Scheduler + checkpoint decision ───────────────────────────────────
        let mut metrics = EpochMetrics::new(epoch, train_loss, val_loss, lr, false);
        metrics.improved = metrics.is_improvement(best_val_loss);
        if metrics.improved {
            best_val_loss = Some(val_loss);
            ckpt_manager.save_best(&model, val_loss)?;
        }
        scheduler.step(val_loss);

        println!(
            "Epoch {:>3}/{} | train_loss={:.6} | val_loss={:.6} | lr={:.2e}{}",
            epoch,
            cfg.num_epochs,
            train_loss,
            val_loss,
            lr,
            if metrics.improved { " | best" } else { "" },
        );

        metrics_logger.log(&metrics)?;
        history.push(metrics);
        epochs_run += 1;

        if epoch % cfg.checkpoint_every == 0 {
            let state = TrainingState {
                epoch,
                train_loss,
                val_loss,
                best_val_loss,
                learning_rate: scheduler.lr(),
                scheduler:     scheduler.clone(),
                history:       history.clone(),
            };
            ckpt_manager.save_training_state(&model, &optim, &state)?;
        }
    }

    if interrupted {
        tracing::warn!("Training interrupted; best weights on disk are from the last completed improvement");
    } else {
        tracing::info!("Training complete!");
    }
    if best_val_loss.is_none() {
        tracing::warn!("No epoch produced a finite loss; no best model was saved");
    }

    Ok(TrainingSummary { epochs_run, best_val_loss, history, interrupted })
}

/// Sample-weighted validation MSE. None if cancelled mid-pass.
fn evaluate<B: Backend>(
    model:  &SaliencyModel<B>,
    loader: &dyn DataLoader<B, SaliencyBatch<B>>,
    cancel: &AtomicBool,
) -> Option<f64> {
    let mut loss_sum = 0.0f64;
    let mut samples  = 0usize;

    for batch in loader.iter() {
        if cancel.load(Ordering::SeqCst) {
            return None;
        }
        let n = batch.images.dims()[0];
        let loss: f64 = model
            .forward_loss(batch.images, batch.targets)
            .into_scalar()
            .elem::<f64>();
        loss_sum += loss * n as f64;
        samples  += n;
    }
    Some(weighted_mean(loss_sum, samples))
}

fn weighted_mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::SaliencyItem;
    use crate::infra::checkpoint::BEST_LOSS_FILE;
    use burn::backend::{Autodiff, NdArray};
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use std::{fs, path::Path};
    use tempfile::tempdir;

    type TestAutodiff = Autodiff<NdArray>;

    /// Ten 16×16 designs with a bright block whose ground truth is
    /// the block itself.
    fn write_pairs(dir: &Path) -> Vec<SaliencyItem> {
        (0..10u32)
            .map(|i| {
                let inside = |x: u32, y: u32| {
                    let (bx, by) = (i % 4 * 3, i / 4 * 4);
                    (bx..bx + 6).contains(&x) && (by..by + 6).contains(&y)
                };
                let img = RgbImage::from_fn(16, 16, |x, y| {
                    if inside(x, y) { Rgb([240, 200, 40]) } else { Rgb([30, 30, 60]) }
                });
                let map = GrayImage::from_fn(16, 16, |x, y| Luma([if inside(x, y) { 255 } else { 0 }]));

                let image_path    = dir.join(format!("design_{i}.png"));
                let saliency_path = dir.join(format!("design_{i}_map.png"));
                img.save(&image_path).unwrap();
                map.save(&saliency_path).unwrap();
                SaliencyItem::new(image_path, saliency_path)
            })
            .collect()
    }

    fn tiny_config(model_dir: &Path) -> TrainConfig {
        TrainConfig {
            model_dir:        model_dir.to_path_buf(),
            image_size:       16,
            base_channels:    4,
            batch_size:       10,
            num_epochs:       2,
            learning_rate:    5e-4,
            num_workers:      1,
            checkpoint_every: 1,
            ..TrainConfig::default()
        }
    }

    fn train(cfg: &TrainConfig, items: Vec<SaliencyItem>, val: Vec<SaliencyItem>, cancel: bool) -> TrainingSummary {
        let ckpt = CheckpointManager::new(&cfg.model_dir).unwrap();
        train_loop::<TestAutodiff>(
            cfg,
            SaliencyDataset::new(items),
            SaliencyDataset::new(val),
            &ckpt,
            &AtomicBool::new(cancel),
            Default::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_second_epoch_loss_does_not_increase() {
        let _rng   = crate::ml::backend_rng_lock();
        let data   = tempdir().unwrap();
        let models = tempdir().unwrap();
        let items  = write_pairs(data.path());
        let val    = items[..2].to_vec();
        let cfg    = tiny_config(models.path());

        let summary = train(&cfg, items, val, false);

        assert_eq!(summary.epochs_run, 2);
        assert!(!summary.interrupted);
        assert!(summary.history[1].train_loss <= summary.history[0].train_loss);
        assert!(summary.best_val_loss.is_some());

        let ckpt = CheckpointManager::new(models.path()).unwrap();
        assert!(ckpt.has_best());
        assert_eq!(ckpt.latest_checkpoint().unwrap(), Some(2));
        assert!(models.path().join("metrics.csv").is_file());
    }

    #[test]
    fn test_empty_validation_falls_back_to_train_loss() {
        let _rng   = crate::ml::backend_rng_lock();
        let data   = tempdir().unwrap();
        let models = tempdir().unwrap();
        let cfg    = TrainConfig { num_epochs: 1, ..tiny_config(models.path()) };

        let summary = train(&cfg, write_pairs(data.path()), Vec::new(), false);
        let first   = &summary.history[0];
        assert_eq!(first.val_loss, first.train_loss);
        assert!(first.improved);
    }

    #[test]
    fn test_cancel_stops_before_any_update() {
        let _rng   = crate::ml::backend_rng_lock();
        let data   = tempdir().unwrap();
        let models = tempdir().unwrap();
        let cfg    = tiny_config(models.path());

        let summary = train(&cfg, write_pairs(data.path()), Vec::new(), true);
        assert!(summary.interrupted);
        assert_eq!(summary.epochs_run, 0);
        assert!(!CheckpointManager::new(models.path()).unwrap().has_best());
    }

    #[test]
    fn test_resume_continues_from_next_epoch() {
        let _rng   = crate::ml::backend_rng_lock();
        let data   = tempdir().unwrap();
        let models = tempdir().unwrap();
        let items  = write_pairs(data.path());

        let first = TrainConfig { num_epochs: 1, ..tiny_config(models.path()) };
        train(&first, items.clone(), Vec::new(), false);

        let resumed = TrainConfig { resume: true, ..tiny_config(models.path()) };
        let summary = train(&resumed, items, Vec::new(), false);

        assert_eq!(summary.epochs_run, 1);
        assert_eq!(summary.history.len(), 2);
        assert_eq!(summary.history[0].epoch, 1);
        assert_eq!(summary.history[1].epoch, 2);
    }

    #[test]
    fn test_same_seed_gives_identical_histories() {
        let _rng   = crate::ml::backend_rng_lock();
        let data   = tempdir().unwrap();
        let items  = write_pairs(data.path());
        let val    = items[..2].to_vec();

        let losses = |summary: TrainingSummary| -> Vec<(f64, f64)> {
            summary.history.iter().map(|m| (m.train_loss, m.val_loss)).collect()
        };
        let (a, b) = (tempdir().unwrap(), tempdir().unwrap());
        let first  = train(&tiny_config(a.path()), items.clone(), val.clone(), false);
        let second = train(&tiny_config(b.path()), items, val, false);

        assert_eq!(losses(first), losses(second));
    }

    #[test]
    fn test_resume_keeps_better_best_weights() {
        let _rng   = crate::ml::backend_rng_lock();
        let data   = tempdir().unwrap();
        let models = tempdir().unwrap();
        let items  = write_pairs(data.path());
        let val    = items[..2].to_vec();

        // full state at epoch 2, best weights from a later epoch
        let first = TrainConfig { num_epochs: 3, checkpoint_every: 2, ..tiny_config(models.path()) };
        train(&first, items.clone(), val.clone(), false);
        fs::write(models.path().join(BEST_LOSS_FILE), serde_json::to_string(&1e-9).unwrap()).unwrap();

        let ckpt        = CheckpointManager::new(models.path()).unwrap();
        let best_before = fs::read(ckpt.best_model_path()).unwrap();

        let resumed = TrainConfig { resume: true, ..first };
        let summary = train(&resumed, items, val, false);

        assert_eq!(summary.epochs_run, 1);
        assert!(!summary.history[2].improved);
        assert_eq!(summary.best_val_loss, Some(1e-9));
        assert_eq!(fs::read(ckpt.best_model_path()).unwrap(), best_before);

        // epoch 3 is logged once, from the resumed run
        let csv = fs::read_to_string(models.path().join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert_eq!(csv.lines().filter(|l| l.starts_with("3,")).count(), 1);
    }

    #[test]
    fn test_fresh_run_restarts_metrics() {
        let _rng   = crate::ml::backend_rng_lock();
        let data   = tempdir().unwrap();
        let models = tempdir().unwrap();
        let items  = write_pairs(data.path());
        let cfg    = tiny_config(models.path());

        train(&cfg, items.clone(), Vec::new(), false);
        train(&cfg, items, Vec::new(), false);

        let csv = fs::read_to_string(models.path().join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
