// ============================================================
// Layer 5 — Saliency Provider
// ============================================================
// Picks the saliency source once, at start-up:
//
//   best weights present and loadable → LearnedModel
//   no best weights                   → Heuristic (with a warning)
//   best weights present but broken   → error
//
// The pipeline then talks to the provider only through the
// SaliencySource trait.

use anyhow::{Context, Result};
use burn::prelude::*;
use image::RgbImage;
use std::path::Path;

use crate::domain::saliency_map::SaliencyMap;
use crate::domain::traits::SaliencySource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::SaliencyInferencer;
use crate::ml::InferBackend;
use crate::vision::heuristic::HeuristicSaliency;

pub enum SaliencyProvider<B: Backend = InferBackend> {
    LearnedModel(SaliencyInferencer<B>),
    Heuristic(HeuristicSaliency),
}

impl<B: Backend> SaliencyProvider<B> {
    pub fn heuristic() -> Self {
        Self::Heuristic(HeuristicSaliency::new())
    }

    pub fn from_model_dir(model_dir: &Path, device: B::Device) -> Result<Self> {
        let ckpt_manager = CheckpointManager::open(model_dir);

        if !ckpt_manager.has_best() {
            tracing::warn!(
                "No trained weights at '{}'; falling back to heuristic saliency",
                ckpt_manager.best_model_path().display()
            );
            return Ok(Self::heuristic());
        }

        let inferencer = SaliencyInferencer::from_checkpoint(&ckpt_manager, device)
            .with_context(|| format!("Trained weights in '{}' are unusable", model_dir.display()))?;
        Ok(Self::LearnedModel(inferencer))
    }

    pub fn is_learned(&self) -> bool {
        matches!(self, Self::LearnedModel(_))
    }
}

impl<B: Backend> SaliencySource for SaliencyProvider<B> {
    fn name(&self) -> &'static str {
        match self {
            Self::LearnedModel(_) => "learned_model",
            Self::Heuristic(_)    => "heuristic",
        }
    }

    fn saliency_map(&self, image: &RgbImage) -> Result<SaliencyMap> {
        match self {
            Self::LearnedModel(inferencer) => inferencer.predict(image),
            Self::Heuristic(heuristic)     => Ok(heuristic.compute(image)),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::ml::model::SaliencyModel;
    use burn::backend::NdArray;
    use image::Rgb;
    use std::fs;
    use tempfile::tempdir;

    type TestBackend = NdArray;

    #[test]
    fn test_missing_weights_fall_back_to_heuristic() {
        let dir      = tempdir().unwrap();
        let provider = SaliencyProvider::<TestBackend>::from_model_dir(&dir.path().join("absent"), Default::default())
            .unwrap();
        assert!(!provider.is_learned());
        assert_eq!(provider.name(), "heuristic");

        let map = provider.saliency_map(&RgbImage::from_pixel(10, 8, Rgb([0, 0, 0]))).unwrap();
        assert_eq!((map.width(), map.height()), (10, 8));
    }

    #[test]
    fn test_trained_weights_select_learned_model() {
        let _rng = crate::ml::backend_rng_lock();
        let dir    = tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();
        let cfg    = TrainConfig { base_channels: 4, image_size: 16, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        let model: SaliencyModel<TestBackend> = cfg.model_config().init(&device);
        ckpt.save_best(&model, 0.1).unwrap();

        let provider = SaliencyProvider::<TestBackend>::from_model_dir(dir.path(), device).unwrap();
        assert!(provider.is_learned());
        assert_eq!(provider.name(), "learned_model");
    }

    #[test]
    fn test_corrupt_weights_are_an_error() {
        let _rng = crate::ml::backend_rng_lock();
        let dir  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        fs::write(ckpt.best_model_path(), b"not a model").unwrap();

        let result = SaliencyProvider::<TestBackend>::from_model_dir(dir.path(), Default::default());
        assert!(result.is_err());
    }
}
